//! Reader for NumPy `.npz` archive bundles.
//!
//! An `.npz` file is a zip of `.npy` arrays, one per entry. The reserved
//! entries carry the point coordinates, colors, and the kind map; every
//! other entry is a per-point attribute. Zip entry order is preserved as
//! the attribute declaration order.
//!
//! `.npy` has no native mapping type, so the kind map entry holds a
//! UTF-8 JSON object (name → kind tag) stored as a 1-D `u8` array.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use ndarray::{Array2, ArrayD, Ix1, Ix2, IxDyn, OwnedRepr};
use ndarray_npy::{NpzReader, ReadNpzError};
use thiserror::Error;

use crate::data::archive::{Archive, COLORS_KEY, KINDS_KEY, POINTS_KEY};

/// Errors produced while reading an `.npz` archive.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// I/O error reading the archive file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Underlying zip or `.npy` read error
    #[error("npz read error: {0}")]
    Npz(#[from] ReadNpzError),

    /// An entry's element type is not one of the supported numeric types
    #[error("entry '{name}' has an unsupported element type")]
    UnsupportedDtype {
        /// Name of the offending entry
        name: String,
    },

    /// A reserved entry is absent from the archive
    #[error("missing reserved entry '{key}'")]
    MissingEntry {
        /// The missing reserved entry name
        key: &'static str,
    },

    /// The `points` entry is not an N×3 array
    #[error("'points' must have shape (N, 3), got {shape:?}")]
    BadPoints {
        /// The entry's actual shape
        shape: Vec<usize>,
    },

    /// The kind map entry is not a 1-D `u8` array
    #[error("kind map entry must be a 1-D u8 array")]
    KindMapShape,

    /// The kind map bytes are not valid UTF-8
    #[error("kind map is not valid UTF-8: {0}")]
    KindMapUtf8(#[from] std::string::FromUtf8Error),

    /// The kind map text is not a valid JSON object
    #[error("kind map is not a valid JSON object: {0}")]
    KindMapJson(#[from] serde_json::Error),
}

/// Zip magic bytes: PK\x03\x04
const MAGIC: &[u8] = &[0x50, 0x4B, 0x03, 0x04];

/// Check whether the bytes look like a zip-based `.npz` bundle.
pub fn is_npz(data: &[u8]) -> bool {
    data.len() >= MAGIC.len() && data.starts_with(MAGIC)
}

/// Read an archive from an `.npz` file on disk.
pub fn from_file(path: &Path) -> Result<Archive, ArchiveError> {
    let bytes = std::fs::read(path)?;
    log::debug!("read {} bytes from {}", bytes.len(), path.display());
    from_bytes(&bytes)
}

/// Read an archive from `.npz` bytes.
pub fn from_bytes(data: &[u8]) -> Result<Archive, ArchiveError> {
    let mut npz = NpzReader::new(Cursor::new(data))?;
    let names = npz.names()?;

    let find = |key: &str| names.iter().find(|n| logical_name(n) == key).cloned();

    let points_entry = find(POINTS_KEY).ok_or(ArchiveError::MissingEntry { key: POINTS_KEY })?;
    let points = read_points(&mut npz, &points_entry)?;

    let colors_entry = find(COLORS_KEY).ok_or(ArchiveError::MissingEntry { key: COLORS_KEY })?;
    let colors = read_numeric(&mut npz, &colors_entry)?;

    let kinds_entry = find(KINDS_KEY).ok_or(ArchiveError::MissingEntry { key: KINDS_KEY })?;
    let kinds = read_kind_map(&mut npz, &kinds_entry)?;

    let mut archive = Archive::new(points, colors);
    for (name, kind) in &kinds {
        archive.declare_kind(name, kind);
    }

    // Remaining entries, in zip order, are the attributes.
    for entry in &names {
        let name = logical_name(entry);
        if name == POINTS_KEY || name == COLORS_KEY || name == KINDS_KEY {
            continue;
        }
        let data = read_numeric(&mut npz, entry)?;
        archive.insert(name, data);
    }

    log::info!(
        "loaded npz archive: {} points, {} attribute entries",
        archive.point_count(),
        archive.entries().len()
    );

    Ok(archive)
}

/// Entry name with any `.npy` suffix dropped.
fn logical_name(entry: &str) -> &str {
    entry.strip_suffix(".npy").unwrap_or(entry)
}

/// Read an entry as f64, trying the supported element types in order of
/// likelihood. NumPy defaults to int64 for integer data, so the signed
/// 64-bit case comes right after the floats.
fn read_numeric<R: Read + Seek>(
    npz: &mut NpzReader<R>,
    entry: &str,
) -> Result<ArrayD<f64>, ArchiveError> {
    if let Ok(array) = npz.by_name::<OwnedRepr<f64>, IxDyn>(entry) {
        return Ok(array);
    }
    if let Ok(array) = npz.by_name::<OwnedRepr<f32>, IxDyn>(entry) {
        return Ok(array.mapv(f64::from));
    }
    if let Ok(array) = npz.by_name::<OwnedRepr<i64>, IxDyn>(entry) {
        return Ok(array.mapv(|v| v as f64));
    }
    if let Ok(array) = npz.by_name::<OwnedRepr<i32>, IxDyn>(entry) {
        return Ok(array.mapv(f64::from));
    }
    if let Ok(array) = npz.by_name::<OwnedRepr<i16>, IxDyn>(entry) {
        return Ok(array.mapv(f64::from));
    }
    if let Ok(array) = npz.by_name::<OwnedRepr<u8>, IxDyn>(entry) {
        return Ok(array.mapv(f64::from));
    }
    if let Ok(array) = npz.by_name::<OwnedRepr<u16>, IxDyn>(entry) {
        return Ok(array.mapv(f64::from));
    }

    Err(ArchiveError::UnsupportedDtype {
        name: logical_name(entry).to_string(),
    })
}

/// Read and shape-check the `points` entry.
fn read_points<R: Read + Seek>(
    npz: &mut NpzReader<R>,
    entry: &str,
) -> Result<Array2<f64>, ArchiveError> {
    let raw = read_numeric(npz, entry)?;
    let shape = raw.shape().to_vec();
    let points = raw
        .into_dimensionality::<Ix2>()
        .map_err(|_| ArchiveError::BadPoints {
            shape: shape.clone(),
        })?;
    if points.ncols() != 3 {
        return Err(ArchiveError::BadPoints { shape });
    }
    Ok(points)
}

/// Read the kind map entry: a 1-D u8 array holding a JSON object.
fn read_kind_map<R: Read + Seek>(
    npz: &mut NpzReader<R>,
    entry: &str,
) -> Result<HashMap<String, String>, ArchiveError> {
    let raw: ArrayD<u8> = npz.by_name::<OwnedRepr<u8>, IxDyn>(entry)?;
    let raw = raw
        .into_dimensionality::<Ix1>()
        .map_err(|_| ArchiveError::KindMapShape)?;
    let json = String::from_utf8(raw.to_vec())?;
    let kinds: HashMap<String, String> = serde_json::from_str(&json)?;
    Ok(kinds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, array};
    use ndarray_npy::NpzWriter;

    /// Write a minimal two-point npz bundle with one scalar attribute.
    fn sample_npz_bytes() -> Vec<u8> {
        let mut npz = NpzWriter::new(Cursor::new(Vec::new()));

        let points = array![[0.0, 0.0, 0.0], [1.0, 2.0, 3.0]];
        npz.add_array("points", &points).unwrap();

        let colors = array![0.25, 0.75];
        npz.add_array("colors", &colors).unwrap();

        let kinds_json = br#"{"temperature":"scalar"}"#;
        let kinds = Array1::from_vec(kinds_json.to_vec());
        npz.add_array("attribute_kinds", &kinds).unwrap();

        // int64 on purpose: NumPy's default integer dtype.
        let temperature = array![10_i64, 20_i64];
        npz.add_array("temperature", &temperature).unwrap();

        npz.finish().unwrap().into_inner()
    }

    #[test]
    fn test_magic_detection() {
        assert!(is_npz(&[0x50, 0x4B, 0x03, 0x04, 0x00, 0x00]));
        assert!(!is_npz(&[0x93, b'N', b'U', b'M', b'P', b'Y']));
        assert!(!is_npz(&[]));
    }

    #[test]
    fn test_round_trip() {
        let bytes = sample_npz_bytes();
        assert!(is_npz(&bytes));

        let archive = from_bytes(&bytes).unwrap();
        assert_eq!(archive.point_count(), 2);
        assert_eq!(archive.points()[[1, 2]], 3.0);
        assert_eq!(archive.colors().shape(), &[2]);
        assert_eq!(archive.kind_of("temperature"), Some("scalar"));

        let names: Vec<&str> = archive.entries().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["temperature"]);
    }

    #[test]
    fn test_integer_entries_read_as_f64() {
        let archive = from_bytes(&sample_npz_bytes()).unwrap();
        let (_, temperature) = &archive.entries()[0];
        assert_eq!(temperature[[0]], 10.0);
        assert_eq!(temperature[[1]], 20.0);
    }

    #[test]
    fn test_missing_points_entry() {
        let mut npz = NpzWriter::new(Cursor::new(Vec::new()));
        npz.add_array("colors", &array![0.5]).unwrap();
        let bytes = npz.finish().unwrap().into_inner();

        let err = from_bytes(&bytes).unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::MissingEntry { key: POINTS_KEY }
        ));
    }

    #[test]
    fn test_bad_points_shape() {
        let mut npz = NpzWriter::new(Cursor::new(Vec::new()));
        // (N, 2) instead of (N, 3)
        npz.add_array("points", &array![[0.0, 0.0], [1.0, 1.0]])
            .unwrap();
        npz.add_array("colors", &array![0.1, 0.2]).unwrap();
        let kinds = Array1::from_vec(b"{}".to_vec());
        npz.add_array("attribute_kinds", &kinds).unwrap();
        let bytes = npz.finish().unwrap().into_inner();

        let err = from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, ArchiveError::BadPoints { shape } if shape == vec![2, 2]));
    }

    #[test]
    fn test_kind_map_must_be_json() {
        let mut npz = NpzWriter::new(Cursor::new(Vec::new()));
        npz.add_array("points", &array![[0.0, 0.0, 0.0]]).unwrap();
        npz.add_array("colors", &array![0.1]).unwrap();
        let kinds = Array1::from_vec(b"not json".to_vec());
        npz.add_array("attribute_kinds", &kinds).unwrap();
        let bytes = npz.finish().unwrap().into_inner();

        let err = from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, ArchiveError::KindMapJson(_)));
    }
}
