//! In-memory archive of point coordinates, colors, and per-point attributes.

use std::collections::HashMap;

use ndarray::{Array2, ArrayD};

/// Reserved entry name for the N×3 point coordinates.
pub const POINTS_KEY: &str = "points";

/// Reserved entry name for the per-point color values.
pub const COLORS_KEY: &str = "colors";

/// Reserved entry name for the attribute kind map.
pub const KINDS_KEY: &str = "attribute_kinds";

/// Bundle of named arrays describing a point cloud.
///
/// Beyond the reserved entries (`points`, `colors`, `attribute_kinds`),
/// every entry is a per-point attribute whose leading dimension is the
/// point count. Attribute entries keep their insertion order; that order
/// carries through the registry into tooltip layout.
///
/// The archive itself does not validate kinds, lengths, or shapes; that
/// is the registry's job at build time.
#[derive(Debug, Clone)]
pub struct Archive {
    points: Array2<f64>,
    colors: ArrayD<f64>,
    kinds: HashMap<String, String>,
    entries: Vec<(String, ArrayD<f64>)>,
}

impl Archive {
    /// Create an archive with the two reserved data entries and no
    /// attributes yet.
    pub fn new(points: Array2<f64>, colors: ArrayD<f64>) -> Self {
        Self {
            points,
            colors,
            kinds: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Declare the kind tag for an attribute name.
    pub fn declare_kind(&mut self, name: impl Into<String>, kind: impl Into<String>) {
        self.kinds.insert(name.into(), kind.into());
    }

    /// Add an attribute data entry.
    ///
    /// Re-inserting an existing name replaces its data in place, keeping
    /// the original declaration position.
    pub fn insert(&mut self, name: impl Into<String>, data: ArrayD<f64>) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = data;
        } else {
            self.entries.push((name, data));
        }
    }

    /// Number of points, taken from the `points` entry.
    pub fn point_count(&self) -> usize {
        self.points.nrows()
    }

    /// The N×3 point coordinates.
    pub fn points(&self) -> &Array2<f64> {
        &self.points
    }

    /// The per-point color values.
    pub fn colors(&self) -> &ArrayD<f64> {
        &self.colors
    }

    /// The declared kind tag for an attribute, if any.
    pub fn kind_of(&self, name: &str) -> Option<&str> {
        self.kinds.get(name).map(String::as_str)
    }

    /// The full kind map.
    pub fn kinds(&self) -> &HashMap<String, String> {
        &self.kinds
    }

    /// Attribute entries in declaration order.
    pub fn entries(&self) -> &[(String, ArrayD<f64>)] {
        &self.entries
    }

    /// Decompose into parts for registry construction.
    pub(crate) fn into_parts(
        self,
    ) -> (
        Array2<f64>,
        ArrayD<f64>,
        HashMap<String, String>,
        Vec<(String, ArrayD<f64>)>,
    ) {
        (self.points, self.colors, self.kinds, self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_point_archive() -> Archive {
        let points = array![[0.0, 0.0, 0.0], [1.0, 2.0, 3.0]];
        let colors = array![0.1, 0.9].into_dyn();
        Archive::new(points, colors)
    }

    #[test]
    fn test_point_count() {
        let archive = two_point_archive();
        assert_eq!(archive.point_count(), 2);
    }

    #[test]
    fn test_entries_keep_insertion_order() {
        let mut archive = two_point_archive();
        archive.insert("zeta", array![1.0, 2.0].into_dyn());
        archive.insert("alpha", array![3.0, 4.0].into_dyn());
        archive.insert("mid", array![5.0, 6.0].into_dyn());

        let names: Vec<&str> = archive.entries().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_reinsert_replaces_in_place() {
        let mut archive = two_point_archive();
        archive.insert("a", array![1.0, 2.0].into_dyn());
        archive.insert("b", array![3.0, 4.0].into_dyn());
        archive.insert("a", array![9.0, 9.0].into_dyn());

        let names: Vec<&str> = archive.entries().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(archive.entries()[0].1, array![9.0, 9.0].into_dyn());
    }

    #[test]
    fn test_kind_of() {
        let mut archive = two_point_archive();
        archive.declare_kind("temperature", "scalar");

        assert_eq!(archive.kind_of("temperature"), Some("scalar"));
        assert_eq!(archive.kind_of("missing"), None);
    }
}
