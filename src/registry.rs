//! Typed, index-aligned metadata registry built from an archive.

use ndarray::{Array2, ArrayD, ArrayView2, ArrayViewD, Axis};

use crate::data::{Archive, COLORS_KEY};
use crate::error::{ConfigError, ReshapeError};

/// Kind tag for a per-point attribute.
///
/// The set is closed: hover resolution matches exhaustively over these
/// variants, so adding a kind is a compile-checked extension rather than
/// a new untyped branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// One number per point
    Scalar,
    /// A fixed-length numeric row per point
    Vector,
    /// A square greyscale image per point, stored flat or as 2-D rows
    GreyscaleImage,
}

impl AttributeKind {
    /// Parse a kind tag as declared in the archive's kind map.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "scalar" => Some(Self::Scalar),
            "vector" => Some(Self::Vector),
            "greyscale_image" => Some(Self::GreyscaleImage),
            _ => None,
        }
    }

    /// The canonical tag string for this kind.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Vector => "vector",
            Self::GreyscaleImage => "greyscale_image",
        }
    }
}

/// A named, index-aligned sequence of per-point values of one kind.
#[derive(Debug, Clone)]
pub struct Attribute {
    name: String,
    kind: AttributeKind,
    data: ArrayD<f64>,
}

impl Attribute {
    /// The attribute's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The attribute's declared kind.
    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    /// The full per-point data, leading dimension = point count.
    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    /// The values belonging to one point.
    pub fn row(&self, index: usize) -> ArrayViewD<'_, f64> {
        self.data.index_axis(Axis(0), index)
    }
}

/// Read-only mapping from attribute name to typed, index-aligned data.
///
/// Built once from an archive at startup and owned for the process's
/// lifetime; there is no mutation, insertion, or eviction afterwards.
/// Shared read access from the event loop needs no locking.
#[derive(Debug)]
pub struct MetadataRegistry {
    points: Array2<f64>,
    colors: ArrayD<f64>,
    attributes: Vec<Attribute>,
}

impl MetadataRegistry {
    /// Validate an archive into a registry.
    ///
    /// Every invariant is checked here, so a registry that builds cannot
    /// fail for configuration reasons during interaction: undeclared
    /// entries, declared-but-missing entries, unsupported kind tags,
    /// row-count mismatches, ranks incompatible with a kind, and flat
    /// image rows whose length is not a perfect square are all rejected
    /// before the first hover event can arrive.
    pub fn build(archive: Archive) -> Result<Self, ConfigError> {
        let (points, colors, kinds, entries) = archive.into_parts();
        let n = points.nrows();

        let color_rows = colors.shape().first().copied().unwrap_or(0);
        if color_rows != n {
            return Err(ConfigError::LengthMismatch {
                attribute: COLORS_KEY.to_string(),
                expected: n,
                actual: color_rows,
            });
        }

        let mut attributes = Vec::with_capacity(entries.len());
        for (name, data) in entries {
            let tag = kinds
                .get(&name)
                .ok_or_else(|| ConfigError::UnknownKind {
                    attribute: name.clone(),
                })?;
            let kind =
                AttributeKind::parse(tag).ok_or_else(|| ConfigError::UnsupportedKind {
                    attribute: name.clone(),
                    kind: tag.clone(),
                })?;

            let rows = data.shape().first().copied().unwrap_or(0);
            if rows != n {
                return Err(ConfigError::LengthMismatch {
                    attribute: name,
                    expected: n,
                    actual: rows,
                });
            }

            check_shape(&name, kind, data.shape())?;

            log::debug!(
                "registered attribute '{}' as {} with shape {:?}",
                name,
                kind.tag(),
                data.shape()
            );
            attributes.push(Attribute { name, kind, data });
        }

        // Declarations without a backing data entry are as fatal as the
        // reverse case.
        for (name, tag) in &kinds {
            if !attributes.iter().any(|a| a.name == *name) {
                return Err(ConfigError::MissingData {
                    attribute: name.clone(),
                    kind: tag.clone(),
                });
            }
        }

        log::info!(
            "metadata registry built: {} points, {} attributes",
            n,
            attributes.len()
        );

        Ok(Self {
            points,
            colors,
            attributes,
        })
    }

    /// Number of points.
    pub fn point_count(&self) -> usize {
        self.points.nrows()
    }

    /// The N×3 point coordinates.
    pub fn points(&self) -> ArrayView2<'_, f64> {
        self.points.view()
    }

    /// The per-point color values.
    pub fn colors(&self) -> ArrayViewD<'_, f64> {
        self.colors.view()
    }

    /// All attributes in archive declaration order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// Check that an attribute's rank and row layout fit its declared kind.
fn check_shape(name: &str, kind: AttributeKind, shape: &[usize]) -> Result<(), ConfigError> {
    match kind {
        AttributeKind::Scalar if shape.len() == 1 => Ok(()),
        AttributeKind::Vector if shape.len() == 2 => Ok(()),
        AttributeKind::GreyscaleImage if shape.len() == 3 => Ok(()),
        AttributeKind::GreyscaleImage if shape.len() == 2 => {
            let len = shape[1];
            let side = len.isqrt();
            if side * side == len {
                Ok(())
            } else {
                Err(ConfigError::Reshape {
                    attribute: name.to_string(),
                    source: ReshapeError { len },
                })
            }
        }
        _ => Err(ConfigError::ShapeMismatch {
            attribute: name.to_string(),
            kind: kind.tag(),
            shape: shape.to_vec(),
        }),
    }
}
