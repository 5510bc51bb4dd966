//! Error types for archive validation and hover resolution.

use thiserror::Error;

/// Errors detected while validating an archive into a registry.
///
/// All of these are fatal at startup: the viewer must not come up over a
/// malformed archive, so every invariant is checked before the first
/// hover event can arrive.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An archive entry has no kind declared in the kind map
    #[error("attribute '{attribute}' has no declared kind")]
    UnknownKind {
        /// Name of the undeclared entry
        attribute: String,
    },

    /// A kind was declared for a name with no matching data entry
    #[error("attribute '{attribute}' is declared as '{kind}' but has no data entry")]
    MissingData {
        /// Name of the declared attribute
        attribute: String,
        /// The kind tag it was declared with
        kind: String,
    },

    /// A declared kind tag is outside the supported set
    #[error("attribute '{attribute}' has unsupported kind '{kind}'")]
    UnsupportedKind {
        /// Name of the offending attribute
        attribute: String,
        /// The unrecognized kind tag
        kind: String,
    },

    /// An array's leading dimension does not match the point count
    #[error("attribute '{attribute}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        /// Name of the offending entry
        attribute: String,
        /// The registry's point count
        expected: usize,
        /// The entry's actual row count
        actual: usize,
    },

    /// An array's rank is incompatible with its declared kind
    #[error("attribute '{attribute}' of kind '{kind}' has incompatible shape {shape:?}")]
    ShapeMismatch {
        /// Name of the offending attribute
        attribute: String,
        /// The declared kind tag
        kind: &'static str,
        /// The entry's full shape
        shape: Vec<usize>,
    },

    /// A flat image attribute cannot be reshaped into square images
    #[error("attribute '{attribute}': {source}")]
    Reshape {
        /// Name of the offending attribute
        attribute: String,
        /// The underlying reshape failure
        source: ReshapeError,
    },
}

/// A flat sample row cannot be interpreted as a square image.
///
/// Rows are unpacked as side × side squares, so the row length must have
/// an integer square root. Lengths that do not are rejected outright
/// rather than floor-truncated to the nearest square.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("flat image of length {len} is not a perfect square")]
pub struct ReshapeError {
    /// Length of the offending row
    pub len: usize,
}

/// Errors during resolution of a single hover event.
///
/// These never abort the process; the viewer hides the tooltip for the
/// affected event instead of showing stale or partial content.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// A stored flat image row could not be reshaped
    #[error(transparent)]
    Reshape(#[from] ReshapeError),

    /// JPEG encoding of a tooltip image failed
    #[error("failed to encode tooltip image: {0}")]
    ImageEncode(#[from] image::ImageError),
}
