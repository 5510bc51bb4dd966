//! Archive data structures and loading.
//!
//! This module provides:
//! - `Archive`: in-memory bundle of point coordinates, colors, and typed
//!   per-point attributes
//! - `npz`: reader for NumPy `.npz` bundles, the shipped archive format
//!
//! The archive is a dumb container; all invariant checking happens when a
//! registry is built from it.

mod archive;
pub mod npz;

pub use archive::{Archive, COLORS_KEY, KINDS_KEY, POINTS_KEY};
pub use npz::ArchiveError;
