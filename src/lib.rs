//! EmbedView - Embedding point-cloud viewer core
//!
//! Typed per-point metadata and hover resolution for 3D point-cloud
//! (embedding) viewers. An archive of heterogeneous, index-aligned
//! attributes (scalars, vectors, and greyscale images) is validated
//! into a read-only registry; hover events from an opaque renderer are
//! resolved into ordered tooltip content, with per-point images
//! reconstructed from flat sample rows and embedded as JPEG data URIs.
//!
//! The renderer, window system, and archive file discovery are external
//! collaborators: this crate takes archive bytes in and hands
//! serializable tooltip updates back.
//!
//! ```rust,ignore
//! use embedview::{HoverEvent, MetadataRegistry, Viewer, data};
//!
//! let archive = data::npz::from_file(path)?;
//! let mut viewer = Viewer::new(MetadataRegistry::build(archive)?);
//! let (points, colors) = viewer.scene(); // hand these to the renderer
//! // per hover event from the renderer:
//! let update = viewer.handle_hover(HoverEvent::Point { index, bbox });
//! ```

pub mod data;
mod encode;
mod error;
mod hover;
mod registry;
mod viewer;

pub use encode::{DATA_URI_PREFIX, greyscale_data_uri, square_side};
pub use error::{ConfigError, ReshapeError, ResolveError};
pub use hover::{ContentBlock, resolve};
pub use registry::{Attribute, AttributeKind, MetadataRegistry};
pub use viewer::{HoverEvent, HoverState, ScreenRect, TooltipUpdate, Viewer};
