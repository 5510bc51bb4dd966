//! Hover resolution: from a point index to renderable tooltip content.

use serde::{Deserialize, Serialize};

use crate::encode;
use crate::error::ResolveError;
use crate::registry::{AttributeKind, MetadataRegistry};

/// One unit of renderable tooltip content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// A line of text
    Text {
        /// The rendered line
        text: String,
    },
    /// An embedded image, self-contained as a data URI
    Image {
        /// `data:image/jpeg;base64,…` payload
        data_uri: String,
    },
    /// A vertical group of blocks laid out as one tooltip
    Column {
        /// Child blocks, top to bottom
        blocks: Vec<ContentBlock>,
    },
}

/// Resolve every registered attribute at one point index into an ordered
/// column of content blocks.
///
/// Pure function of `(registry, point_index)`: repeated calls yield
/// identical content. Blocks appear in archive declaration order, one
/// per attribute:
///
/// - scalar → `"<name>: <value>"`
/// - vector → `"<name>: [v0, v1, …]"`
/// - greyscale image → an embedded JPEG data URI
///
/// # Panics
///
/// Panics if `point_index` is out of range. The renderer owns the point
/// set the index refers into, so an out-of-range index is a caller bug,
/// not a recoverable condition.
pub fn resolve(
    registry: &MetadataRegistry,
    point_index: usize,
) -> Result<ContentBlock, ResolveError> {
    let n = registry.point_count();
    assert!(
        point_index < n,
        "point index {point_index} out of range for {n} points"
    );

    let mut blocks = Vec::with_capacity(registry.attributes().len());
    for attribute in registry.attributes() {
        let block = match attribute.kind() {
            AttributeKind::Scalar => {
                let value = attribute.data()[[point_index]];
                ContentBlock::Text {
                    text: format!("{}: {}", attribute.name(), value),
                }
            }
            AttributeKind::Vector => {
                let rendered: Vec<String> = attribute
                    .row(point_index)
                    .iter()
                    .map(f64::to_string)
                    .collect();
                ContentBlock::Text {
                    text: format!("{}: [{}]", attribute.name(), rendered.join(", ")),
                }
            }
            AttributeKind::GreyscaleImage => {
                let data_uri = encode::greyscale_data_uri(attribute.row(point_index))?;
                ContentBlock::Image { data_uri }
            }
        };
        blocks.push(block);
    }

    Ok(ContentBlock::Column { blocks })
}
