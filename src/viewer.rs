//! Viewer context: the registry plus the hover tooltip state machine.
//!
//! The viewer is constructed once at startup and handed to the
//! renderer's event handler; there is no process-wide mutable state. All
//! boundary types are serde-serializable so an embedding process can
//! shuttle them to a front end as JSON.

use ndarray::{ArrayView2, ArrayViewD};
use serde::{Deserialize, Serialize};

use crate::hover::{ContentBlock, resolve};
use crate::registry::MetadataRegistry;

/// Screen-space rectangle, as reported by the renderer's hover events.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenRect {
    /// Left edge
    pub x0: f64,
    /// Top edge
    pub y0: f64,
    /// Right edge
    pub x1: f64,
    /// Bottom edge
    pub y1: f64,
}

/// Hover event emitted by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HoverEvent {
    /// The cursor is over a point. `index` refers into the renderer's
    /// point set, which is the registry's point set.
    Point {
        /// Index of the hovered point
        index: usize,
        /// Screen-space bounds of the hovered marker
        bbox: ScreenRect,
    },
    /// The cursor left all points
    Cleared,
}

/// Externally visible hover state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverState {
    /// No point under the cursor
    Hidden,
    /// A point is hovered and its content is shown
    Shown(usize),
}

/// Tooltip update sent back to the renderer for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipUpdate {
    /// Whether the tooltip is visible
    pub show: bool,
    /// Screen anchor, passed through from the hover event
    pub bbox: Option<ScreenRect>,
    /// Resolved content, present when `show` is true
    pub content: Option<ContentBlock>,
}

impl TooltipUpdate {
    /// An update that hides the tooltip.
    pub fn hidden() -> Self {
        Self {
            show: false,
            bbox: None,
            content: None,
        }
    }
}

/// Context object owning the registry and the hover state machine.
pub struct Viewer {
    registry: MetadataRegistry,
    state: HoverState,
}

impl Viewer {
    /// Create a viewer over a built registry. Starts hidden.
    pub fn new(registry: MetadataRegistry) -> Self {
        Self {
            registry,
            state: HoverState::Hidden,
        }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &MetadataRegistry {
        &self.registry
    }

    /// Point coordinates and colors for scene initialization.
    pub fn scene(&self) -> (ArrayView2<'_, f64>, ArrayViewD<'_, f64>) {
        (self.registry.points(), self.registry.colors())
    }

    /// The current hover state.
    pub fn state(&self) -> HoverState {
        self.state
    }

    /// Feed one hover event through the state machine.
    ///
    /// Resolution runs synchronously in the caller's event loop, so the
    /// returned update must be applied before the next event is
    /// dispatched. Every event is resolved independently; there is no
    /// debounce. A failed resolution hides the tooltip and logs the
    /// cause instead of leaving stale content up.
    pub fn handle_hover(&mut self, event: HoverEvent) -> TooltipUpdate {
        match event {
            HoverEvent::Point { index, bbox } => match resolve(&self.registry, index) {
                Ok(content) => {
                    self.state = HoverState::Shown(index);
                    TooltipUpdate {
                        show: true,
                        bbox: Some(bbox),
                        content: Some(content),
                    }
                }
                Err(e) => {
                    log::error!("hover resolution failed for point {index}: {e}");
                    self.state = HoverState::Hidden;
                    TooltipUpdate::hidden()
                }
            },
            HoverEvent::Cleared => {
                self.state = HoverState::Hidden;
                TooltipUpdate::hidden()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Archive;
    use ndarray::array;

    fn sample_viewer() -> Viewer {
        let points = array![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]];
        let colors = array![0.1, 0.9].into_dyn();
        let mut archive = Archive::new(points, colors);
        archive.declare_kind("temperature", "scalar");
        archive.insert("temperature", array![10.0, 20.0].into_dyn());

        Viewer::new(MetadataRegistry::build(archive).unwrap())
    }

    fn bbox(x0: f64) -> ScreenRect {
        ScreenRect {
            x0,
            y0: 0.0,
            x1: x0 + 10.0,
            y1: 10.0,
        }
    }

    #[test]
    fn test_starts_hidden() {
        let viewer = sample_viewer();
        assert_eq!(viewer.state(), HoverState::Hidden);
    }

    #[test]
    fn test_enter_move_exit_stream() {
        let mut viewer = sample_viewer();

        let updates = [
            viewer.handle_hover(HoverEvent::Point {
                index: 0,
                bbox: bbox(0.0),
            }),
            viewer.handle_hover(HoverEvent::Point {
                index: 1,
                bbox: bbox(50.0),
            }),
            viewer.handle_hover(HoverEvent::Cleared),
        ];

        let shows: Vec<bool> = updates.iter().map(|u| u.show).collect();
        assert_eq!(shows, vec![true, true, false]);
        assert_eq!(viewer.state(), HoverState::Hidden);
    }

    #[test]
    fn test_move_updates_shown_index() {
        let mut viewer = sample_viewer();

        viewer.handle_hover(HoverEvent::Point {
            index: 0,
            bbox: bbox(0.0),
        });
        assert_eq!(viewer.state(), HoverState::Shown(0));

        viewer.handle_hover(HoverEvent::Point {
            index: 1,
            bbox: bbox(50.0),
        });
        assert_eq!(viewer.state(), HoverState::Shown(1));
    }

    #[test]
    fn test_bbox_passes_through() {
        let mut viewer = sample_viewer();
        let anchor = bbox(42.0);

        let update = viewer.handle_hover(HoverEvent::Point {
            index: 0,
            bbox: anchor,
        });
        assert_eq!(update.bbox, Some(anchor));
        assert!(update.content.is_some());
    }

    #[test]
    fn test_cleared_hides_everything() {
        let mut viewer = sample_viewer();
        viewer.handle_hover(HoverEvent::Point {
            index: 0,
            bbox: bbox(0.0),
        });

        let update = viewer.handle_hover(HoverEvent::Cleared);
        assert_eq!(update, TooltipUpdate::hidden());
        assert!(update.bbox.is_none());
        assert!(update.content.is_none());
    }

    #[test]
    fn test_boundary_types_round_trip_as_json() {
        let event = HoverEvent::Point {
            index: 7,
            bbox: bbox(1.5),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: HoverEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);

        let mut viewer = sample_viewer();
        let update = viewer.handle_hover(HoverEvent::Point {
            index: 0,
            bbox: bbox(0.0),
        });
        let json = serde_json::to_string(&update).unwrap();
        let back: TooltipUpdate = serde_json::from_str(&json).unwrap();
        assert_eq!(update, back);
    }
}
