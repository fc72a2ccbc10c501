//! Geometry reported by the drag layer and the drop-index rule built on it.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use serde::{Deserialize, Serialize};

/// Axis-aligned client rect of a draggable or droppable node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Whether this rect has been dragged past the trailing edge of `other`.
    ///
    /// Items in a row are laid out left to right, so only the horizontal axis
    /// decides.
    #[must_use]
    pub fn is_past(&self, other: &Rect) -> bool {
        self.left > other.right()
    }
}

/// Index at which a dragged item lands in the destination row.
///
/// `over_index` is the position of the hovered item, or `None` when the
/// pointer is over the row container itself, which appends. When hovering an
/// item, the drop goes after it only if the dragged rect is past its trailing
/// edge. The result is clamped to `len`.
#[must_use]
pub fn drop_index(len: usize, over_index: Option<usize>, dragged: Option<&Rect>, over: Option<&Rect>) -> usize {
    let Some(index) = over_index else {
        return len;
    };
    let after = match (dragged, over) {
        (Some(dragged), Some(over)) => dragged.is_past(over),
        _ => false,
    };
    (index + usize::from(after)).min(len)
}
