//! Input model: drag identifiers, event shapes, and the drag state machine.
//!
//! The drag layer reports a single untyped id for whatever is being dragged or
//! hovered. Row ids are numbers, item ids are product names, and one reserved
//! string names the new-row drop zone. `DragId` turns that shared namespace
//! into an explicit tagged union at the boundary so nothing downstream has to
//! guess what an id refers to.
//!
//! `DragState` is the active gesture tracked between drag-start and
//! drag-end/cancel/abort.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::NEW_ROW_ID;
use crate::doc::{ItemId, RowId};
use crate::geom::Rect;

/// What a drag id refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawId", into = "RawId")]
pub enum DragId {
    /// A whole row, dragged by its handle or hovered as a container.
    Row(RowId),
    /// A product placed in some row.
    Item(ItemId),
    /// The drop zone that spawns a new row.
    NewRow,
}

impl DragId {
    #[must_use]
    pub fn item(id: impl Into<ItemId>) -> Self {
        Self::Item(id.into())
    }

    #[must_use]
    pub fn is_row(&self) -> bool {
        matches!(self, Self::Row(_))
    }
}

impl fmt::Display for DragId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Row(id) => write!(f, "row:{id}"),
            Self::Item(id) => write!(f, "item:{id}"),
            Self::NewRow => f.write_str(NEW_ROW_ID),
        }
    }
}

/// Drag id as it appears on the wire: a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(RowId),
    Text(String),
}

impl From<RawId> for DragId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Number(id) => Self::Row(id),
            RawId::Text(text) if text == NEW_ROW_ID => Self::NewRow,
            RawId::Text(text) => Self::Item(text),
        }
    }
}

impl From<DragId> for RawId {
    fn from(id: DragId) -> Self {
        match id {
            DragId::Row(id) => Self::Number(id),
            DragId::Item(text) => Self::Text(text),
            DragId::NewRow => Self::Text(NEW_ROW_ID.to_string()),
        }
    }
}

/// The node being dragged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Active {
    pub id: DragId,
    /// Current translated rect of the dragged node, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rect: Option<Rect>,
}

/// The drop target under the dragged node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Over {
    pub id: DragId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rect: Option<Rect>,
}

/// A drag event as delivered by the drag layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragEvent {
    pub active: Active,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub over: Option<Over>,
}

impl DragEvent {
    /// An event with no drop target.
    #[must_use]
    pub fn new(active: DragId) -> Self {
        Self { active: Active { id: active, rect: None }, over: None }
    }

    /// An event hovering `over`.
    #[must_use]
    pub fn over(active: DragId, over: DragId) -> Self {
        Self { active: Active { id: active, rect: None }, over: Some(Over { id: over, rect: None }) }
    }

    /// Attach rects for the dragged node and the drop target.
    #[must_use]
    pub fn with_rects(mut self, active: Rect, over: Rect) -> Self {
        self.active.rect = Some(active);
        if let Some(target) = self.over.as_mut() {
            target.rect = Some(over);
        }
        self
    }

    #[must_use]
    pub fn over_id(&self) -> Option<&DragId> {
        self.over.as_ref().map(|o| &o.id)
    }
}

/// Internal state for the drag state machine.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    /// No drag in progress.
    #[default]
    Idle,
    /// Something is being dragged.
    Dragging {
        /// The dragged row or item.
        active: DragId,
        /// Drop target whose preview has already been applied to live state.
        previewed: Option<DragId>,
    },
}

impl DragState {
    /// Id of the dragged node, if a drag is in progress.
    #[must_use]
    pub fn active(&self) -> Option<&DragId> {
        match self {
            Self::Idle => None,
            Self::Dragging { active, .. } => Some(active),
        }
    }

    /// Whether drag-over has already reconciled against `over`.
    #[must_use]
    pub fn has_previewed(&self, over: &DragId) -> bool {
        matches!(self, Self::Dragging { previewed: Some(p), .. } if p == over)
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }
}
