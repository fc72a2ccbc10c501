//! Shared constants for the grid crate.

// ── Rows ────────────────────────────────────────────────────────

/// Maximum number of items a single row may hold.
pub const MAX_ITEMS_PER_ROW: usize = 3;

/// Wire id of the drop zone that spawns a new row.
pub const NEW_ROW_ID: &str = "new-row";

// ── Products ────────────────────────────────────────────────────

/// MIME prefix an uploaded file must carry to be accepted as a product image.
pub const IMAGE_MIME_PREFIX: &str = "image/";
