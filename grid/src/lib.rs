//! Row template model and drag/drop reconciliation engine.
//!
//! This crate owns the product template: an ordered set of rows, each holding
//! up to three product references with an alignment. The host UI forwards raw
//! drag events (start, over, end, cancel, abort) to the engine, which plans
//! the resulting [`doc::Mutation`]s against a snapshot of the template.
//! [`engine::Session`] applies those plans and is what a host normally holds.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Reconciliation planner, [`engine::Outcome`] and [`engine::Session`] |
//! | [`doc`] | Rows, products, the [`doc::Template`] store and [`doc::Catalog`] |
//! | [`input`] | Drag identifiers, event shapes and the drag state machine |
//! | [`geom`] | Rects and drop-index derivation |
//! | [`consts`] | Row capacity and the new-row sentinel |

pub mod consts;
pub mod doc;
pub mod engine;
pub mod geom;
pub mod input;

pub use doc::{Alignment, Catalog, ItemId, Mutation, Product, ProductDraft, Row, RowId, Template};
pub use engine::{DragEngine, Outcome, Rejection, Session};
pub use input::{DragEvent, DragId, DragState};
