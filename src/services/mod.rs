//! Application services layered over the `grid` engine.
//!
//! ARCHITECTURE
//! ============
//! `dialog` owns the two product dialogs (create one product, pick existing
//! ones). `replay` drives a whole session from a recorded script and is what
//! the binary runs.

pub mod dialog;
pub mod replay;
