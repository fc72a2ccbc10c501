//! Replay service: drive a template session from a recorded event script.
//!
//! DESIGN
//! ======
//! A script is the headless stand-in for the browser: an initial template, a
//! product catalog, and the ordered UI events a user produced (drag gestures,
//! alignment clicks, dialog submissions). Each event goes through the same
//! `grid::Session` entry points the UI would call. Nothing aborts a replay;
//! every step is recorded in the report with its outcome.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use grid::doc::ImageUpload;
use grid::{Alignment, Catalog, DragEvent, ItemId, Mutation, Outcome, ProductDraft, RowId, Session, Template};
use serde::{Deserialize, Serialize};

use crate::services::dialog::{self, ProductPicker};

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid script: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A recorded session.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub template: Template,
    #[serde(default)]
    pub products: Catalog,
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
}

/// Image referenced by a create-product step.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageFile {
    pub mime: String,
    pub path: PathBuf,
}

/// Create-product form as recorded.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductForm {
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub image: Option<ImageFile>,
    #[serde(default)]
    pub edit_row: Option<RowId>,
}

/// One UI event.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    DragStart(DragEvent),
    DragOver(DragEvent),
    DragEnd(DragEvent),
    DragCancel,
    DragAbort,
    SetAlignment { row: RowId, alignment: Alignment },
    DeleteRow { row: RowId },
    CreateProduct(ProductForm),
    PickProducts {
        products: Vec<ItemId>,
        #[serde(default)]
        edit_row: Option<RowId>,
    },
}

impl ScriptEvent {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DragStart(_) => "drag_start",
            Self::DragOver(_) => "drag_over",
            Self::DragEnd(_) => "drag_end",
            Self::DragCancel => "drag_cancel",
            Self::DragAbort => "drag_abort",
            Self::SetAlignment { .. } => "set_alignment",
            Self::DeleteRow { .. } => "delete_row",
            Self::CreateProduct(_) => "create_product",
            Self::PickProducts { .. } => "pick_products",
        }
    }
}

/// What happened to one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepResult {
    /// A drag event produced these mutations.
    Applied { mutations: Vec<Mutation> },
    /// A drag event was ignored.
    Rejected { reason: String },
    /// A command succeeded.
    Done,
    /// A command failed.
    Failed { error: String },
}

impl From<Outcome> for StepResult {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Applied(mutations) => Self::Applied { mutations },
            Outcome::Rejected(reason) => Self::Rejected { reason: reason.to_string() },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub event: &'static str,
    #[serde(flatten)]
    pub result: StepResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub steps: Vec<StepReport>,
    pub template: Template,
    pub products: Catalog,
}

/// Read a script from a file, or from stdin when `source` is `-`.
pub fn load_script(source: &str) -> Result<Script, ReplayError> {
    let text = if source == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| ReplayError::Io { path: "<stdin>".into(), source })?;
        buf
    } else {
        fs::read_to_string(source).map_err(|e| ReplayError::Io { path: source.to_string(), source: e })?
    };
    parse_script(&text)
}

pub fn parse_script(text: &str) -> Result<Script, ReplayError> {
    Ok(serde_json::from_str(text)?)
}

/// Run every event of `script` through a fresh session.
#[must_use]
pub fn replay(script: Script) -> ReplayReport {
    let mut session = Session::new(script.template, script.products);
    let mut steps = Vec::with_capacity(script.events.len());

    for (index, event) in script.events.into_iter().enumerate() {
        let kind = event.kind();
        let result = apply_event(&mut session, event);
        match &result {
            StepResult::Applied { mutations } => tracing::info!(index, event = kind, count = mutations.len(), "applied"),
            StepResult::Rejected { reason } => tracing::info!(index, event = kind, %reason, "rejected"),
            StepResult::Done => tracing::debug!(index, event = kind, "done"),
            StepResult::Failed { error } => tracing::warn!(index, event = kind, %error, "command failed"),
        }
        steps.push(StepReport { index, event: kind, result });
    }

    ReplayReport { steps, template: session.template().clone(), products: session.catalog().clone() }
}

fn apply_event(session: &mut Session, event: ScriptEvent) -> StepResult {
    match event {
        ScriptEvent::DragStart(e) => {
            session.on_drag_start(&e);
            StepResult::Done
        }
        ScriptEvent::DragOver(e) => session.on_drag_over(&e).into(),
        ScriptEvent::DragEnd(e) => session.on_drag_end(&e).into(),
        ScriptEvent::DragCancel => {
            session.on_drag_cancel();
            StepResult::Done
        }
        ScriptEvent::DragAbort => {
            session.on_drag_abort();
            StepResult::Done
        }
        ScriptEvent::SetAlignment { row, alignment } => {
            let result = session.template_mut().set_alignment(row, alignment);
            if result.is_ok() {
                tracing::info!(row, label = alignment.label(), "alignment changed");
            }
            done_or_failed(result)
        }
        ScriptEvent::DeleteRow { row } => done_or_failed(session.template_mut().delete_row(row).map(|_| ())),
        ScriptEvent::CreateProduct(form) => create_product(session, form),
        ScriptEvent::PickProducts { products, edit_row } => pick_products(session, &products, edit_row),
    }
}

fn done_or_failed<E: std::fmt::Display>(result: Result<(), E>) -> StepResult {
    match result {
        Ok(()) => StepResult::Done,
        Err(e) => StepResult::Failed { error: e.to_string() },
    }
}

fn create_product(session: &mut Session, form: ProductForm) -> StepResult {
    let mut draft = ProductDraft { name: form.name, price: form.price, image: None };
    if let Some(image) = form.image {
        match read_image(&image) {
            Ok(upload) => {
                draft.attach_image(&upload);
            }
            Err(e) => return StepResult::Failed { error: e.to_string() },
        }
    }
    let (template, catalog) = session.parts_mut();
    done_or_failed(dialog::submit_product(template, catalog, draft, form.edit_row).map(|_| ()))
}

fn read_image(image: &ImageFile) -> Result<ImageUpload, ReplayError> {
    let bytes = fs::read(&image.path)
        .map_err(|source| ReplayError::Io { path: image.path.display().to_string(), source })?;
    Ok(ImageUpload::new(image.mime.clone(), bytes))
}

fn pick_products(session: &mut Session, products: &[ItemId], edit_row: Option<RowId>) -> StepResult {
    let mut picker = ProductPicker::new(edit_row);
    tracing::debug!(row = ?picker.edited_row(), limit = %picker.limit_label(session.template()), "product picker opened");
    for product in products {
        if let Err(e) = picker.toggle(session.template(), session.catalog(), product) {
            return StepResult::Failed { error: e.to_string() };
        }
    }
    tracing::debug!(selected = picker.selected().len(), "product picker submitted");
    done_or_failed(picker.submit(session.template_mut()).map(|_| ()))
}

#[cfg(test)]
#[path = "replay_test.rs"]
mod tests;
