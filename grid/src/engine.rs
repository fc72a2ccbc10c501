//! Drag/drop reconciliation.
//!
//! `DragEngine` turns drag events into plans: an ordered list of
//! [`Mutation`]s computed against a read-only [`Template`] snapshot. It never
//! touches the template itself, so every decision can be tested by feeding it
//! a snapshot and an event. [`Session`] is the host-facing wrapper that owns the
//! template and catalog and applies each plan atomically.
//!
//! Drag-over plans are previews that the host applies straight away. The
//! engine remembers which drop target it last previewed, so a drag-end over
//! that same target only finalizes (empty-row sweep) instead of moving the
//! item a second time. Cancel and abort keep previews in place.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use crate::doc::{Catalog, ItemId, Mutation, Product, Row, RowId, Template, TemplateError, array_move};
use crate::geom::drop_index;
use crate::input::{Active, DragEvent, DragId, DragState, Over};

/// Why a drag event produced no mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("no drop target")]
    NoTarget,
    #[error("cannot resolve the row holding {0}")]
    UnresolvedSource(DragId),
    #[error("cannot resolve a row for drop target {0}")]
    UnresolvedTarget(DragId),
    #[error("row {row} is full")]
    RowFull { row: RowId },
    #[error("plan does not apply: {0}")]
    Inconsistent(TemplateError),
}

/// Result of reconciling one drag event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Mutations to apply, in order. May be empty when nothing changes.
    Applied(Vec<Mutation>),
    /// The event was ignored.
    Rejected(Rejection),
}

impl Outcome {
    fn unchanged() -> Self {
        Self::Applied(Vec::new())
    }

    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// Mutations of an applied outcome; empty for rejections.
    #[must_use]
    pub fn mutations(&self) -> &[Mutation] {
        match self {
            Self::Applied(mutations) => mutations,
            Self::Rejected(_) => &[],
        }
    }

    #[must_use]
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Applied(_) => None,
            Self::Rejected(reason) => Some(reason),
        }
    }
}

/// The drag/drop state machine and planner.
#[derive(Debug, Clone, Default)]
pub struct DragEngine {
    state: DragState,
}

impl DragEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// Record the dragged row or item. Never mutates.
    pub fn on_drag_start(&mut self, event: &DragEvent) {
        self.state = DragState::Dragging { active: event.active.id.clone(), previewed: None };
    }

    /// Plan the live preview for the current drop target.
    pub fn on_drag_over(&mut self, template: &Template, event: &DragEvent) -> Outcome {
        let Some(over) = event.over.as_ref() else {
            return Outcome::Rejected(Rejection::NoTarget);
        };
        let key = preview_key(template, &event.active.id, &over.id);
        if self.state.has_previewed(&key) {
            return Outcome::unchanged();
        }

        let outcome = plan_move(template, &event.active, over, MoveMode::Preview);
        if outcome.is_applied() {
            if let DragState::Dragging { previewed, .. } = &mut self.state {
                *previewed = Some(key);
            }
        }
        outcome
    }

    /// Plan the final drop, then return to idle.
    pub fn on_drag_end(&mut self, template: &Template, event: &DragEvent) -> Outcome {
        let state = std::mem::take(&mut self.state);
        let Some(over) = event.over.as_ref() else {
            return sweep_after_rejection(template, &state, Rejection::NoTarget);
        };
        let active = &event.active;
        let already_live = state.has_previewed(&preview_key(template, &active.id, &over.id));

        if active.id.is_row() {
            if already_live {
                return Outcome::unchanged();
            }
            return plan_move(template, active, over, MoveMode::Commit);
        }

        if over.id == DragId::NewRow {
            return plan_new_row(template, &active.id);
        }

        let outcome = if already_live {
            resolve_pair(template, &active.id, &over.id).map_or_else(Outcome::Rejected, |_| Outcome::unchanged())
        } else {
            plan_move(template, active, over, MoveMode::Commit)
        };

        match outcome {
            Outcome::Applied(mutations) => sweep_empty_row(template, mutations),
            Outcome::Rejected(reason) => sweep_after_rejection(template, &state, reason),
        }
    }

    /// Abandon the drag. Previews already applied stay.
    pub fn on_drag_cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// Same as cancel; the drag layer aborted before a drag really started.
    pub fn on_drag_abort(&mut self) {
        self.state = DragState::Idle;
    }
}

/// Whether a planned row move is a live preview or the final commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MoveMode {
    Preview,
    Commit,
}

/// Identity of a drop target for preview bookkeeping. A row drag hovering
/// any part of a row targets that row as a whole.
fn preview_key(template: &Template, active: &DragId, over: &DragId) -> DragId {
    if active.is_row() {
        if let Some(row) = template.find_container(over) {
            return DragId::Row(row);
        }
    }
    over.clone()
}

fn resolve_pair(template: &Template, active: &DragId, over: &DragId) -> Result<(RowId, RowId), Rejection> {
    let from = template
        .find_container(active)
        .ok_or_else(|| Rejection::UnresolvedSource(active.clone()))?;
    let to = template
        .find_container(over)
        .ok_or_else(|| Rejection::UnresolvedTarget(over.clone()))?;
    Ok((from, to))
}

fn plan_move(template: &Template, active: &Active, over: &Over, mode: MoveMode) -> Outcome {
    let (from_row, to_row) = match resolve_pair(template, &active.id, &over.id) {
        Ok(pair) => pair,
        Err(reason) => return Outcome::Rejected(reason),
    };
    match &active.id {
        DragId::Row(row) => plan_row_move(template, *row, to_row, mode),
        DragId::Item(item) => plan_item_move(template, item, from_row, to_row, active, over),
        DragId::NewRow => Outcome::Rejected(Rejection::UnresolvedSource(DragId::NewRow)),
    }
}

fn plan_row_move(template: &Template, row: RowId, to: RowId, mode: MoveMode) -> Outcome {
    if row == to {
        return Outcome::unchanged();
    }
    match mode {
        MoveMode::Commit => Outcome::Applied(vec![Mutation::MoveRow { row, to }]),
        MoveMode::Preview => {
            let (Some(from_idx), Some(to_idx)) = (template.position(row), template.position(to)) else {
                return Outcome::Rejected(Rejection::UnresolvedTarget(DragId::Row(to)));
            };
            let mut order = template.order().to_vec();
            array_move(&mut order, from_idx, to_idx);
            Outcome::Applied(vec![Mutation::ReorderRows { order }])
        }
    }
}

fn plan_item_move(template: &Template, item: &ItemId, from_row: RowId, to_row: RowId, active: &Active, over: &Over) -> Outcome {
    let Some(dest) = template.row(to_row) else {
        return Outcome::Rejected(Rejection::UnresolvedTarget(over.id.clone()));
    };
    let over_index = match &over.id {
        DragId::Item(over_item) => dest.position(over_item),
        DragId::Row(_) | DragId::NewRow => None,
    };

    if from_row != to_row {
        if dest.is_full() {
            tracing::debug!(item = %item, row = to_row, "destination row is full");
            return Outcome::Rejected(Rejection::RowFull { row: to_row });
        }
        let index = drop_index(dest.items.len(), over_index, active.rect.as_ref(), over.rect.as_ref());
        return Outcome::Applied(vec![
            Mutation::RemoveItem { row: from_row, item: item.clone() },
            Mutation::InsertItem { row: to_row, item: item.clone(), index },
        ]);
    }

    // Same row: only hovering another item reorders.
    match (dest.position(item), over_index) {
        (Some(from), Some(to)) if from != to => Outcome::Applied(vec![Mutation::MoveItem { row: to_row, from, to }]),
        _ => Outcome::unchanged(),
    }
}

fn plan_new_row(template: &Template, active: &DragId) -> Outcome {
    let DragId::Item(item) = active else {
        return Outcome::Rejected(Rejection::UnresolvedSource(active.clone()));
    };
    let Some(source) = template.find_item(item).and_then(|id| template.row(id)) else {
        return Outcome::Rejected(Rejection::UnresolvedSource(active.clone()));
    };

    // A row left empty is dropped here directly rather than by the sweep.
    let mut mutations = if source.items.len() == 1 {
        vec![Mutation::DeleteRow { row: source.id }]
    } else {
        vec![Mutation::RemoveItem { row: source.id, item: item.clone() }]
    };
    mutations.push(Mutation::AddRow { items: vec![item.clone()] });
    Outcome::Applied(mutations)
}

/// Append a delete for the first row left empty once `mutations` apply.
/// At most one row is removed per drop.
fn sweep_empty_row(template: &Template, mut mutations: Vec<Mutation>) -> Outcome {
    let mut scratch = template.clone();
    if let Err(e) = scratch.apply_all(&mutations) {
        return Outcome::Rejected(Rejection::Inconsistent(e));
    }
    if let Some(row) = scratch.first_empty_row() {
        mutations.push(Mutation::DeleteRow { row });
    }
    Outcome::Applied(mutations)
}

/// A rejected drop still finishes the drag: if an item preview already moved
/// something, the row it may have emptied is swept.
fn sweep_after_rejection(template: &Template, state: &DragState, reason: Rejection) -> Outcome {
    let item_previewed = matches!(state, DragState::Dragging { active, previewed: Some(_) } if !active.is_row());
    match template.first_empty_row() {
        Some(row) if item_previewed => {
            tracing::debug!(reason = %reason, row, "drop rejected after preview; sweeping empty row");
            Outcome::Applied(vec![Mutation::DeleteRow { row }])
        }
        _ => Outcome::Rejected(reason),
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// What the drag overlay shows while something is dragged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Preview<'a> {
    Row(&'a Row),
    Product(&'a Product),
}

/// Owns the template, the product catalog, and the drag engine.
///
/// This is what a host UI holds. Each drag handler plans against the current
/// template and applies the plan in one step, so a failed plan never leaves
/// the template half-updated.
#[derive(Debug, Clone, Default)]
pub struct Session {
    template: Template,
    catalog: Catalog,
    engine: DragEngine,
}

impl Session {
    #[must_use]
    pub fn new(template: Template, catalog: Catalog) -> Self {
        Self { template, catalog, engine: DragEngine::new() }
    }

    // --- Queries ---

    #[must_use]
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Direct access for non-drag commands (alignment, dialogs, deletes).
    pub fn template_mut(&mut self) -> &mut Template {
        &mut self.template
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Template and catalog together, for commands that touch both.
    pub fn parts_mut(&mut self) -> (&mut Template, &mut Catalog) {
        (&mut self.template, &mut self.catalog)
    }

    #[must_use]
    pub fn drag_state(&self) -> &DragState {
        self.engine.state()
    }

    /// The row or product under the pointer while dragging.
    #[must_use]
    pub fn preview(&self) -> Option<Preview<'_>> {
        match self.engine.state().active()? {
            DragId::Row(id) => self.template.row(*id).map(Preview::Row),
            DragId::Item(id) => self.catalog.get_product(id).map(Preview::Product),
            DragId::NewRow => None,
        }
    }

    // --- Drag handlers ---

    pub fn on_drag_start(&mut self, event: &DragEvent) {
        tracing::debug!(active = %event.active.id, "drag start");
        self.engine.on_drag_start(event);
    }

    pub fn on_drag_over(&mut self, event: &DragEvent) -> Outcome {
        let outcome = self.engine.on_drag_over(&self.template, event);
        self.commit(outcome)
    }

    pub fn on_drag_end(&mut self, event: &DragEvent) -> Outcome {
        let outcome = self.engine.on_drag_end(&self.template, event);
        self.commit(outcome)
    }

    pub fn on_drag_cancel(&mut self) {
        tracing::debug!("drag cancelled");
        self.engine.on_drag_cancel();
    }

    pub fn on_drag_abort(&mut self) {
        tracing::debug!("drag aborted");
        self.engine.on_drag_abort();
    }

    fn commit(&mut self, outcome: Outcome) -> Outcome {
        let mutations = match outcome {
            Outcome::Applied(mutations) => mutations,
            Outcome::Rejected(reason) => {
                tracing::debug!(reason = %reason, "drag event ignored");
                return Outcome::Rejected(reason);
            }
        };
        if mutations.is_empty() {
            return Outcome::Applied(mutations);
        }

        let mut next = self.template.clone();
        if let Err(e) = next.apply_all(&mutations) {
            tracing::warn!(error = %e, "discarding drag plan that does not apply");
            return Outcome::Rejected(Rejection::Inconsistent(e));
        }
        self.template = next;
        tracing::debug!(count = mutations.len(), "applied drag mutations");
        Outcome::Applied(mutations)
    }
}
