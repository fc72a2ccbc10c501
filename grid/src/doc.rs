//! Document model: rows, products, and the in-memory template store.
//!
//! This module defines what is laid out on the template (`Row`, `Alignment`),
//! the mutation requests the drag engine produces against it (`Mutation`),
//! the store that owns every row plus the display order (`Template`), and the
//! product catalog the rows reference (`Catalog`).
//!
//! Rows and the row order are kept apart so that reordering rows never touches
//! row contents. Every command on `Template` preserves two invariants: a row
//! holds at most [`MAX_ITEMS_PER_ROW`] items, and an item appears in at most
//! one row.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::{BTreeMap, BTreeSet};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::consts::{IMAGE_MIME_PREFIX, MAX_ITEMS_PER_ROW};
use crate::input::DragId;

/// Identifier of a row. Allocated by the template, never reused.
pub type RowId = u32;

/// Identifier of a placed product. Products are keyed by name.
pub type ItemId = String;

/// Horizontal alignment of the items inside a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Label shown next to the alignment buttons.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Left => "Aligned left",
            Self::Center => "Centered",
            Self::Right => "Aligned right",
        }
    }
}

/// A row of the template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    #[serde(default)]
    pub alignment: Alignment,
    #[serde(default)]
    pub items: Vec<ItemId>,
}

impl Row {
    #[must_use]
    pub fn new(id: RowId, items: Vec<ItemId>) -> Self {
        Self { id, alignment: Alignment::default(), items }
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.items.len() >= MAX_ITEMS_PER_ROW
    }

    #[must_use]
    pub fn remaining_capacity(&self) -> usize {
        MAX_ITEMS_PER_ROW.saturating_sub(self.items.len())
    }

    /// Position of `item` within this row.
    #[must_use]
    pub fn position(&self, item: &str) -> Option<usize> {
        self.items.iter().position(|i| i == item)
    }
}

/// Failure of a direct template command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("unknown row {0}")]
    UnknownRow(RowId),
    #[error("row {0} already exists")]
    DuplicateRow(RowId),
    #[error("row {row} cannot take more items (max {capacity})")]
    RowFull { row: RowId, capacity: usize },
    #[error("too many items for one row: {count}")]
    TooManyItems { count: usize },
    #[error("a new row needs at least one item")]
    NoItems,
    #[error("item `{item}` is not in row {row}")]
    UnknownItem { row: RowId, item: ItemId },
    #[error("item `{0}` is already placed")]
    DuplicateItem(ItemId),
    #[error("index {index} is out of range for row {row}")]
    IndexOutOfRange { row: RowId, index: usize },
    #[error("row order must be a permutation of the existing rows")]
    InvalidOrder,
    #[error("no row ids left")]
    RowIdsExhausted,
}

/// A single change requested against a [`Template`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    /// Replace the row display order.
    ReorderRows { order: Vec<RowId> },
    /// Move `row` to the position currently held by `to`.
    MoveRow { row: RowId, to: RowId },
    /// Remove a row and its items.
    DeleteRow { row: RowId },
    /// Append a new row holding `items`.
    AddRow { items: Vec<ItemId> },
    /// Remove `item` from `row`.
    RemoveItem { row: RowId, item: ItemId },
    /// Insert `item` into `row` at `index`.
    InsertItem { row: RowId, item: ItemId, index: usize },
    /// Reorder an item within `row`.
    MoveItem { row: RowId, from: usize, to: usize },
}

/// Stable array move: remove at `from`, insert at `to`.
pub(crate) fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

/// Wire form of a [`Template`]: rows plus optional explicit order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSnapshot {
    pub rows: Vec<Row>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<RowId>,
}

/// The shared template state: rows keyed by id and their display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TemplateSnapshot", into = "TemplateSnapshot")]
pub struct Template {
    rows: BTreeMap<RowId, Row>,
    order: Vec<RowId>,
    /// `None` once every row id has been handed out.
    next_id: Option<RowId>,
}

impl Template {
    /// Create an empty template.
    #[must_use]
    pub fn new() -> Self {
        Self { rows: BTreeMap::new(), order: Vec::new(), next_id: Some(1) }
    }

    /// Build a template from rows listed in display order.
    pub fn from_rows(rows: Vec<Row>) -> Result<Self, TemplateError> {
        Self::try_from(TemplateSnapshot { rows, order: Vec::new() })
    }

    // --- Queries ---

    #[must_use]
    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.rows.get(&id)
    }

    #[must_use]
    pub fn contains_row(&self, id: RowId) -> bool {
        self.rows.contains_key(&id)
    }

    /// Row ids in display order.
    #[must_use]
    pub fn order(&self) -> &[RowId] {
        &self.order
    }

    /// Rows in display order.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.order.iter().filter_map(|id| self.rows.get(id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Display position of a row.
    #[must_use]
    pub fn position(&self, row: RowId) -> Option<usize> {
        self.order.iter().position(|id| *id == row)
    }

    /// The row holding `item`, if it is placed.
    #[must_use]
    pub fn find_item(&self, item: &str) -> Option<RowId> {
        self.rows.values().find(|r| r.position(item).is_some()).map(|r| r.id)
    }

    /// The row a drag identifier resolves to. A row resolves to itself, an
    /// item to the row holding it; the new-row sentinel never resolves.
    #[must_use]
    pub fn find_container(&self, id: &DragId) -> Option<RowId> {
        match id {
            DragId::Row(row) => self.contains_row(*row).then_some(*row),
            DragId::Item(item) => self.find_item(item),
            DragId::NewRow => None,
        }
    }

    /// Free slots left in `row`.
    #[must_use]
    pub fn remaining_capacity(&self, row: RowId) -> Option<usize> {
        self.rows.get(&row).map(Row::remaining_capacity)
    }

    /// The lowest-numbered row with no items.
    #[must_use]
    pub fn first_empty_row(&self) -> Option<RowId> {
        self.rows.values().find(|r| r.items.is_empty()).map(|r| r.id)
    }

    /// Id the next created row will receive, if any are left.
    #[must_use]
    pub fn next_row_id(&self) -> Option<RowId> {
        self.next_id
    }

    // --- Row order ---

    /// Move `from` to the display position currently held by `to`.
    pub fn move_row(&mut self, from: RowId, to: RowId) -> Result<(), TemplateError> {
        let from_idx = self.position(from).ok_or(TemplateError::UnknownRow(from))?;
        let to_idx = self.position(to).ok_or(TemplateError::UnknownRow(to))?;
        array_move(&mut self.order, from_idx, to_idx);
        Ok(())
    }

    /// Replace the display order. `order` must be a permutation of the rows.
    pub fn reorder_row_containers(&mut self, order: Vec<RowId>) -> Result<(), TemplateError> {
        let proposed: BTreeSet<RowId> = order.iter().copied().collect();
        if proposed.len() != order.len() || order.len() != self.rows.len() || !order.iter().all(|id| self.rows.contains_key(id)) {
            return Err(TemplateError::InvalidOrder);
        }
        self.order = order;
        Ok(())
    }

    // --- Row contents ---

    /// Remove a row, returning it.
    pub fn delete_row(&mut self, row: RowId) -> Result<Row, TemplateError> {
        let removed = self.rows.remove(&row).ok_or(TemplateError::UnknownRow(row))?;
        self.order.retain(|id| *id != row);
        Ok(removed)
    }

    /// Append a new row holding `items` and return its id.
    pub fn add_new_row(&mut self, items: Vec<ItemId>) -> Result<RowId, TemplateError> {
        if items.is_empty() {
            return Err(TemplateError::NoItems);
        }
        if items.len() > MAX_ITEMS_PER_ROW {
            return Err(TemplateError::TooManyItems { count: items.len() });
        }
        self.ensure_unplaced(&items)?;

        let id = self.next_id.ok_or(TemplateError::RowIdsExhausted)?;
        self.next_id = id.checked_add(1);
        self.rows.insert(id, Row::new(id, items));
        self.order.push(id);
        Ok(id)
    }

    /// Remove `item` from `row`. The row stays even if it becomes empty.
    pub fn delete_item_from_row(&mut self, row: RowId, item: &str) -> Result<(), TemplateError> {
        let target = self.rows.get_mut(&row).ok_or(TemplateError::UnknownRow(row))?;
        let index = target
            .position(item)
            .ok_or_else(|| TemplateError::UnknownItem { row, item: item.to_string() })?;
        target.items.remove(index);
        Ok(())
    }

    /// Append `items` to `row`.
    pub fn add_item_to_row(&mut self, row: RowId, items: Vec<ItemId>) -> Result<(), TemplateError> {
        let remaining = self.remaining_capacity(row).ok_or(TemplateError::UnknownRow(row))?;
        if items.len() > remaining {
            return Err(TemplateError::RowFull { row, capacity: MAX_ITEMS_PER_ROW });
        }
        self.ensure_unplaced(&items)?;
        if let Some(target) = self.rows.get_mut(&row) {
            target.items.extend(items);
        }
        Ok(())
    }

    /// Append a single product to an existing row (product dialog edit path).
    pub fn edit_row(&mut self, row: RowId, item: ItemId) -> Result<(), TemplateError> {
        self.add_item_to_row(row, vec![item])
    }

    /// Insert `item` into `row` at `index` (clamped to the row length).
    pub fn insert_item(&mut self, row: RowId, item: ItemId, index: usize) -> Result<(), TemplateError> {
        let remaining = self.remaining_capacity(row).ok_or(TemplateError::UnknownRow(row))?;
        if remaining == 0 {
            return Err(TemplateError::RowFull { row, capacity: MAX_ITEMS_PER_ROW });
        }
        self.ensure_unplaced(std::slice::from_ref(&item))?;
        if let Some(target) = self.rows.get_mut(&row) {
            let index = index.min(target.items.len());
            target.items.insert(index, item);
        }
        Ok(())
    }

    /// Reorder an item within `row`.
    pub fn move_item(&mut self, row: RowId, from: usize, to: usize) -> Result<(), TemplateError> {
        let target = self.rows.get_mut(&row).ok_or(TemplateError::UnknownRow(row))?;
        if !array_move(&mut target.items, from, to) {
            return Err(TemplateError::IndexOutOfRange { row, index: from.max(to) });
        }
        Ok(())
    }

    /// Change a row's alignment.
    pub fn set_alignment(&mut self, row: RowId, alignment: Alignment) -> Result<(), TemplateError> {
        let target = self.rows.get_mut(&row).ok_or(TemplateError::UnknownRow(row))?;
        target.alignment = alignment;
        Ok(())
    }

    /// Apply an engine mutation.
    pub fn apply(&mut self, mutation: &Mutation) -> Result<(), TemplateError> {
        match mutation {
            Mutation::ReorderRows { order } => self.reorder_row_containers(order.clone()),
            Mutation::MoveRow { row, to } => self.move_row(*row, *to),
            Mutation::DeleteRow { row } => self.delete_row(*row).map(|_| ()),
            Mutation::AddRow { items } => self.add_new_row(items.clone()).map(|_| ()),
            Mutation::RemoveItem { row, item } => self.delete_item_from_row(*row, item),
            Mutation::InsertItem { row, item, index } => self.insert_item(*row, item.clone(), *index),
            Mutation::MoveItem { row, from, to } => self.move_item(*row, *from, *to),
        }
    }

    /// Apply mutations in order, stopping at the first failure.
    pub fn apply_all(&mut self, mutations: &[Mutation]) -> Result<(), TemplateError> {
        for mutation in mutations {
            self.apply(mutation)?;
        }
        Ok(())
    }

    fn ensure_unplaced(&self, items: &[ItemId]) -> Result<(), TemplateError> {
        let mut seen = BTreeSet::new();
        for item in items {
            if !seen.insert(item.as_str()) || self.find_item(item).is_some() {
                return Err(TemplateError::DuplicateItem(item.clone()));
            }
        }
        Ok(())
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<TemplateSnapshot> for Template {
    type Error = TemplateError;

    fn try_from(snapshot: TemplateSnapshot) -> Result<Self, Self::Error> {
        let mut rows = BTreeMap::new();
        let mut listed = Vec::with_capacity(snapshot.rows.len());
        let mut placed = BTreeSet::new();

        for row in snapshot.rows {
            if row.items.len() > MAX_ITEMS_PER_ROW {
                return Err(TemplateError::TooManyItems { count: row.items.len() });
            }
            for item in &row.items {
                if !placed.insert(item.clone()) {
                    return Err(TemplateError::DuplicateItem(item.clone()));
                }
            }
            if rows.contains_key(&row.id) {
                return Err(TemplateError::DuplicateRow(row.id));
            }
            listed.push(row.id);
            rows.insert(row.id, row);
        }

        let next_id = rows.keys().next_back().map_or(Some(1), |max| max.checked_add(1));
        let mut template = Self { rows, order: listed, next_id };
        if !snapshot.order.is_empty() {
            template.reorder_row_containers(snapshot.order)?;
        }
        Ok(template)
    }
}

impl From<Template> for TemplateSnapshot {
    fn from(template: Template) -> Self {
        let Template { mut rows, order, .. } = template;
        let rows = order.iter().filter_map(|id| rows.remove(id)).collect();
        Self { rows, order }
    }
}

// =============================================================================
// PRODUCTS
// =============================================================================

/// A product that rows can reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: f64,
    /// Image as a data URL; empty when none was uploaded.
    #[serde(default)]
    pub image: String,
}

/// Failure to turn a [`ProductDraft`] into a [`Product`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("product name is required")]
    MissingName,
    #[error("product price is required")]
    MissingPrice,
    #[error("invalid product price: {0}")]
    InvalidPrice(f64),
}

/// An uploaded file offered as a product image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    #[must_use]
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { mime: mime.into(), bytes }
    }

    #[must_use]
    pub fn is_image(&self) -> bool {
        self.mime.starts_with(IMAGE_MIME_PREFIX)
    }

    /// Encode as a base64 data URL. `None` for non-image uploads.
    #[must_use]
    pub fn to_data_url(&self) -> Option<String> {
        self.is_image()
            .then(|| format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes)))
    }
}

/// Product form state before submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub price: Option<f64>,
    pub image: Option<String>,
}

impl ProductDraft {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    #[must_use]
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Attach an uploaded image. Non-image files are ignored and leave any
    /// previous image in place; returns whether the upload was taken.
    pub fn attach_image(&mut self, upload: &ImageUpload) -> bool {
        match upload.to_data_url() {
            Some(url) => {
                self.image = Some(url);
                true
            }
            None => {
                tracing::debug!(mime = %upload.mime, "ignoring non-image upload");
                false
            }
        }
    }

    /// Validate the draft.
    pub fn into_product(self) -> Result<Product, CatalogError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(CatalogError::MissingName);
        }
        let price = self.price.ok_or(CatalogError::MissingPrice)?;
        if !price.is_finite() || price < 0.0 {
            return Err(CatalogError::InvalidPrice(price));
        }
        Ok(Product { name, price, image: self.image.unwrap_or_default() })
    }
}

/// Products keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Product>", into = "Vec<Product>")]
pub struct Catalog {
    products: BTreeMap<ItemId, Product>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the product an item refers to.
    #[must_use]
    pub fn get_product(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }

    /// Add or replace a product, returning the item id rows use for it.
    pub fn add_product(&mut self, product: Product) -> ItemId {
        let id = product.name.clone();
        if self.products.insert(id.clone(), product).is_some() {
            tracing::debug!(product = %id, "replaced existing product");
        }
        id
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.products.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl FromIterator<Product> for Catalog {
    fn from_iter<I: IntoIterator<Item = Product>>(iter: I) -> Self {
        let products = iter.into_iter().map(|p| (p.name.clone(), p)).collect();
        Self { products }
    }
}

impl From<Vec<Product>> for Catalog {
    fn from(products: Vec<Product>) -> Self {
        products.into_iter().collect()
    }
}

impl From<Catalog> for Vec<Product> {
    fn from(catalog: Catalog) -> Self {
        catalog.products.into_values().collect()
    }
}
