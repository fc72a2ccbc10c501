//! Product dialog service: create a product or place existing ones.
//!
//! DESIGN
//! ======
//! The dialog opens either for a new row or for an existing row being edited.
//! Both flows end in a single template command: `add_new_row` for a new row,
//! `add_item_to_row` for an edited one. Capacity is checked before anything is
//! written, so a rejected submission leaves both catalog and template as they
//! were.

use grid::consts::MAX_ITEMS_PER_ROW;
use grid::doc::{CatalogError, TemplateError};
use grid::{Catalog, ItemId, ProductDraft, RowId, Template};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DialogError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("unknown product `{0}`")]
    UnknownProduct(ItemId),
    #[error("select at most {max} products")]
    TooManySelected { max: usize },
    #[error("no products selected")]
    NothingSelected,
}

/// Free slots for the dialog's target: a whole row when creating one.
fn capacity_for(template: &Template, edited_row: Option<RowId>) -> Result<usize, TemplateError> {
    match edited_row {
        None => Ok(MAX_ITEMS_PER_ROW),
        Some(row) => template.remaining_capacity(row).ok_or(TemplateError::UnknownRow(row)),
    }
}

/// Submit the create-product form.
///
/// Adds the product to the catalog, then either appends it to `edited_row`
/// or places it alone in a new row. Returns the row that now holds it.
pub fn submit_product(
    template: &mut Template,
    catalog: &mut Catalog,
    draft: ProductDraft,
    edited_row: Option<RowId>,
) -> Result<RowId, DialogError> {
    let product = draft.into_product()?;

    if let Some(row) = edited_row {
        if capacity_for(template, Some(row))? == 0 {
            return Err(TemplateError::RowFull { row, capacity: MAX_ITEMS_PER_ROW }.into());
        }
    }
    if template.find_item(&product.name).is_some() {
        return Err(TemplateError::DuplicateItem(product.name).into());
    }

    let item = catalog.add_product(product);
    let row = match edited_row {
        Some(row) => {
            template.edit_row(row, item.clone())?;
            row
        }
        None => template.add_new_row(vec![item.clone()])?,
    };
    tracing::info!(product = %item, row, "product created");
    Ok(row)
}

/// Selection state of the product list dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPicker {
    edited_row: Option<RowId>,
    selected: Vec<ItemId>,
}

impl ProductPicker {
    #[must_use]
    pub fn new(edited_row: Option<RowId>) -> Self {
        Self { edited_row, selected: Vec::new() }
    }

    #[must_use]
    pub fn edited_row(&self) -> Option<RowId> {
        self.edited_row
    }

    #[must_use]
    pub fn selected(&self) -> &[ItemId] {
        &self.selected
    }

    /// How many products may be selected in total.
    #[must_use]
    pub fn max_selectable(&self, template: &Template) -> usize {
        capacity_for(template, self.edited_row).unwrap_or(0)
    }

    /// Hint shown above the list.
    #[must_use]
    pub fn limit_label(&self, template: &Template) -> String {
        format!("Up to {} products", self.max_selectable(template))
    }

    /// Select or deselect a product. Returns whether it is now selected.
    pub fn toggle(&mut self, template: &Template, catalog: &Catalog, item: &str) -> Result<bool, DialogError> {
        if let Some(index) = self.selected.iter().position(|s| s == item) {
            self.selected.remove(index);
            return Ok(false);
        }
        if !catalog.contains(item) {
            return Err(DialogError::UnknownProduct(item.to_string()));
        }
        if template.find_item(item).is_some() {
            return Err(TemplateError::DuplicateItem(item.to_string()).into());
        }
        let max = self.max_selectable(template);
        if self.selected.len() >= max {
            return Err(DialogError::TooManySelected { max });
        }
        self.selected.push(item.to_string());
        Ok(true)
    }

    /// Place the selection and clear it. Returns the row that received it.
    pub fn submit(&mut self, template: &mut Template) -> Result<RowId, DialogError> {
        if self.selected.is_empty() {
            return Err(DialogError::NothingSelected);
        }
        let items = self.selected.clone();
        let row = match self.edited_row {
            Some(row) => {
                template.add_item_to_row(row, items)?;
                row
            }
            None => template.add_new_row(items)?,
        };
        tracing::info!(row, count = self.selected.len(), "products placed");
        self.selected.clear();
        Ok(row)
    }
}

#[cfg(test)]
#[path = "dialog_test.rs"]
mod tests;
