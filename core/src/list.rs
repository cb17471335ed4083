//! The shopping list and its add/edit/delete transitions.
//!
//! # Design
//! - Ids come from a counter owned by the controller, so deleting an item
//!   and adding another never hands out an id that is still in the list.
//! - At most one item is being edited. That is an `Option<ItemId>` on the
//!   controller rather than a flag on every item that callers have to keep
//!   consistent.
//! - Name and quantity are validated before anything is mutated, so a
//!   rejected add or edit leaves the list exactly as it was.

use tracing::debug;

use crate::error::ListError;
use crate::types::{ItemId, ItemView, ShoppingItem};

/// Text typed into the add-item dialog and not yet submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemDraft {
    pub name: String,
    pub quantity: String,
}

impl ItemDraft {
    pub fn clear(&mut self) {
        self.name.clear();
        self.quantity.clear();
    }
}

/// Owns the ordered items and the single in-progress edit.
#[derive(Debug)]
pub struct ShoppingListController {
    items: Vec<ShoppingItem>,
    editing: Option<ItemId>,
    next_id: u64,
    draft: ItemDraft,
}

impl Default for ShoppingListController {
    fn default() -> Self {
        Self::new()
    }
}

impl ShoppingListController {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            editing: None,
            next_id: 1,
            draft: ItemDraft::default(),
        }
    }

    pub fn items(&self) -> &[ShoppingItem] {
        &self.items
    }

    pub fn get(&self, id: ItemId) -> Option<&ShoppingItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The item currently being edited, if any.
    pub fn editing(&self) -> Option<ItemId> {
        self.editing
    }

    pub fn is_editing(&self, id: ItemId) -> bool {
        self.editing == Some(id)
    }

    /// Snapshot of every row in insertion order.
    pub fn views(&self) -> Vec<ItemView> {
        self.items
            .iter()
            .map(|item| ItemView::new(item, self.is_editing(item.id)))
            .collect()
    }

    pub fn draft(&self) -> &ItemDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ItemDraft {
        &mut self.draft
    }

    /// Append a new item.
    ///
    /// Rejects a blank name or a quantity that is not a whole number. On
    /// success the draft buffers are cleared.
    pub fn add_item(
        &mut self,
        name: &str,
        quantity_text: &str,
        address: &str,
    ) -> Result<ItemId, ListError> {
        let (name, quantity) = validate(name, quantity_text)?;

        let id = ItemId(self.next_id);
        self.next_id += 1;
        self.items.push(ShoppingItem {
            id,
            name,
            quantity,
            address: address.to_string(),
        });
        self.draft.clear();

        debug!(%id, quantity, "item added");
        Ok(id)
    }

    /// Add an item from the draft buffers.
    pub fn submit_draft(&mut self, address: &str) -> Result<ItemId, ListError> {
        let ItemDraft { name, quantity } = self.draft.clone();
        self.add_item(&name, &quantity, address)
    }

    /// Select `id` for editing and deselect everything else.
    ///
    /// Returns false, with nothing selected, when no item has that id.
    pub fn begin_edit(&mut self, id: ItemId) -> bool {
        if self.get(id).is_some() {
            self.editing = Some(id);
            debug!(%id, "edit started");
            true
        } else {
            self.editing = None;
            false
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Save an edit, overwriting name, quantity and address of `id`.
    ///
    /// A validation failure leaves both the items and the selection
    /// untouched so the editor can stay open. Otherwise the selection is
    /// cleared, even when `id` no longer exists.
    pub fn complete_edit(
        &mut self,
        id: ItemId,
        name: &str,
        quantity_text: &str,
        address: &str,
    ) -> Result<(), ListError> {
        let (name, quantity) = validate(name, quantity_text)?;

        self.editing = None;
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(ListError::ItemNotFound(id))?;
        item.name = name;
        item.quantity = quantity;
        item.address = address.to_string();

        debug!(%id, quantity, "edit saved");
        Ok(())
    }

    /// Remove `id` from the list. Returns whether anything was removed.
    pub fn delete_item(&mut self, id: ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.editing == Some(id) {
            self.editing = None;
        }
        let removed = self.items.len() != before;
        if removed {
            debug!(%id, "item deleted");
        }
        removed
    }
}

fn validate(name: &str, quantity_text: &str) -> Result<(String, i32), ListError> {
    if name.trim().is_empty() {
        return Err(ListError::EmptyName);
    }
    let quantity = quantity_text
        .trim()
        .parse::<i32>()
        .map_err(|_| ListError::InvalidQuantity {
            text: quantity_text.to_string(),
        })?;
    Ok((name.to_string(), quantity))
}
