//! View State
//!
//! Which of the four screens is showing, and which item it is about.
//! Pure transitions; no backend calls.

use crate::domain::WishlistItem;

/// Mutually exclusive view modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    List,
    Detail,
    Add,
    Edit,
}

/// Current view plus the selected item's id
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    pub mode: ViewMode,
    pub selected: Option<String>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// list -> detail
    pub fn select(&mut self, id: &str) {
        self.selected = Some(id.to_string());
        self.mode = ViewMode::Detail;
    }

    /// detail -> list
    pub fn back(&mut self) {
        self.selected = None;
        self.mode = ViewMode::List;
    }

    /// detail -> edit
    pub fn open_edit(&mut self) {
        if self.mode == ViewMode::Detail && self.selected.is_some() {
            self.mode = ViewMode::Edit;
        }
    }

    /// list/detail -> add
    pub fn open_add(&mut self) {
        if matches!(self.mode, ViewMode::List | ViewMode::Detail) {
            self.mode = ViewMode::Add;
        }
    }

    /// add/edit cancelled, or add saved: back to the item if one is selected
    pub fn close_form(&mut self) {
        if matches!(self.mode, ViewMode::Add | ViewMode::Edit) {
            self.mode = if self.selected.is_some() { ViewMode::Detail } else { ViewMode::List };
        }
    }

    /// edit saved -> detail
    pub fn edit_saved(&mut self) {
        if self.mode == ViewMode::Edit {
            self.mode = ViewMode::Detail;
        }
    }

    /// An item was deleted; leave its detail page
    pub fn item_removed(&mut self, id: &str) {
        if self.selected.as_deref() == Some(id) {
            self.back();
        }
    }

    /// Drop a selection that no longer exists in `items`
    pub fn reconcile(&mut self, items: &[WishlistItem]) {
        let Some(selected) = self.selected.as_deref() else {
            return;
        };
        if items.iter().any(|item| item.id == selected) {
            return;
        }
        match self.mode {
            ViewMode::Detail | ViewMode::Edit => self.back(),
            // The add form stays open; it returns to the list afterwards
            ViewMode::Add => self.selected = None,
            ViewMode::List => self.selected = None,
        }
    }

    /// The floating add button is hidden while a form is open
    pub fn shows_add_control(&self) -> bool {
        !matches!(self.mode, ViewMode::Add | ViewMode::Edit)
    }
}
