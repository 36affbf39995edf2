//! # Menu Catalog
//!
//! Read-only lookup from a menu item to the recipes it consumes. The
//! reservation engine is the only consumer; it never mutates the catalog,
//! so the trait is synchronous and borrow-returning.

use std::collections::HashMap;

use brew_core::Recipe;

/// Resolves a menu item to its recipe list.
///
/// `None` means the item has no tracked recipes at all (bottled water, a
/// pastry bought in); such lines simply consume no stock.
pub trait MenuCatalog: Send + Sync {
    fn recipes_for(&self, menu_item_id: &str) -> Option<&[Recipe]>;
}

/// Map-backed catalog for tests and single-process deployments.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    recipes: HashMap<String, Vec<Recipe>>,
}

impl StaticCatalog {
    pub fn new() -> StaticCatalog {
        StaticCatalog::default()
    }

    /// Builder-style registration of one menu item's recipes.
    pub fn with_item(mut self, menu_item_id: impl Into<String>, recipes: Vec<Recipe>) -> Self {
        self.recipes.insert(menu_item_id.into(), recipes);
        self
    }

    pub fn insert(&mut self, menu_item_id: impl Into<String>, recipes: Vec<Recipe>) {
        self.recipes.insert(menu_item_id.into(), recipes);
    }
}

impl MenuCatalog for StaticCatalog {
    fn recipes_for(&self, menu_item_id: &str) -> Option<&[Recipe]> {
        self.recipes.get(menu_item_id).map(Vec::as_slice)
    }
}
