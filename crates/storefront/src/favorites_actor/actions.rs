//! Custom actions for the Favorites actor.

use crate::model::{Product, ProductId};

#[derive(Debug, Clone)]
pub enum FavoritesAction {
    /// Removes the product if it is a favorite, adds it otherwise.
    Toggle(Product),
    Add(Product),
    Remove(ProductId),
}

/// Results from FavoritesActions - variants match 1:1 with FavoritesAction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoritesActionResult {
    /// Whether the product is a favorite after the toggle.
    Toggle(bool),
    /// Whether the add changed membership.
    Add(bool),
    /// Whether the remove changed membership.
    Remove(bool),
}
