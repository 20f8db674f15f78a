//! Custom actions for the Cart actor.
//!
//! Every mutating action writes through to the shopper's remote `cart` collection before the
//! in-memory cart changes. Reads go through `get` and the derived totals on [`Cart`](crate::model::Cart).

use crate::model::{CartLine, Product, ProductId};

#[derive(Debug, Clone)]
pub enum CartAction {
    /// Adds one unit: merges into an existing line or opens a new one with quantity 1.
    Add(Product),
    /// Overwrites a line's quantity; zero or less deletes the line.
    SetQuantity { product_id: ProductId, quantity: i64 },
    /// Deletes a line. Absent lines are a no-op.
    Remove(ProductId),
    /// Deletes every line, e.g. after a successful payment.
    Clear,
}

/// Results from CartActions - variants match 1:1 with CartAction
#[derive(Debug, Clone)]
pub enum CartActionResult {
    /// The line after the add, and whether it merged into an existing one.
    Add { line: CartLine, merged: bool },
    /// The line after the change, `None` if it was deleted or never existed.
    SetQuantity(Option<CartLine>),
    /// Whether a line was actually removed.
    Remove(bool),
    /// Number of lines cleared.
    Clear(usize),
}
