//! Custom actions for the AddressBook actor.

use crate::model::Address;

/// Update payload: discard in-memory state and re-read the stored snapshot.
#[derive(Debug, Clone, Default)]
pub struct AddressBookReload;

#[derive(Debug, Clone)]
pub enum AddressAction {
    /// Replaces the address with the same id, or appends it.
    Upsert(Address),
    /// Deletes by id.
    Remove(String),
    /// Makes one address the only default. Unknown ids are a no-op.
    SetDefault(String),
}

/// Results from AddressActions - variants match 1:1 with AddressAction
#[derive(Debug, Clone, PartialEq)]
pub enum AddressActionResult {
    /// The address as stored, with its assigned id and label.
    Upsert(Address),
    /// The removed address, `None` if the id was unknown.
    Remove(Option<Address>),
    /// Whether the id was found.
    SetDefault(bool),
}
