//! Shipping addresses and the per-shopper address book.
//!
//! The book maintains one invariant: a non-empty book has exactly one default address and an
//! empty book has none. Every mutating method below leaves the book in that state.

use crate::model::UserId;
use serde::{Deserialize, Serialize};

/// The deliverable part of an address. Orders copy this by value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingAddress {
    pub full_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: String,
}

impl ShippingAddress {
    /// Names of the required fields that are blank, in form order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("fullName", &self.full_name),
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("zipCode", &self.zip_code),
            ("phone", &self.phone),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// A saved address in the book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Empty on a new address; the book assigns one.
    #[serde(default)]
    pub id: String,
    /// Display name such as "Home". Older snapshots call it `name`.
    #[serde(default, alias = "name")]
    pub label: String,
    #[serde(flatten)]
    pub shipping: ShippingAddress,
    #[serde(default)]
    pub is_default: bool,
}

impl Address {
    pub fn new(label: impl Into<String>, shipping: ShippingAddress) -> Self {
        Self {
            id: String::new(),
            label: label.into(),
            shipping,
            is_default: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }
}

/// All saved addresses of one shopper, persisted in the local snapshot store.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressBook {
    pub owner: UserId,
    pub addresses: Vec<Address>,
}

#[derive(Debug, Clone, Default)]
pub struct AddressBookCreate;

impl AddressBook {
    pub fn new(owner: UserId) -> Self {
        Self {
            owner,
            addresses: Vec::new(),
        }
    }

    /// Builds a book from stored addresses, repairing the default flag if needed.
    pub fn from_stored(owner: UserId, addresses: Vec<Address>) -> Self {
        let mut book = Self { owner, addresses };
        book.normalize_default();
        book
    }

    pub fn get(&self, id: &str) -> Option<&Address> {
        self.addresses.iter().find(|a| a.id == id)
    }

    /// The default address, falling back to the first one.
    pub fn default_address(&self) -> Option<&Address> {
        self.addresses
            .iter()
            .find(|a| a.is_default)
            .or_else(|| self.addresses.first())
    }

    /// Replaces the address with the same id in place, or appends a new one.
    ///
    /// A blank id gets a fresh UUID and a blank label becomes `Address N`. The first address
    /// and any address saved as default become the only default. Returns the stored address.
    pub fn upsert(&mut self, mut address: Address) -> Address {
        if address.id.trim().is_empty() {
            address.id = uuid::Uuid::new_v4().to_string();
        }

        let position = self.addresses.iter().position(|a| a.id == address.id);
        if address.label.trim().is_empty() {
            let n = position.unwrap_or(self.addresses.len()) + 1;
            address.label = format!("Address {n}");
        }
        if self.addresses.is_empty() {
            address.is_default = true;
        }
        if address.is_default {
            for other in &mut self.addresses {
                other.is_default = false;
            }
        }

        match position {
            Some(index) => self.addresses[index] = address.clone(),
            None => self.addresses.push(address.clone()),
        }

        // Un-defaulting the only default promotes the first entry
        self.normalize_default();
        self.get(&address.id).cloned().unwrap_or(address)
    }

    /// Deletes an address. Removing the default promotes the first remaining address.
    pub fn remove(&mut self, id: &str) -> Option<Address> {
        let index = self.addresses.iter().position(|a| a.id == id)?;
        let removed = self.addresses.remove(index);
        if removed.is_default {
            if let Some(first) = self.addresses.first_mut() {
                first.is_default = true;
            }
        }
        Some(removed)
    }

    /// Makes `id` the only default. Unknown ids leave the book unchanged and return false.
    pub fn set_default(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        for address in &mut self.addresses {
            address.is_default = address.id == id;
        }
        true
    }

    fn normalize_default(&mut self) {
        let mut seen = false;
        for address in &mut self.addresses {
            if address.is_default {
                if seen {
                    address.is_default = false;
                }
                seen = true;
            }
        }
        if !seen {
            if let Some(first) = self.addresses.first_mut() {
                first.is_default = true;
            }
        }
    }

    pub fn default_count(&self) -> usize {
        self.addresses.iter().filter(|a| a.is_default).count()
    }
}
