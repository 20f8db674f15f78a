use crate::model::{Product, ProductId, UserId};
use crate::store::Revision;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A favorited product: the product fields at the time it was favorited, plus when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteEntry {
    #[serde(rename = "id")]
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub added_at: DateTime<Utc>,
}

impl FavoriteEntry {
    pub fn from_product(product: &Product, added_at: DateTime<Utc>) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            category: product.category.clone(),
            description: product.description.clone(),
            added_at,
        }
    }
}

/// The favorites set of one signed-in shopper, mirrored from the remote `favorites` collection.
///
/// Membership is a set keyed by product id; `entries` keeps store order for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Favorites {
    pub owner: UserId,
    pub entries: Vec<FavoriteEntry>,
    pub revision: Revision,
}

#[derive(Debug, Clone, Default)]
pub struct FavoritesCreate;

impl Favorites {
    pub fn new(owner: UserId) -> Self {
        Self {
            owner,
            entries: Vec::new(),
            revision: 0,
        }
    }

    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.entries.iter().any(|e| &e.product_id == product_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
