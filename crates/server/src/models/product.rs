//! Catalog product types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use grocery_mart_core::{Category, Price, ProductId};

/// Image used when an admin does not supply one.
pub const DEFAULT_IMAGE: &str = "https://via.placeholder.com/300x300?text=Product";

/// Unit label used when an admin does not supply one.
pub const DEFAULT_UNIT: &str = "piece";

/// Highest rating a product can carry.
pub const MAX_RATING: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Largest page a product listing returns.
pub const MAX_LIST_LIMIT: usize = 100;

/// A product in the catalog (live record).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub price: Price,
    /// Units available. Only checkout's conditional decrement lowers it.
    pub stock: u32,
    pub image: String,
    pub unit: String,
    pub rating: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated product to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub category: Category,
    pub price: Price,
    pub stock: u32,
    #[serde(default = "default_image")]
    pub image: String,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default)]
    pub rating: Decimal,
}

fn default_image() -> String {
    DEFAULT_IMAGE.to_string()
}

fn default_unit() -> String {
    DEFAULT_UNIT.to_string()
}

/// A partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub price: Option<Price>,
    pub stock: Option<u32>,
    pub image: Option<String>,
    pub unit: Option<String>,
    pub rating: Option<Decimal>,
}

impl ProductPatch {
    /// Apply the patch to a product in place.
    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            product.description.clone_from(description);
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(image) = &self.image {
            product.image.clone_from(image);
        }
        if let Some(unit) = &self.unit {
            product.unit.clone_from(unit);
        }
        if let Some(rating) = self.rating {
            product.rating = rating;
        }
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Public listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category: Option<Category>,
    /// Case-insensitive substring matched against name and description.
    pub search: Option<String>,
    pub limit: Option<usize>,
}

impl ProductFilter {
    /// Whether a product passes the category and search criteria.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if self.category.is_some_and(|c| c != product.category) {
            return false;
        }
        match self.search_term() {
            Some(term) => {
                product.name.to_lowercase().contains(&term)
                    || product.description.to_lowercase().contains(&term)
            }
            None => true,
        }
    }

    /// Normalised search term, if any.
    #[must_use]
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Limit clamped to `1..=MAX_LIST_LIMIT`.
    #[must_use]
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(MAX_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
    }
}
