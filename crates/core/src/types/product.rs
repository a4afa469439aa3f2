//! Products as the storefront shows them.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId};
use super::price::Price;

/// Image shown when a product has no picture of its own.
pub const PLACEHOLDER_IMAGE: &str = "/static/img/placeholder.svg";

/// A product with its current stock merged in from inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub category: ProductCategory,
    pub category_id: Option<CategoryId>,
    /// Bottle or can volume in millilitres.
    pub volume_ml: u32,
    /// Alcohol by volume, as a percentage.
    pub alcohol_content: Decimal,
    pub price: Price,
    pub image: String,
    pub description: String,
    /// Units on hand. Zero when the product has no inventory row.
    pub stock: u32,
    pub featured: bool,
}

impl Product {
    /// Whether at least one unit can be added to a cart.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Case-insensitive substring match over name, brand, description and
    /// category. An empty needle matches everything.
    #[must_use]
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [
            self.name.as_str(),
            self.brand.as_str(),
            self.description.as_str(),
            self.category.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// The category label carried on each product row.
///
/// The four shop departments get their own variants; anything else the
/// backend holds is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProductCategory {
    Beer,
    Wine,
    Spirits,
    #[default]
    Mixers,
    Other(String),
}

impl ProductCategory {
    /// Parse a backend label. Blank input falls back to the default.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "" | "mixers" => Self::Mixers,
            "beer" => Self::Beer,
            "wine" => Self::Wine,
            "spirits" => Self::Spirits,
            _ => Self::Other(s.to_owned()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Beer => "beer",
            Self::Wine => "wine",
            Self::Spirits => "spirits",
            Self::Mixers => "mixers",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ProductCategory {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<ProductCategory> for String {
    fn from(category: ProductCategory) -> Self {
        category.as_str().to_owned()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use rust_decimal::Decimal;

    use super::*;

    /// A minimal product for tests.
    pub fn product(name: &str, price: Decimal, stock: u32) -> Product {
        let price = Price::usd(price);
        Product {
            id: ProductId::random(),
            name: name.to_owned(),
            brand: String::new(),
            category: ProductCategory::default(),
            category_id: None,
            volume_ml: 0,
            alcohol_content: Decimal::ZERO,
            featured: price.is_featured(),
            price,
            image: PLACEHOLDER_IMAGE.to_owned(),
            description: String::new(),
            stock,
        }
    }
}
