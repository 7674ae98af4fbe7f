//! Product categories.

use serde::{Deserialize, Serialize};

use super::status::UnknownVariant;

/// The fixed set of catalog categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Fruits,
    Vegetables,
    Dairy,
    Snacks,
    Beverages,
    Household,
    Staples,
    #[serde(rename = "Personal Care")]
    PersonalCare,
    Health,
}

impl Category {
    /// Every category.
    pub const ALL: [Self; 9] = [
        Self::Fruits,
        Self::Vegetables,
        Self::Dairy,
        Self::Snacks,
        Self::Beverages,
        Self::Household,
        Self::Staples,
        Self::PersonalCare,
        Self::Health,
    ];

    /// Canonical string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fruits => "Fruits",
            Self::Vegetables => "Vegetables",
            Self::Dairy => "Dairy",
            Self::Snacks => "Snacks",
            Self::Beverages => "Beverages",
            Self::Household => "Household",
            Self::Staples => "Staples",
            Self::PersonalCare => "Personal Care",
            Self::Health => "Health",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("category", s))
    }
}
