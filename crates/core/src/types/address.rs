//! Delivery address snapshot.

use serde::{Deserialize, Serialize};

/// Errors from [`DeliveryAddress::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// A required field is blank.
    #[error("delivery address {0} is required")]
    MissingField(&'static str),
}

/// A postal delivery address.
///
/// Stored as a copy on every order, so later profile edits never change where
/// a past order was shipped.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAddress {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
}

impl DeliveryAddress {
    /// Check that the fields needed to deliver are present.
    ///
    /// `state` is optional; street, city and zip code are not.
    ///
    /// # Errors
    ///
    /// Returns the first blank required field.
    pub fn validate(&self) -> Result<(), AddressError> {
        if self.street.trim().is_empty() {
            return Err(AddressError::MissingField("street"));
        }
        if self.city.trim().is_empty() {
            return Err(AddressError::MissingField("city"));
        }
        if self.zip_code.trim().is_empty() {
            return Err(AddressError::MissingField("zipCode"));
        }
        Ok(())
    }

    /// Whether every field is blank (an address that was never filled in).
    #[must_use]
    pub fn is_blank(&self) -> bool {
        [&self.street, &self.city, &self.state, &self.zip_code]
            .iter()
            .all(|field| field.trim().is_empty())
    }
}
