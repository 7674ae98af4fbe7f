//! User records.
//!
//! Users are provisioned outside the HTTP surface (registration is handled
//! elsewhere; the CLI can create admins).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use grocery_mart_core::{DeliveryAddress, Email, Role, UserId};

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub role: Role,
    /// Default delivery address used when checkout omits one.
    pub address: Option<DeliveryAddress>,
    pub created_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A user to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub role: Role,
    pub address: Option<DeliveryAddress>,
}

/// Customer details shown next to orders in the admin listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
}

impl From<&User> for CustomerSummary {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
        }
    }
}
