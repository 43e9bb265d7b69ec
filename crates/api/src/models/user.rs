//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use culinary_core::{Email, UserId};

/// A registered user.
///
/// Serialized directly as the wire document; the `version` marker stays
/// internal.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(rename = "nombre")]
    pub name: String,
    pub email: Email,
    #[serde(rename = "edad", skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(rename = "pais", skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip)]
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a user.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    #[serde(rename = "nombre")]
    pub name: String,
    pub email: Email,
    #[serde(rename = "edad", default)]
    pub age: Option<i32>,
    #[serde(rename = "pais", default)]
    pub country: Option<String>,
}

/// A partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserChanges {
    #[serde(rename = "nombre", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<Email>,
    #[serde(rename = "edad", default)]
    pub age: Option<i32>,
    #[serde(rename = "pais", default)]
    pub country: Option<String>,
}

impl UserChanges {
    /// Apply the supplied fields to a stored user.
    pub fn apply_to(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(age) = self.age {
            user.age = Some(age);
        }
        if let Some(country) = self.country {
            user.country = Some(country);
        }
    }
}
