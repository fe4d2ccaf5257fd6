// SPDX-License-Identifier: MIT

//! User account model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{collections, Document};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub age: Option<u32>,
    /// in kg
    pub weight: Option<f64>,
    /// in cm
    pub height: Option<u32>,
    /// beginner, intermediate, advanced
    pub fitness_level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    /// Owned by the external auth layer; opaque here.
    #[serde(default)]
    pub hashed_password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile: Option<UserProfile>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl Document for User {
    const COLLECTION: &'static str = collections::USERS;

    fn id(&self) -> &str {
        &self.id
    }
}
