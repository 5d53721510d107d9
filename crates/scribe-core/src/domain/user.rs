use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity - a post author. Identity itself lives with the token issuer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Mirror an externally issued identity.
    pub fn new(id: Uuid, username: String, email: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            username,
            email,
            created_at: now,
            updated_at: now,
        }
    }

    /// Username derived from the local part of an email address.
    pub fn from_email(id: Uuid, email: &str) -> Self {
        let username = email.split('@').next().unwrap_or(email).to_string();
        Self::new(id, username, email.to_string())
    }
}
