use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::dto::PublicUser;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String, // Argon2 hash; `into_public` drops it
    pub email_verified: Option<OffsetDateTime>, // None until activation
    pub image: Option<String>,
    pub created_at: OffsetDateTime,
}

impl User {
    pub fn is_verified(&self) -> bool {
        self.email_verified.is_some()
    }

    /// Drops the password hash.
    pub fn into_public(self) -> PublicUser {
        PublicUser {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            email_verified: self.email_verified,
            image: self.image,
        }
    }
}

/// Row to insert. `password_hash` must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
}
