//! In-memory `UserStore` for tests. Mirrors the unique-email constraint and
//! the guarded verification update of the PostgreSQL store.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::repo::{StoreError, UserStore};
use super::repo_types::{NewUser, User};

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub async fn get(&self, id: Uuid) -> Option<User> {
        self.users.lock().await.get(&id).cloned()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, new_user: &NewUser) -> Result<User, StoreError> {
        let mut users = self.users.lock().await;
        if users.values().any(|u| u.email == new_user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let user = User {
            id: Uuid::new_v4(),
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            email: new_user.email.clone(),
            phone: new_user.phone.clone(),
            password_hash: new_user.password_hash.clone(),
            email_verified: None,
            image: None,
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.get(id).await)
    }

    async fn mark_verified(&self, id: Uuid, at: OffsetDateTime) -> Result<bool, StoreError> {
        let mut users = self.users.lock().await;
        match users.get_mut(&id) {
            Some(user) if user.email_verified.is_none() => {
                user.email_verified = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
