use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{NewUser, User};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => Self::DuplicateEmail,
            other => Self::Database(other),
        }
    }
}

/// Persistent user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new unverified user. Fails with `DuplicateEmail` when the
    /// email is taken.
    async fn create(&self, new_user: &NewUser) -> Result<User, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    /// Set `email_verified` if it is still unset. Returns whether a row changed.
    async fn mark_verified(&self, id: Uuid, at: OffsetDateTime) -> Result<bool, StoreError>;
}

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, phone, password_hash, email_verified, image, created_at";

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new_user: &NewUser) -> Result<User, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO users (first_name, last_name, email, phone, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&new_user.first_name)
            .bind(&new_user.last_name)
            .bind(&new_user.email)
            .bind(&new_user.phone)
            .bind(&new_user.password_hash)
            .fetch_one(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn mark_verified(&self, id: Uuid, at: OffsetDateTime) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email_verified = $2
            WHERE id = $1 AND email_verified IS NULL
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
