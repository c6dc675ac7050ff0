use std::sync::Arc;

use crate::auth::{jwt::JwtKeys, session::AuthOptions};
use crate::config::AppConfig;
use crate::mailer::{self, Mailer};
use crate::users::{PgUserStore, UserStore};
use crate::db;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn UserStore>,
    pub mailer: Arc<dyn Mailer>,
    pub jwt: JwtKeys,
    pub auth: Arc<AuthOptions>,
}

impl AppState {
    pub async fn init(auth: AuthOptions) -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let pool = db::connect(&config.database_url).await?;
        if let Err(e) = db::migrate(&pool).await {
            tracing::warn!(error = %e, "migration failed; continuing");
        }

        let store = Arc::new(PgUserStore::new(pool)) as Arc<dyn UserStore>;
        let mailer = mailer::from_config(config.mail.as_ref())?;

        Ok(Self::from_parts(config, store, mailer, auth))
    }

    pub fn from_parts(
        config: AppConfig,
        store: Arc<dyn UserStore>,
        mailer: Arc<dyn Mailer>,
        auth: AuthOptions,
    ) -> Self {
        Self {
            jwt: JwtKeys::new(&config.jwt),
            config: Arc::new(config),
            store,
            mailer,
            auth: Arc::new(auth),
        }
    }
}
