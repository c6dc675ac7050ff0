//! Fakes wired into an `AppState` for unit and router tests.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::auth::session::AuthOptions;
use crate::config::{AppConfig, JwtConfig};
use crate::mailer::{EmailMessage, Mailer};
use crate::state::AppState;
use crate::users::{memory::MemoryUserStore, UserStore};

/// Keeps every message; can be told to fail the next send.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
    fail_next: AtomicBool,
}

impl RecordingMailer {
    pub async fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().await.clone()
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            anyhow::bail!("smtp unavailable");
        }
        self.sent.lock().await.push(message.clone());
        Ok(())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryUserStore>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_options(AuthOptions::default())
    }

    pub fn with_options(auth: AuthOptions) -> Self {
        let store = Arc::new(MemoryUserStore::default());
        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState::from_parts(
            test_config(),
            store.clone() as Arc<dyn UserStore>,
            mailer.clone() as Arc<dyn Mailer>,
            auth,
        );
        Self {
            state,
            store,
            mailer,
        }
    }
}

/// State around a caller-supplied store, for cases the in-memory one can't stage.
pub fn state_with_store(store: Arc<dyn UserStore>) -> AppState {
    AppState::from_parts(
        test_config(),
        store,
        Arc::new(RecordingMailer::default()),
        AuthOptions::default(),
    )
}

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".into(),
        base_url: "http://app.test".into(),
        jwt: JwtConfig {
            secret: "test-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            session_ttl_minutes: 60,
        },
        mail: None,
    }
}
