use std::{collections::HashSet, sync::Arc};

use serde::Serialize;
use time::OffsetDateTime;

use super::{dto::PublicUser, jwt::Claims};

/// Login strategies the service can enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Credentials,
}

impl Provider {
    pub fn id(self) -> &'static str {
        match self {
            Provider::Credentials => "credentials",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Provider::Credentials => "Credentials",
        }
    }
}

/// Route overrides for the auth pages.
#[derive(Debug, Clone)]
pub struct Pages {
    pub sign_in: String,
    /// Advertised to clients through the providers listing.
    pub sign_up: String,
    /// Prefix of activation links; the token is appended as the last segment.
    pub activation: String,
}

impl Default for Pages {
    fn default() -> Self {
        Self {
            sign_in: "/auth/signin".into(),
            sign_up: "/auth/signup".into(),
            activation: "/auth/activation".into(),
        }
    }
}

/// What the client sees as its session.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user: Option<PublicUser>,
    #[serde(with = "time::serde::rfc3339")]
    pub expires: OffsetDateTime,
}

/// Hooks run when a session token is issued and when it is read back.
pub trait SessionCallbacks: Send + Sync {
    fn on_token_issued(&self, mut claims: Claims, user: &PublicUser) -> Claims {
        claims.user = Some(user.clone());
        claims
    }

    fn on_session_read(&self, mut session: Session, claims: &Claims) -> Session {
        session.user = claims.user.clone();
        session
    }
}

/// Copies the signed-in user into the token and back out onto the session.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyUserCallbacks;

impl SessionCallbacks for CopyUserCallbacks {}

/// Auth configuration built once at start-up and shared through `AppState`.
#[derive(Clone)]
pub struct AuthOptions {
    pub providers: HashSet<Provider>,
    pub pages: Pages,
    pub callbacks: Arc<dyn SessionCallbacks>,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            providers: HashSet::from([Provider::Credentials]),
            pages: Pages::default(),
            callbacks: Arc::new(CopyUserCallbacks),
        }
    }
}

impl AuthOptions {
    pub fn enabled(&self, provider: Provider) -> bool {
        self.providers.contains(&provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::TokenKind;
    use uuid::Uuid;

    fn user() -> PublicUser {
        PublicUser {
            id: Uuid::new_v4(),
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: "grace@example.com".into(),
            phone: "5550100200".into(),
            email_verified: Some(OffsetDateTime::now_utc()),
            image: None,
        }
    }

    fn claims(sub: Uuid) -> Claims {
        Claims {
            sub,
            iat: 0,
            exp: 60,
            iss: "iss".into(),
            aud: "aud".into(),
            kind: TokenKind::Session,
            user: None,
        }
    }

    #[test]
    fn default_callbacks_pass_the_user_through() {
        let cb = CopyUserCallbacks;
        let user = user();
        let issued = cb.on_token_issued(claims(user.id), &user);
        assert_eq!(issued.user.as_ref(), Some(&user));

        let session = cb.on_session_read(
            Session {
                user: None,
                expires: OffsetDateTime::UNIX_EPOCH,
            },
            &issued,
        );
        assert_eq!(session.user, Some(user));
    }

    #[test]
    fn custom_callbacks_can_hide_fields() {
        struct NoPhone;
        impl SessionCallbacks for NoPhone {
            fn on_token_issued(&self, mut claims: Claims, user: &PublicUser) -> Claims {
                let mut user = user.clone();
                user.phone.clear();
                claims.user = Some(user);
                claims
            }
        }

        let user = user();
        let issued = NoPhone.on_token_issued(claims(user.id), &user);
        assert_eq!(issued.user.map(|u| u.phone), Some(String::new()));
    }

    #[test]
    fn credentials_enabled_by_default() {
        let opts = AuthOptions::default();
        assert!(opts.enabled(Provider::Credentials));
        assert_eq!(opts.pages.activation, "/auth/activation");
    }
}
