use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::dto::PublicUser;
use crate::{config::JwtConfig, state::AppState};

/// Activation links stay redeemable for this long.
pub const ACTIVATION_TTL: Duration = Duration::from_secs(60 * 60 * 24);

/// Type of JWT: activation link or signed-in session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Activation,
    Session,
}

/// JWT payload shared by both token kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,       // user ID
    pub iat: usize,      // issued at (unix timestamp)
    pub exp: usize,      // expires at (unix timestamp)
    pub iss: String,     // issuer
    pub aud: String,     // audience
    pub kind: TokenKind, // activation or session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUser>, // filled by the token-issued callback
}

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    activation_ttl: Duration,
    session_ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            activation_ttl: ACTIVATION_TTL,
            session_ttl: Duration::from_secs((cfg.session_ttl_minutes.max(1) as u64) * 60),
        }
    }

    /// Fresh claims for `user_id`, expiring after the TTL of `kind`.
    pub fn claims(&self, user_id: Uuid, kind: TokenKind) -> Claims {
        let now = OffsetDateTime::now_utc();
        let ttl = match kind {
            TokenKind::Activation => self.activation_ttl,
            TokenKind::Session => self.session_ttl,
        };
        let exp = now + TimeDuration::seconds(ttl.as_secs() as i64);
        Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind,
            user: None,
        }
    }

    pub fn sign(&self, claims: &Claims) -> anyhow::Result<String> {
        let token = encode(&Header::default(), claims, &self.encoding)?;
        debug!(user_id = %claims.sub, kind = ?claims.kind, "jwt signed");
        Ok(token)
    }

    pub fn sign_activation(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.sign(&self.claims(user_id, TokenKind::Activation))
    }

    /// Checks signature, expiry, issuer and audience.
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, kind = ?data.claims.kind, "jwt verified");
        Ok(data.claims)
    }

    fn verify_kind(&self, token: &str, kind: TokenKind) -> anyhow::Result<Claims> {
        let claims = self.verify(token)?;
        if claims.kind != kind {
            anyhow::bail!("expected a {kind:?} token");
        }
        Ok(claims)
    }

    /// Returns the user id an activation token was issued for.
    pub fn verify_activation(&self, token: &str) -> anyhow::Result<Uuid> {
        Ok(self.verify_kind(token, TokenKind::Activation)?.sub)
    }

    pub fn verify_session(&self, token: &str) -> anyhow::Result<Claims> {
        self.verify_kind(token, TokenKind::Session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            session_ttl_minutes: 5,
        })
    }

    #[test]
    fn activation_token_round_trips_user_id() {
        let keys = make_keys("dev-secret", "test-issuer", "test-aud");
        let user_id = Uuid::new_v4();
        let token = keys.sign_activation(user_id).expect("sign activation");
        assert_eq!(keys.verify_activation(&token).expect("verify"), user_id);

        let claims = keys.verify(&token).expect("verify claims");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert_eq!(claims.exp - claims.iat, ACTIVATION_TTL.as_secs() as usize);
    }

    #[test]
    fn session_token_is_not_an_activation_token() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let token = keys
            .sign(&keys.claims(Uuid::new_v4(), TokenKind::Session))
            .expect("sign session");
        let err = keys.verify_activation(&token).unwrap_err();
        assert!(err.to_string().contains("Activation"));
        assert!(keys.verify_session(&token).is_ok());
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let mut claims = keys.claims(Uuid::new_v4(), TokenKind::Activation);
        let past = (OffsetDateTime::now_utc() - TimeDuration::hours(2)).unix_timestamp() as usize;
        claims.iat = past;
        claims.exp = past + 60;
        let token = keys.sign(&claims).expect("sign");
        assert!(keys.verify_activation(&token).is_err());
    }

    #[test]
    fn foreign_secret_or_garbage_is_rejected() {
        let good = make_keys("secret-a", "iss", "aud");
        let other = make_keys("secret-b", "iss", "aud");
        let token = other.sign_activation(Uuid::new_v4()).expect("sign");
        assert!(good.verify_activation(&token).is_err());
        assert!(good.verify_activation("not.a.jwt").is_err());
        assert!(good.verify_activation("").is_err());
    }

    #[test]
    fn verify_rejects_wrong_issuer_or_audience() {
        let good_keys = make_keys("same-secret", "good-iss", "good-aud");
        let bad_keys = make_keys("same-secret", "bad-iss", "bad-aud");
        let token = good_keys.sign_activation(Uuid::new_v4()).expect("sign");
        assert!(bad_keys.verify(&token).is_err());
    }

    #[test]
    fn user_claim_survives_signing() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let id = Uuid::new_v4();
        let mut claims = keys.claims(id, TokenKind::Session);
        claims.user = Some(PublicUser {
            id,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "+447700900123".into(),
            email_verified: None,
            image: None,
        });
        let token = keys.sign(&claims).expect("sign");
        let decoded = keys.verify_session(&token).expect("verify");
        assert_eq!(decoded.user, claims.user);
    }
}
