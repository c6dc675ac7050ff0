use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use super::{
    dto::{Credentials, PublicUser, Registration},
    error::AuthError,
    jwt::{Claims, JwtKeys, TokenKind},
    password::{hash_password, verify_password},
    session::Session,
    validation::normalize_email,
};
use crate::{
    mailer::ActivationEmail,
    state::AppState,
    users::NewUser,
};

/// Result of redeeming an activation link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivationOutcome {
    Success,
    AlreadyActivated,
    /// Also covers malformed, forged and expired tokens.
    UserNotExist,
}

/// Creates the account and emails its activation link.
#[instrument(skip(state, input), fields(email = %input.email))]
pub async fn register_user(
    state: &AppState,
    input: Registration,
) -> Result<PublicUser, AuthError> {
    let password_hash = hash_password(&input.password).map_err(AuthError::Internal)?;

    let user = state
        .store
        .create(&NewUser {
            first_name: input.first_name,
            last_name: input.last_name,
            email: normalize_email(&input.email),
            phone: input.phone,
            password_hash,
        })
        .await
        .map_err(|e| {
            warn!(error = %e, "create user failed");
            AuthError::from(e)
        })?;

    let token = state
        .jwt
        .sign_activation(user.id)
        .map_err(AuthError::Internal)?;
    let url = activation_url(state, &token);

    let message = ActivationEmail {
        first_name: &user.first_name,
        activation_url: &url,
    }
    .render(&user.email);
    state.mailer.send(&message).await.map_err(AuthError::Mail)?;

    info!(user_id = %user.id, "user registered, activation mail sent");
    Ok(user.into_public())
}

pub fn activation_url(state: &AppState, token: &str) -> String {
    format!(
        "{}{}/{}",
        state.config.base_url, state.auth.pages.activation, token
    )
}

/// Marks the account behind `token` as verified, at most once.
#[instrument(skip(state, token))]
pub async fn activate_user(
    state: &AppState,
    token: &str,
) -> Result<ActivationOutcome, AuthError> {
    let user_id = match state.jwt.verify_activation(token) {
        Ok(id) => id,
        Err(e) => {
            warn!(error = %e, "activation token rejected");
            return Ok(ActivationOutcome::UserNotExist);
        }
    };

    let Some(user) = state.store.find_by_id(user_id).await? else {
        warn!(%user_id, "activation for unknown user");
        return Ok(ActivationOutcome::UserNotExist);
    };

    if user.is_verified() {
        info!(%user_id, "account already activated");
        return Ok(ActivationOutcome::AlreadyActivated);
    }

    // The update is guarded on `email_verified IS NULL`; losing a race means
    // someone else activated first.
    if !state
        .store
        .mark_verified(user_id, OffsetDateTime::now_utc())
        .await?
    {
        return Ok(ActivationOutcome::AlreadyActivated);
    }

    info!(%user_id, "account activated");
    Ok(ActivationOutcome::Success)
}

/// Email/password check behind the credentials provider.
#[instrument(skip(state, credentials))]
pub async fn authorize_credentials(
    state: &AppState,
    credentials: &Credentials,
) -> Result<PublicUser, AuthError> {
    let email = normalize_email(&credentials.username);

    let Some(user) = state.store.find_by_email(&email).await? else {
        warn!(%email, "login unknown email");
        return Err(AuthError::InvalidCredentials);
    };

    let password = match credentials.password.as_deref() {
        Some(p) if !p.is_empty() => p,
        _ => return Err(AuthError::PasswordRequired),
    };

    if !verify_password(password, &user.password_hash).map_err(AuthError::Internal)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AuthError::InvalidCredentials);
    }

    info!(user_id = %user.id, "user logged in");
    Ok(user.into_public())
}

/// Signs a session token, letting the token-issued callback shape its claims.
pub fn issue_session(state: &AppState, user: &PublicUser) -> Result<(String, Claims), AuthError> {
    let claims = state.jwt.claims(user.id, TokenKind::Session);
    let claims = state.auth.callbacks.on_token_issued(claims, user);
    let token = state.jwt.sign(&claims).map_err(AuthError::Internal)?;
    Ok((token, claims))
}

/// Builds the outward session from verified claims via the session-read callback.
pub fn read_session(state: &AppState, claims: &Claims) -> Result<Session, AuthError> {
    let expires = OffsetDateTime::from_unix_timestamp(claims.exp as i64)
        .map_err(|e| AuthError::Internal(e.into()))?;
    let session = Session {
        user: None,
        expires,
    };
    Ok(state.auth.callbacks.on_session_read(session, claims))
}

/// Convenience for handlers that receive a raw bearer token.
pub fn verify_session_token(keys: &JwtKeys, token: &str) -> Result<Claims, AuthError> {
    keys.verify_session(token).map_err(|e| {
        warn!(error = %e, "invalid or expired session token");
        AuthError::InvalidSession
    })
}
