use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{
            ActivationResponse, Credentials, LoginResponse, ProviderInfo, PublicUser,
            RegisterForm,
        },
        error::AuthError,
        extractors::SessionClaims,
        services::{
            activate_user, authorize_credentials, issue_session, read_session, register_user,
        },
        session::{Pages, Provider, Session},
        validation::validate_registration,
    },
    state::AppState,
};

pub fn auth_routes(pages: &Pages) -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route(&format!("{}/:token", pages.activation), get(activate))
        .route("/auth/callback/credentials", post(credentials_callback))
        .route("/auth/session", get(session))
        .route("/auth/providers", get(providers))
}

#[instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegisterForm>,
) -> Result<(StatusCode, Json<PublicUser>), AuthError> {
    let registration = validate_registration(&form).map_err(AuthError::Validation)?;
    let user = register_user(&state, registration).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, token))]
pub async fn activate(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<ActivationResponse>, AuthError> {
    let outcome = activate_user(&state, &token).await?;
    Ok(Json(ActivationResponse {
        outcome,
        sign_in_url: format!("{}{}", state.config.base_url, state.auth.pages.sign_in),
    }))
}

#[instrument(skip(state, credentials))]
pub async fn credentials_callback(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<LoginResponse>, AuthError> {
    if !state.auth.enabled(Provider::Credentials) {
        return Err(AuthError::ProviderDisabled);
    }
    let user = authorize_credentials(&state, &credentials).await?;
    let (token, claims) = issue_session(&state, &user)?;
    let session = read_session(&state, &claims)?;
    info!(user_id = %user.id, "session issued");
    Ok(Json(LoginResponse { token, session }))
}

#[instrument(skip_all)]
pub async fn session(
    State(state): State<AppState>,
    SessionClaims(claims): SessionClaims,
) -> Result<Json<Session>, AuthError> {
    Ok(Json(read_session(&state, &claims)?))
}

pub async fn providers(State(state): State<AppState>) -> Json<Vec<ProviderInfo>> {
    let base = &state.config.base_url;
    let sign_in_url = format!("{base}{}", state.auth.pages.sign_in);
    let sign_up_url = format!("{base}{}", state.auth.pages.sign_up);
    let mut list: Vec<ProviderInfo> = state
        .auth
        .providers
        .iter()
        .map(|p| ProviderInfo {
            id: p.id(),
            name: p.name(),
            sign_in_url: sign_in_url.clone(),
            sign_up_url: sign_up_url.clone(),
        })
        .collect();
    list.sort_by_key(|p| p.id);
    Json(list)
}
