use auth::AuthError;
use auth::Identity;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;

/// Exchange verified basic credentials for a bearer token.
pub async fn issue_token(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<ApiSuccess<TokenResponseData>, ApiError> {
    let token = state
        .tokens
        .issue(&identity)
        .map_err(|e| ApiError::from(AuthError::from(e)))?;

    tracing::info!(principal = %identity.principal_name(), "Token issued");

    Ok(ApiSuccess::new(StatusCode::OK, TokenResponseData { token }))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenResponseData {
    pub token: String,
}
