use auth::AuthError;
use auth::TokenError;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::user::errors::UserError;

pub mod get_identity;
pub mod issue_token;
pub mod register;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<T>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(String),
    Unauthorized(String),
}

const INTERNAL_SERVER_ERROR: &str = "Internal server error";

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
        };

        (status, Json(ApiErrorData { message })).into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidUsername(_)
            | UserError::MissingPassword
            | UserError::UsernameAlreadyExists(_) => ApiError::BadRequest(err.to_string()),
            UserError::Hashing(_) | UserError::Repository(_) | UserError::Unknown(_) => {
                tracing::error!(error = %err, "User operation failed");
                ApiError::InternalServerError(INTERNAL_SERVER_ERROR.to_string())
            }
        }
    }
}

/// Every authentication failure the client can cause is a 401 with a fixed
/// message. Server-side failures never reveal their cause.
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials
            | AuthError::InvalidCredentials
            | AuthError::NotResourceOwner => ApiError::Unauthorized(err.to_string()),
            AuthError::Token(
                ref token_err @ (TokenError::Malformed | TokenError::MissingKeyId | TokenError::Invalid),
            ) => ApiError::Unauthorized(token_err.to_string()),
            // Already logged where the hash was read
            AuthError::StoredHash(_) => {
                ApiError::Unauthorized(AuthError::InvalidCredentials.to_string())
            }
            AuthError::Token(TokenError::SigningFailed(_))
            | AuthError::Store(_)
            | AuthError::Internal(_) => {
                tracing::error!(error = %err, "Authentication failed on the server side");
                ApiError::InternalServerError(INTERNAL_SERVER_ERROR.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}
