use auth::Credentials;
use auth::EndpointPolicy;
use axum::extract::Path;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

use super::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Path parameters of owner-scoped routes
#[derive(Debug, Deserialize)]
pub struct OwnerPath {
    pub user: String,
}

/// Middleware that authenticates basic credentials and adds the identity to
/// request extensions
pub async fn require_password(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credentials = extract_credentials(req.headers());

    let identity = state
        .pipeline
        .authenticate(EndpointPolicy::Password, &credentials)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Password authentication rejected");
            ApiError::from(e)
        })?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Middleware that validates a bearer token, requires its principal to own the
/// `:user` path segment and adds the identity to request extensions
pub async fn require_token_owner(
    State(state): State<AppState>,
    Path(OwnerPath { user }): Path<OwnerPath>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credentials = extract_credentials(req.headers());

    let identity = state
        .pipeline
        .authenticate_owner(EndpointPolicy::Token, &credentials, &user)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, owner = %user, "Token authentication rejected");
            ApiError::from(e)
        })?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Read the Authorization header into credentials.
///
/// Anything absent or unparseable becomes `Credentials::None`.
pub fn extract_credentials(headers: &HeaderMap) -> Credentials {
    let Some(value) = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    else {
        return Credentials::None;
    };

    let Some((scheme, payload)) = value.trim().split_once(' ') else {
        return Credentials::None;
    };
    let payload = payload.trim();

    if scheme.eq_ignore_ascii_case("Basic") {
        decode_basic(payload).unwrap_or(Credentials::None)
    } else if scheme.eq_ignore_ascii_case("Bearer") {
        Credentials::Bearer(payload.to_string())
    } else {
        Credentials::None
    }
}

fn decode_basic(payload: &str) -> Option<Credentials> {
    let decoded = STANDARD.decode(payload).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (principal, password) = decoded.split_once(':')?;

    Some(Credentials::Basic {
        principal: principal.to_string(),
        password: password.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(authorization: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(authorization).unwrap());
        headers
    }

    #[test]
    fn test_extract_basic() {
        let value = format!("Basic {}", STANDARD.encode("test:hunter2"));

        assert_eq!(
            extract_credentials(&headers(&value)),
            Credentials::Basic {
                principal: "test".to_string(),
                password: "hunter2".to_string(),
            }
        );
    }

    #[test]
    fn test_extract_basic_password_with_colon() {
        let value = format!("basic {}", STANDARD.encode("test:a:b"));

        assert_eq!(
            extract_credentials(&headers(&value)),
            Credentials::Basic {
                principal: "test".to_string(),
                password: "a:b".to_string(),
            }
        );
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(
            extract_credentials(&headers("Bearer abc.def.ghi")),
            Credentials::Bearer("abc.def.ghi".to_string())
        );
    }

    #[test]
    fn test_extract_nothing_usable() {
        let no_colon = format!("Basic {}", STANDARD.encode("test"));

        assert_eq!(extract_credentials(&HeaderMap::new()), Credentials::None);
        assert_eq!(extract_credentials(&headers("Basic !!!")), Credentials::None);
        assert_eq!(extract_credentials(&headers(&no_colon)), Credentials::None);
        assert_eq!(extract_credentials(&headers("Digest abc")), Credentials::None);
        assert_eq!(extract_credentials(&headers("Bearer")), Credentials::None);
    }
}
