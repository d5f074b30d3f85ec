use auth::Identity;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiSuccess;

pub async fn get_identity(
    Extension(identity): Extension<Identity>,
) -> ApiSuccess<IdentityResponseData> {
    ApiSuccess::new(StatusCode::OK, (&identity).into())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityResponseData {
    pub id: String,
    pub username: String,
}

impl From<&Identity> for IdentityResponseData {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.principal_id().to_string(),
            username: identity.principal_name().to_string(),
        }
    }
}
