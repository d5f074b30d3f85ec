use serde::Deserialize;
use serde::Serialize;

/// Claims carried by an issued token.
///
/// No `exp` claim: a token stays valid until its signing
/// key is removed from the keyring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject (principal name)
    pub sub: String,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Principal identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

impl TokenClaims {
    /// Create claims for a principal, valid from `not_before`.
    pub fn new(subject: impl ToString, not_before: i64) -> Self {
        Self {
            sub: subject.to_string(),
            nbf: not_before,
            uid: None,
        }
    }

    /// Set principal identifier. Empty identifiers are not recorded.
    pub fn with_principal_id(mut self, uid: &str) -> Self {
        self.uid = (!uid.is_empty()).then(|| uid.to_string());
        self
    }

    /// Check if the token is not yet valid.
    pub fn is_premature(&self, current_timestamp: i64) -> bool {
        self.nbf > current_timestamp
    }
}
