use std::collections::HashMap;

use serde::Serialize;

/// An authenticated principal.
///
/// Produced once per successful authentication and shared read-only for the
/// rest of the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identity {
    principal_name: String,
    principal_id: String,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    extensions: HashMap<String, serde_json::Value>,
}

impl Identity {
    pub fn new(principal_name: impl Into<String>, principal_id: impl Into<String>) -> Self {
        Self {
            principal_name: principal_name.into(),
            principal_id: principal_id.into(),
            extensions: HashMap::new(),
        }
    }

    /// Attach an opaque extension value.
    pub fn with_extension(mut self, key: impl ToString, value: serde_json::Value) -> Self {
        self.extensions.insert(key.to_string(), value);
        self
    }

    pub fn principal_name(&self) -> &str {
        &self.principal_name
    }

    pub fn principal_id(&self) -> &str {
        &self.principal_id
    }

    pub fn extension(&self, key: &str) -> Option<&serde_json::Value> {
        self.extensions.get(key)
    }

    pub fn extensions(&self) -> &HashMap<String, serde_json::Value> {
        &self.extensions
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_extensions() {
        let identity = Identity::new("alice", "1").with_extension("strategy", json!("token"));

        assert_eq!(identity.extension("strategy"), Some(&json!("token")));
        assert!(identity.extension("missing").is_none());
        assert_eq!(identity.extensions().len(), 1);
    }

    #[test]
    fn test_serialized_shape() {
        let plain = serde_json::to_value(Identity::new("alice", "1")).unwrap();
        assert_eq!(plain, json!({ "principal_name": "alice", "principal_id": "1" }));

        let extended =
            serde_json::to_value(Identity::new("alice", "1").with_extension("k", json!(1))).unwrap();
        assert_eq!(extended["extensions"], json!({ "k": 1 }));
    }
}
