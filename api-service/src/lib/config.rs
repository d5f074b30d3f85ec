use std::env;
use std::time::Duration;

use auth::HashingParameters;
use auth::KeyringError;
use auth::SecretKeyring;
use auth::SigningSecret;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use jsonwebtoken::Algorithm;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub hashing: HashingParameters,
    #[serde(default)]
    pub cache: CacheConfig,
    pub keyring: KeyringConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
    /// Zero means unbounded
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 60,
            capacity: 0,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

#[derive(Deserialize, Clone)]
pub struct KeyringConfig {
    pub active_key_id: String,
    pub keys: Vec<SigningKeyConfig>,
}

#[derive(Deserialize, Clone)]
pub struct SigningKeyConfig {
    pub id: String,
    pub secret: String,
    #[serde(default = "default_algorithm")]
    pub algorithm: Algorithm,
}

fn default_algorithm() -> Algorithm {
    Algorithm::HS256
}

impl std::fmt::Debug for KeyringConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let key_ids: Vec<&str> = self.keys.iter().map(|key| key.id.as_str()).collect();
        f.debug_struct("KeyringConfig")
            .field("active_key_id", &self.active_key_id)
            .field("keys", &key_ids)
            .finish()
    }
}

impl KeyringConfig {
    /// Build the signing keyring described by this configuration.
    ///
    /// # Errors
    /// * `UnsupportedAlgorithm` - A key is configured with a non-HMAC algorithm
    /// * `EmptySecret` - A key has an empty secret
    /// * `MissingActiveKey` - The active key id has no configured key
    pub fn build(&self) -> Result<SecretKeyring, KeyringError> {
        let keys = self
            .keys
            .iter()
            .map(|key| {
                SigningSecret::hmac(key.secret.as_bytes(), key.algorithm)
                    .map(|secret| (key.id.clone(), secret))
            })
            .collect::<Result<Vec<_>, _>>()?;

        SecretKeyring::from_keys(self.active_key_id.clone(), keys)
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (SERVER__HTTP_PORT, CACHE__TTL_SECONDS, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: KEYRING__ACTIVE_KEY_ID=next overrides keyring.active_key_id
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(toml: &str) -> Config {
        ConfigBuilder::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    const MINIMAL: &str = r#"
        [server]
        http_port = 8080

        [keyring]
        active_key_id = "secret-id"

        [[keyring.keys]]
        id = "secret-id"
        secret = "test-secret"
    "#;

    #[test]
    fn test_defaults() {
        let config = parse(MINIMAL);

        assert_eq!(config.hashing, HashingParameters::default());
        assert_eq!(config.cache.ttl(), Duration::from_secs(60));
        assert_eq!(config.cache.capacity, 0);
        assert_eq!(config.keyring.keys[0].algorithm, Algorithm::HS256);
    }

    #[test]
    fn test_build_keyring() {
        let config = parse(
            r#"
            [server]
            http_port = 8080

            [keyring]
            active_key_id = "next"

            [[keyring.keys]]
            id = "previous"
            secret = "previous-secret"

            [[keyring.keys]]
            id = "next"
            secret = "next-secret"
            algorithm = "HS512"
            "#,
        );

        let keyring = config.keyring.build().unwrap();
        assert_eq!(keyring.active_key_id(), "next");
        assert_eq!(keyring.len(), 2);
        assert_eq!(keyring.get("next").unwrap().algorithm(), Algorithm::HS512);
    }

    #[test]
    fn test_build_keyring_missing_active_key() {
        let mut config = parse(MINIMAL);
        config.keyring.active_key_id = "other".to_string();

        assert!(matches!(
            config.keyring.build(),
            Err(KeyringError::MissingActiveKey(_))
        ));
    }

    #[test]
    fn test_build_keyring_rejects_non_hmac() {
        let mut config = parse(MINIMAL);
        config.keyring.keys[0].algorithm = Algorithm::RS256;

        assert!(matches!(
            config.keyring.build(),
            Err(KeyringError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = parse(MINIMAL);
        let debug = format!("{:?}", config);

        assert!(debug.contains("secret-id"));
        assert!(!debug.contains("test-secret"));
    }
}
