use std::sync::Arc;
use std::time::Duration;

use api_service::domain::user::service::UserService;
use api_service::inbound::http::router::create_router;
use api_service::outbound::repositories::InMemoryUserRepository;
use auth::AuthCache;
use auth::AuthPipeline;
use auth::AuthStrategy;
use auth::EndpointPolicy;
use auth::HashingParameters;
use auth::Identity;
use auth::PasswordAuthStrategy;
use auth::PasswordHasher;
use auth::SecretKeyring;
use auth::SigningSecret;
use auth::SystemClock;
use auth::TokenAuthStrategy;
use jsonwebtoken::Algorithm;
use serde_json::json;

pub const SIGNING_SECRET: &[u8] = b"test-secret-key-for-token-signing-at-least-32-bytes";
pub const KEY_ID: &str = "secret-id";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub tokens: Arc<TokenAuthStrategy>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        // Cheap parameters keep the suite fast
        let password_hasher = PasswordHasher::new(HashingParameters {
            memory_cost_kib: 1024,
            iterations: 1,
            parallelism: 1,
            ..Default::default()
        });

        let user_repository = Arc::new(InMemoryUserRepository::new());
        let cache = Arc::new(AuthCache::new(
            Duration::from_secs(60),
            0,
            Arc::new(SystemClock),
        ));
        let password_strategy = PasswordAuthStrategy::new(
            Arc::clone(&user_repository),
            Arc::new(password_hasher.clone()),
            cache,
        )
        .expect("Failed to create password strategy");

        let keyring = SecretKeyring::new(
            KEY_ID,
            SigningSecret::hmac(SIGNING_SECRET, Algorithm::HS256).unwrap(),
        );
        let tokens = Arc::new(TokenAuthStrategy::new(keyring, Arc::new(SystemClock)));

        let pipeline = Arc::new(
            AuthPipeline::new()
                .with_strategy(
                    EndpointPolicy::Password,
                    AuthStrategy::Password(Arc::new(password_strategy)),
                )
                .with_strategy(EndpointPolicy::Token, AuthStrategy::Token(Arc::clone(&tokens))),
        );

        let user_service = Arc::new(UserService::new(user_repository, password_hasher));

        let router = create_router(user_service, pipeline, Arc::clone(&tokens));

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::builder()
                .build()
                .expect("Failed to create reqwest client"),
            tokens,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Register a user and assert success
    pub async fn register(&self, username: &str, password: &str) {
        let response = self
            .post("/api/register")
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::OK);
    }

    /// Request a token with basic credentials and return it
    pub async fn token(&self, username: &str, password: &str) -> String {
        let response = self
            .get("/api/token")
            .basic_auth(username, Some(password))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["token"]
            .as_str()
            .expect("Missing token in response")
            .to_string()
    }

    /// Issue a token directly, bypassing the password endpoint
    pub fn token_for(&self, username: &str) -> String {
        self.tokens
            .issue(&Identity::new(username, ""))
            .expect("Failed to issue token")
    }
}
