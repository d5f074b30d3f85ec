use std::sync::Arc;

use api_service::config::Config;
use api_service::domain::user::service::UserService;
use api_service::inbound::http::router::create_router;
use api_service::outbound::repositories::InMemoryUserRepository;
use auth::AuthCache;
use auth::AuthPipeline;
use auth::AuthStrategy;
use auth::Clock;
use auth::EndpointPolicy;
use auth::PasswordAuthStrategy;
use auth::PasswordHasher;
use auth::SystemClock;
use auth::TokenAuthStrategy;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_service=debug,auth=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "api-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        memory_cost_kib = config.hashing.memory_cost_kib,
        iterations = config.hashing.iterations,
        parallelism = config.hashing.parallelism,
        cache_ttl_seconds = config.cache.ttl_seconds,
        cache_capacity = config.cache.capacity,
        active_key_id = %config.keyring.active_key_id,
        "Configuration loaded"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let user_repository = Arc::new(InMemoryUserRepository::new());
    let password_hasher = PasswordHasher::new(config.hashing);

    // Unknown principals are verified against this so they cost a full hash
    let decoy_hash = password_hasher.hash("decoy-password-for-unknown-principals")?;

    let cache = Arc::new(AuthCache::new(
        config.cache.ttl(),
        config.cache.capacity,
        Arc::clone(&clock),
    ));
    let password_strategy = PasswordAuthStrategy::new(
        Arc::clone(&user_repository),
        Arc::new(password_hasher.clone()),
        Arc::clone(&cache),
    )?
    .with_decoy_hash(decoy_hash);

    let token_strategy = Arc::new(TokenAuthStrategy::new(config.keyring.build()?, clock));

    let pipeline = Arc::new(
        AuthPipeline::new()
            .with_strategy(
                EndpointPolicy::Password,
                AuthStrategy::Password(Arc::new(password_strategy)),
            )
            .with_strategy(
                EndpointPolicy::Token,
                AuthStrategy::Token(Arc::clone(&token_strategy)),
            ),
    );

    let user_service = Arc::new(UserService::new(user_repository, password_hasher));

    let sweep_interval = config.cache.ttl().max(std::time::Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        loop {
            interval.tick().await;
            let purged = cache.purge_expired();
            if purged > 0 {
                tracing::debug!(purged, "Expired cache entries purged");
            }
        }
    });

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service, pipeline, token_strategy);

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");

    Ok(())
}
