use std::sync::Arc;
use std::time::Duration;

use auth::AuthPipeline;
use auth::PasswordHasher;
use auth::TokenAuthStrategy;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::get_identity::get_identity;
use super::handlers::issue_token::issue_token;
use super::handlers::register::register;
use super::middleware::require_password;
use super::middleware::require_token_owner;
use crate::domain::user::service::UserService;
use crate::outbound::repositories::user::InMemoryUserRepository;

pub type Pipeline = AuthPipeline<InMemoryUserRepository, PasswordHasher>;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService<InMemoryUserRepository>>,
    pub pipeline: Arc<Pipeline>,
    pub tokens: Arc<TokenAuthStrategy>,
}

pub fn create_router(
    user_service: Arc<UserService<InMemoryUserRepository>>,
    pipeline: Arc<Pipeline>,
    tokens: Arc<TokenAuthStrategy>,
) -> Router {
    let state = AppState {
        user_service,
        pipeline,
        tokens,
    };

    let public_routes = Router::new().route("/api/register", post(register));

    let password_routes = Router::new()
        .route("/api/token", get(issue_token))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_password,
        ));

    let owner_routes = Router::new()
        .route("/api/:user/identity", get(get_identity))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_token_owner,
        ));

    // Headers are left out of the span: they carry credentials
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(password_routes)
        .merge(owner_routes)
        .layer(
            ServiceBuilder::new()
                .layer(trace_layer)
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
