//! Parish Backend
//!
//! REST backend for program enrollment and parish administration, with SQLite
//! persistence and Turnstile bot protection on public submissions.

mod api;
mod auth;
mod config;
mod db;
mod enrollment;
mod errors;
mod models;
mod turnstile;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{Config, LogFormat};
use db::Repository;
use turnstile::{BotVerifier, TurnstileVerifier};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub verifier: Arc<dyn BotVerifier>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    match config.log_format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }

    tracing::info!("Starting Parish Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.admin_psk.is_none() {
        tracing::warn!("No admin PSK configured (PARISH_ADMIN_PSK). Admin API is open!");
    }

    let verifier = TurnstileVerifier::new(
        config.turnstile_secret.clone(),
        config.turnstile_verify_url.clone(),
    );
    if !verifier.is_enabled() {
        tracing::warn!(
            "No Turnstile secret configured (TURNSTILE_SECRET_KEY). Bot protection is disabled!"
        );
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    let state = AppState {
        repo,
        verifier: Arc::new(verifier),
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let psk = state.config.admin_psk.clone();

    // Admin routes
    let admin_routes = Router::new()
        .route(
            "/programs",
            get(api::list_programs).post(api::create_program),
        )
        .route(
            "/programs/{id}",
            get(api::get_program)
                .put(api::update_program)
                .delete(api::delete_program),
        )
        .route(
            "/programs/{id}/enrollments",
            get(api::list_program_enrollments),
        )
        .route("/enrollments/{id}", delete(api::delete_enrollment))
        .route("/children", get(api::list_children))
        .route("/children/{id}", get(api::get_child))
        .route("/members", get(api::list_members))
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Public routes
    let api_routes = Router::new()
        .route("/programs", get(api::list_active_programs))
        .route("/programs/{id}", get(api::get_active_program))
        .route("/enrollments", post(api::submit_enrollment))
        .nest("/admin", admin_routes);

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
