//! HTTP API server for fund and expense records
//!
//! Routes are organized into modules:
//! - routes::funds: POST /add-fund, GET /funds
//! - routes::expenses: POST /add-expense, GET /expenses
//!
//! Every route sits behind a CORS layer that admits a single origin.

pub mod error;
pub mod routes;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::{
    routing::{get, post},
    Router,
};
use fundtrack_config::{Config, CorsConfig};
use fundtrack_core::Treasury;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub treasury: Treasury,
    pub config: Config,
}

/// The CORS policy: one origin, credentials allowed.
///
/// The allow-origin header is only echoed back when the request's `Origin`
/// matches; other origins get none.
pub fn cors_layer(config: &CorsConfig) -> Result<CorsLayer, ApiError> {
    let origin = HeaderValue::from_str(&config.allowed_origin).map_err(|_| {
        ApiError::InvalidOrigin {
            origin: config.allowed_origin.clone(),
        }
    })?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true))
}

/// Create the application router
pub fn create_router(state: AppState) -> Result<Router, ApiError> {
    use routes::expenses::{api_add_expense, api_expenses};
    use routes::funds::{api_add_fund, api_funds};

    let cors = cors_layer(&state.config.cors)?;

    Ok(Router::new()
        .route("/api/health", get(health_check))
        .route("/add-fund", post(api_add_fund))
        .route("/add-expense", post(api_add_expense))
        .route("/funds", get(api_funds))
        .route("/expenses", get(api_expenses))
        .fallback(not_found)
        .with_state(state)
        .layer(cors))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

/// Start the HTTP server
///
/// Binds to `server.host:server.port` and serves until the process is
/// stopped.
pub async fn start_server(config: Config, treasury: Treasury) -> Result<(), ApiError> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let port = config.server.port;
    let allowed_origin = config.cors.allowed_origin.clone();
    let router = create_router(AppState { treasury, config })?;

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Server running on port {}", port);
    log::info!("CORS allowed origin: {}", allowed_origin);

    axum::serve(listener, router).await?;
    log::info!("Server stopped");
    Ok(())
}

// ==================== Tests ====================
