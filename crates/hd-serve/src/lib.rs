pub mod auth;
pub mod config;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod sse;

use crate::auth::JwtKeys;
use crate::config::Config;
use axum::http::{header, HeaderName, Method};
use axum::Router;
use hd_core::{Helpdesk, HelpdeskError};
use hd_db::schema;
pub use hd_db::DbStore;
use hd_events::bus::EventBus;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

const EVENT_BUS_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct AppState {
    pub db_path: String,
    pub event_bus: EventBus,
    pub keys: JwtKeys,
    /// Show internal error text in responses.
    pub expose_errors: bool,
}

impl AppState {
    pub fn new(db_path: impl Into<String>, jwt_secret: &[u8], expose_errors: bool) -> Self {
        Self {
            db_path: db_path.into(),
            event_bus: EventBus::new(EVENT_BUS_CAPACITY),
            keys: JwtKeys::new(jwt_secret),
            expose_errors,
        }
    }

    pub fn from_config(config: &Config, jwt_secret: &str) -> Self {
        Self::new(config.db_path.clone(), jwt_secret.as_bytes(), config.expose_errors)
    }
}

pub fn build_helpdesk(state: &AppState) -> Result<Helpdesk<DbStore>, HelpdeskError> {
    let conn = schema::open_and_migrate(&state.db_path).map_err(HelpdeskError::internal)?;
    let store = DbStore::new(conn);
    Ok(Helpdesk::new(store, state.event_bus.clone()))
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(middleware::correlation::HEADER_NAME),
        ])
        .expose_headers([HeaderName::from_static(
            middleware::correlation::HEADER_NAME,
        )]);
    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, db = %state.db_path, "helpdesk listening");
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
