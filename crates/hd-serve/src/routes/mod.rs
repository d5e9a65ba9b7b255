pub mod envelope;
pub mod error;
pub mod events;
pub mod extract;
pub mod help_sessions;

use crate::auth::CurrentActor;
use crate::middleware::correlation::{correlation_middleware, CorrelationId};
use crate::routes::error::{error_response, malformed_request};
use crate::{build_helpdesk, openapi, AppState};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use hd_core::policy::{gate, Action};
use hd_core::{Helpdesk, HelpdeskError, RequestContext};
use hd_db::DbStore;
use hd_events::types::EventSource;
use serde::Serialize;
use utoipa::ToSchema;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(help_sessions::router(state.clone()))
        .merge(events::router(state))
        .merge(openapi::router())
        .route("/health", get(health))
        .route_layer(middleware::from_fn(correlation_middleware));

    Router::new().nest("/api", api)
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Health {
    pub status: String,
}

#[utoipa::path(get, path = "/api/health", responses((status = 200, body = Health)))]
pub(crate) async fn health() -> impl IntoResponse {
    Json(Health {
        status: "ok".to_string(),
    })
}

pub(crate) fn context(actor: CurrentActor, correlation: CorrelationId) -> RequestContext {
    RequestContext::new(actor.0, EventSource::Api, Some(correlation.0))
}

pub(crate) fn with_helpdesk<T, F>(
    state: &AppState,
    ctx: &RequestContext,
    f: F,
) -> Result<T, Response>
where
    F: FnOnce(&Helpdesk<DbStore>) -> Result<T, HelpdeskError>,
{
    build_helpdesk(state)
        .and_then(|helpdesk| f(&helpdesk))
        .map_err(|err| error_response(&err, ctx.correlation_id.clone(), state.expose_errors))
}

/// Unwraps a parsed payload. A caller the role gate would refuse gets 403
/// even when the payload is also malformed.
pub(crate) fn accept<T>(
    state: &AppState,
    ctx: &RequestContext,
    action: Action,
    parsed: Result<T, String>,
) -> Result<T, Response> {
    match parsed {
        Ok(value) => Ok(value),
        Err(message) => match gate(action, &ctx.actor) {
            Err(denied) => Err(error_response(
                &HelpdeskError::from(denied),
                ctx.correlation_id.clone(),
                state.expose_errors,
            )),
            Ok(()) => Err(malformed_request(message, ctx.correlation_id.clone())),
        },
    }
}
