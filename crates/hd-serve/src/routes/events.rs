use crate::auth::CurrentActor;
use crate::middleware::correlation::CorrelationId;
use crate::routes::error::ErrorEnvelope;
use crate::routes::envelope::Envelope;
use crate::routes::extract::QueryPayload;
use crate::routes::{accept, context, with_helpdesk};
use crate::AppState;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Router};
use hd_core::policy::Action;
use hd_events::types::EventRecord;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventsQuery {
    /// Only events with a higher sequence number.
    pub after: Option<i64>,
    pub limit: Option<u32>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/events", get(list_events))
        .route("/events/subscribe", get(subscribe))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/events",
    params(EventsQuery),
    responses(
        (status = 200, body = Envelope<Vec<EventRecord>>),
        (status = 403, body = ErrorEnvelope)
    ),
    security(("bearer" = []))
)]
pub(crate) async fn list_events(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    actor: CurrentActor,
    QueryPayload(query): QueryPayload<EventsQuery>,
) -> Response {
    let ctx = context(actor, correlation);
    let query = match accept(&state, &ctx, Action::List, query) {
        Ok(query) => query,
        Err(response) => return response,
    };
    match with_helpdesk(&state, &ctx, |helpdesk| {
        helpdesk.events().list(&ctx, query.after, query.limit)
    }) {
        Ok(events) => Envelope::ok(events).into_response(),
        Err(response) => response,
    }
}

#[utoipa::path(
    get,
    path = "/api/events/subscribe",
    params(EventsQuery),
    responses(
        (status = 200, description = "Server-sent stream of event records"),
        (status = 403, body = ErrorEnvelope)
    ),
    security(("bearer" = []))
)]
pub(crate) async fn subscribe(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    actor: CurrentActor,
    QueryPayload(query): QueryPayload<EventsQuery>,
) -> Response {
    let ctx = context(actor, correlation);
    match accept(&state, &ctx, Action::List, query) {
        Ok(query) => crate::sse::subscribe(state, ctx, query.after).await,
        Err(response) => response,
    }
}
