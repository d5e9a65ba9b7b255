use crate::auth::CurrentActor;
use crate::middleware::correlation::CorrelationId;
use crate::routes::envelope::{DeletedSession, Envelope};
use crate::routes::error::ErrorEnvelope;
use crate::routes::extract::{JsonPayload, QueryPayload};
use crate::routes::{accept, context, with_helpdesk};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::{Extension, Router};
use hd_core::policy::Action;
use hd_core::types::io::{
    AppendNoteInput, AssignStatusInput, CreateHelpSessionInput, Dashboard, ListSessionsQuery,
    PageQuery, SearchResults, SearchSessionsQuery, TechnicianSessionsQuery,
    UpdateHelpSessionInput, UpdateTypeInput,
};
use hd_core::types::{CompletedByPeriod, HelpSession};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/help-sessions", get(list_pending).post(create_session))
        .route("/help-sessions/all", get(list_sessions))
        .route("/help-sessions/dashboard", get(dashboard))
        .route("/help-sessions/completed-by-period", get(completed_by_period))
        .route("/help-sessions/search", get(search))
        .route("/help-sessions/technician/sessions", get(technician_sessions))
        .route("/help-sessions/technician/{id}/status", patch(assign_status))
        .route("/help-sessions/technician/{id}/type", patch(update_type))
        .route("/help-sessions/technician/{id}/note", patch(append_note))
        .route(
            "/help-sessions/{id}",
            get(get_session).patch(update_session).delete(delete_session),
        )
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/help-sessions",
    request_body = CreateHelpSessionInput,
    responses(
        (status = 201, body = Envelope<HelpSession>),
        (status = 400, body = ErrorEnvelope),
        (status = 401, body = ErrorEnvelope),
        (status = 403, body = ErrorEnvelope),
        (status = 404, body = ErrorEnvelope),
        (status = 409, body = ErrorEnvelope)
    ),
    security(("bearer" = []))
)]
pub(crate) async fn create_session(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    actor: CurrentActor,
    JsonPayload(input): JsonPayload<CreateHelpSessionInput>,
) -> Response {
    let ctx = context(actor, correlation);
    let input = match accept(&state, &ctx, Action::Create, input) {
        Ok(input) => input,
        Err(response) => return response,
    };
    match with_helpdesk(&state, &ctx, |helpdesk| helpdesk.sessions().create(&ctx, input)) {
        Ok(session) => (
            StatusCode::CREATED,
            Envelope::ok(session).with_message("Help session created successfully"),
        )
            .into_response(),
        Err(response) => response,
    }
}

#[utoipa::path(
    get,
    path = "/api/help-sessions",
    params(PageQuery),
    responses(
        (status = 200, body = Envelope<Vec<HelpSession>>),
        (status = 401, body = ErrorEnvelope),
        (status = 403, body = ErrorEnvelope)
    ),
    security(("bearer" = []))
)]
pub(crate) async fn list_pending(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    actor: CurrentActor,
    QueryPayload(query): QueryPayload<PageQuery>,
) -> Response {
    let ctx = context(actor, correlation);
    let query = match accept(&state, &ctx, Action::List, query) {
        Ok(query) => query,
        Err(response) => return response,
    };
    match with_helpdesk(&state, &ctx, |helpdesk| {
        helpdesk.sessions().list_pending(&ctx, query)
    }) {
        Ok(page) => Envelope::paged(page).into_response(),
        Err(response) => response,
    }
}

#[utoipa::path(
    get,
    path = "/api/help-sessions/all",
    params(ListSessionsQuery),
    responses(
        (status = 200, body = Envelope<Vec<HelpSession>>),
        (status = 400, body = ErrorEnvelope),
        (status = 403, body = ErrorEnvelope)
    ),
    security(("bearer" = []))
)]
pub(crate) async fn list_sessions(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    actor: CurrentActor,
    QueryPayload(query): QueryPayload<ListSessionsQuery>,
) -> Response {
    let ctx = context(actor, correlation);
    let query = match accept(&state, &ctx, Action::List, query) {
        Ok(query) => query,
        Err(response) => return response,
    };
    match with_helpdesk(&state, &ctx, |helpdesk| helpdesk.sessions().list(&ctx, query)) {
        Ok(page) => Envelope::paged(page).into_response(),
        Err(response) => response,
    }
}

#[utoipa::path(
    get,
    path = "/api/help-sessions/{id}",
    params(("id" = String, Path, description = "Help session ID")),
    responses(
        (status = 200, body = Envelope<HelpSession>),
        (status = 403, body = ErrorEnvelope),
        (status = 404, body = ErrorEnvelope)
    ),
    security(("bearer" = []))
)]
pub(crate) async fn get_session(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    actor: CurrentActor,
    Path(id): Path<String>,
) -> Response {
    let ctx = context(actor, correlation);
    match with_helpdesk(&state, &ctx, |helpdesk| helpdesk.sessions().get(&ctx, &id)) {
        Ok(session) => Envelope::ok(session).into_response(),
        Err(response) => response,
    }
}

#[utoipa::path(
    patch,
    path = "/api/help-sessions/{id}",
    params(("id" = String, Path, description = "Help session ID")),
    request_body = UpdateHelpSessionInput,
    responses(
        (status = 200, body = Envelope<HelpSession>),
        (status = 400, body = ErrorEnvelope),
        (status = 403, body = ErrorEnvelope),
        (status = 404, body = ErrorEnvelope)
    ),
    security(("bearer" = []))
)]
pub(crate) async fn update_session(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    actor: CurrentActor,
    Path(id): Path<String>,
    JsonPayload(input): JsonPayload<UpdateHelpSessionInput>,
) -> Response {
    let ctx = context(actor, correlation);
    let input = match accept(&state, &ctx, Action::UpdateStatus, input) {
        Ok(input) => input,
        Err(response) => return response,
    };
    match with_helpdesk(&state, &ctx, |helpdesk| {
        helpdesk.sessions().update_status(&ctx, &id, input)
    }) {
        Ok(session) => Envelope::ok(session)
            .with_message("Help session updated successfully")
            .into_response(),
        Err(response) => response,
    }
}

#[utoipa::path(
    delete,
    path = "/api/help-sessions/{id}",
    params(("id" = String, Path, description = "Help session ID")),
    responses(
        (status = 200, body = Envelope<DeletedSession>),
        (status = 403, body = ErrorEnvelope),
        (status = 404, body = ErrorEnvelope)
    ),
    security(("bearer" = []))
)]
pub(crate) async fn delete_session(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    actor: CurrentActor,
    Path(id): Path<String>,
) -> Response {
    let ctx = context(actor, correlation);
    match with_helpdesk(&state, &ctx, |helpdesk| helpdesk.sessions().delete(&ctx, &id)) {
        Ok(()) => Envelope::ok(DeletedSession { id })
            .with_message("Help session deleted successfully")
            .into_response(),
        Err(response) => response,
    }
}

#[utoipa::path(
    get,
    path = "/api/help-sessions/technician/sessions",
    params(TechnicianSessionsQuery),
    responses(
        (status = 200, body = Envelope<Vec<HelpSession>>),
        (status = 400, body = ErrorEnvelope),
        (status = 403, body = ErrorEnvelope)
    ),
    security(("bearer" = []))
)]
pub(crate) async fn technician_sessions(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    actor: CurrentActor,
    QueryPayload(query): QueryPayload<TechnicianSessionsQuery>,
) -> Response {
    let ctx = context(actor, correlation);
    let query = match accept(&state, &ctx, Action::List, query) {
        Ok(query) => query,
        Err(response) => return response,
    };
    match with_helpdesk(&state, &ctx, |helpdesk| {
        helpdesk.sessions().list_by_technician(&ctx, query)
    }) {
        Ok(page) => Envelope::paged(page).into_response(),
        Err(response) => response,
    }
}

#[utoipa::path(
    patch,
    path = "/api/help-sessions/technician/{id}/status",
    params(("id" = String, Path, description = "Help session ID")),
    request_body = AssignStatusInput,
    responses(
        (status = 200, body = Envelope<HelpSession>),
        (status = 400, body = ErrorEnvelope),
        (status = 403, body = ErrorEnvelope),
        (status = 404, body = ErrorEnvelope)
    ),
    security(("bearer" = []))
)]
pub(crate) async fn assign_status(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    actor: CurrentActor,
    Path(id): Path<String>,
    JsonPayload(input): JsonPayload<AssignStatusInput>,
) -> Response {
    let ctx = context(actor, correlation);
    let input = match accept(&state, &ctx, Action::AssignAndSetStatus, input) {
        Ok(input) => input,
        Err(response) => return response,
    };
    match with_helpdesk(&state, &ctx, |helpdesk| {
        helpdesk.sessions().assign_and_set_status(&ctx, &id, input)
    }) {
        Ok(session) => {
            let message = format!("Help session {} successfully", session.status);
            Envelope::ok(session).with_message(message).into_response()
        }
        Err(response) => response,
    }
}

#[utoipa::path(
    patch,
    path = "/api/help-sessions/technician/{id}/type",
    params(("id" = String, Path, description = "Help session ID")),
    request_body = UpdateTypeInput,
    responses(
        (status = 200, body = Envelope<HelpSession>),
        (status = 400, body = ErrorEnvelope),
        (status = 403, body = ErrorEnvelope),
        (status = 404, body = ErrorEnvelope)
    ),
    security(("bearer" = []))
)]
pub(crate) async fn update_type(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    actor: CurrentActor,
    Path(id): Path<String>,
    JsonPayload(input): JsonPayload<UpdateTypeInput>,
) -> Response {
    let ctx = context(actor, correlation);
    let input = match accept(&state, &ctx, Action::UpdateType, input) {
        Ok(input) => input,
        Err(response) => return response,
    };
    match with_helpdesk(&state, &ctx, |helpdesk| {
        helpdesk.sessions().update_type(&ctx, &id, input)
    }) {
        Ok(session) => Envelope::ok(session)
            .with_message("Help session type updated successfully")
            .into_response(),
        Err(response) => response,
    }
}

#[utoipa::path(
    patch,
    path = "/api/help-sessions/technician/{id}/note",
    params(("id" = String, Path, description = "Help session ID")),
    request_body = AppendNoteInput,
    responses(
        (status = 200, body = Envelope<HelpSession>),
        (status = 400, body = ErrorEnvelope),
        (status = 403, body = ErrorEnvelope),
        (status = 404, body = ErrorEnvelope)
    ),
    security(("bearer" = []))
)]
pub(crate) async fn append_note(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    actor: CurrentActor,
    Path(id): Path<String>,
    JsonPayload(input): JsonPayload<AppendNoteInput>,
) -> Response {
    let ctx = context(actor, correlation);
    let input = match accept(&state, &ctx, Action::AppendNote, input) {
        Ok(input) => input,
        Err(response) => return response,
    };
    match with_helpdesk(&state, &ctx, |helpdesk| {
        helpdesk.sessions().append_note(&ctx, &id, input)
    }) {
        Ok(session) => Envelope::ok(session)
            .with_message("Note added successfully")
            .into_response(),
        Err(response) => response,
    }
}

#[utoipa::path(
    get,
    path = "/api/help-sessions/dashboard",
    responses(
        (status = 200, body = Envelope<Dashboard>),
        (status = 403, body = ErrorEnvelope)
    ),
    security(("bearer" = []))
)]
pub(crate) async fn dashboard(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    actor: CurrentActor,
) -> Response {
    let ctx = context(actor, correlation);
    match with_helpdesk(&state, &ctx, |helpdesk| helpdesk.sessions().dashboard(&ctx)) {
        Ok(dashboard) => Envelope::ok(dashboard).into_response(),
        Err(response) => response,
    }
}

#[utoipa::path(
    get,
    path = "/api/help-sessions/completed-by-period",
    responses(
        (status = 200, body = Envelope<CompletedByPeriod>),
        (status = 403, body = ErrorEnvelope)
    ),
    security(("bearer" = []))
)]
pub(crate) async fn completed_by_period(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    actor: CurrentActor,
) -> Response {
    let ctx = context(actor, correlation);
    match with_helpdesk(&state, &ctx, |helpdesk| {
        helpdesk
            .sessions()
            .completed_by_period(&ctx, chrono::Utc::now())
    }) {
        Ok(periods) => Envelope::ok(periods).into_response(),
        Err(response) => response,
    }
}

#[utoipa::path(
    get,
    path = "/api/help-sessions/search",
    params(SearchSessionsQuery),
    responses(
        (status = 200, body = Envelope<SearchResults>),
        (status = 400, body = ErrorEnvelope),
        (status = 403, body = ErrorEnvelope)
    ),
    security(("bearer" = []))
)]
pub(crate) async fn search(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    actor: CurrentActor,
    QueryPayload(query): QueryPayload<SearchSessionsQuery>,
) -> Response {
    let ctx = context(actor, correlation);
    let query = match accept(&state, &ctx, Action::List, query) {
        Ok(query) => query,
        Err(response) => return response,
    };
    match with_helpdesk(&state, &ctx, |helpdesk| helpdesk.sessions().search(&ctx, query)) {
        Ok(results) => Envelope::ok(results).into_response(),
        Err(response) => response,
    }
}
