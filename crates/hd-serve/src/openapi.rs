use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::routes::envelope::DeletedSession;
use crate::routes::error::ErrorEnvelope;
use crate::routes::events::EventsQuery;
use crate::routes::Health;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use hd_core::types::enums::{SessionStatus, SessionType, SortOrder};
use hd_core::types::event::{ClaimPath, EventBody};
use hd_core::types::ids::{HelpSessionId, SpecialistId, UserId};
use hd_core::types::io::{
    AppendNoteInput, AssignStatusInput, CreateHelpSessionInput, Dashboard,
    InstapayReferenceInput, ListSessionsQuery, PageQuery, Pagination, SearchResults,
    SearchSessionsQuery, TechnicianSessionsQuery, UpdateHelpSessionInput, UpdateTypeInput,
};
use hd_core::types::session::{
    CompletedByPeriod, HelpSession, SessionStatusRow, SessionSummary, SpecialistSnapshot,
    UserSnapshot,
};
use hd_events::types::{EventRecord, EventSource};

#[derive(OpenApi)]
#[openapi(
    info(title = "Helpdesk API", description = "Help-session lifecycle service"),
    paths(
        crate::routes::health,
        crate::routes::help_sessions::create_session,
        crate::routes::help_sessions::list_pending,
        crate::routes::help_sessions::list_sessions,
        crate::routes::help_sessions::get_session,
        crate::routes::help_sessions::update_session,
        crate::routes::help_sessions::delete_session,
        crate::routes::help_sessions::technician_sessions,
        crate::routes::help_sessions::assign_status,
        crate::routes::help_sessions::update_type,
        crate::routes::help_sessions::append_note,
        crate::routes::help_sessions::dashboard,
        crate::routes::help_sessions::completed_by_period,
        crate::routes::help_sessions::search,
        crate::routes::events::list_events,
        crate::routes::events::subscribe
    ),
    components(schemas(
        Health,
        ErrorEnvelope,
        DeletedSession,
        HelpSession,
        UserSnapshot,
        SpecialistSnapshot,
        SessionSummary,
        SessionStatusRow,
        CompletedByPeriod,
        Dashboard,
        SearchResults,
        Pagination,
        CreateHelpSessionInput,
        InstapayReferenceInput,
        UpdateHelpSessionInput,
        AssignStatusInput,
        UpdateTypeInput,
        AppendNoteInput,
        PageQuery,
        ListSessionsQuery,
        TechnicianSessionsQuery,
        SearchSessionsQuery,
        EventRecord,
        EventsQuery,
        EventBody,
        ClaimPath,
        HelpSessionId,
        UserId,
        SpecialistId,
        SessionStatus,
        SessionType,
        SortOrder,
        EventSource
    )),
    modifiers(&BearerAuth)
)]
struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub fn generate_spec() -> String {
    ApiDoc::openapi()
        .to_pretty_json()
        .unwrap_or_else(|_| "{}".to_string())
}

pub fn router() -> Router {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_lists_session_routes_and_bearer_scheme() {
        let spec: serde_json::Value = serde_json::from_str(&generate_spec()).unwrap();
        let paths = spec["paths"].as_object().unwrap();
        assert!(paths.contains_key("/api/help-sessions"));
        assert!(paths.contains_key("/api/help-sessions/{id}"));
        assert!(paths.contains_key("/api/help-sessions/technician/{id}/status"));
        assert!(paths.contains_key("/api/events/subscribe"));
        assert_eq!(
            spec["components"]["securitySchemes"]["bearer"]["scheme"],
            "bearer"
        );
    }
}
