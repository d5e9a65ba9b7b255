use axum::response::{IntoResponse, Response};
use axum::Json;
use hd_core::types::io::{Pagination, SessionPage};
use hd_core::types::HelpSession;
use serde::Serialize;
use utoipa::ToSchema;

/// `{success, message?, data, pagination?}`
#[derive(Debug, Serialize, ToSchema)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
            pagination: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Envelope<Vec<HelpSession>> {
    pub fn paged(page: SessionPage) -> Self {
        Self {
            success: true,
            message: None,
            data: page.sessions,
            pagination: Some(page.pagination),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedSession {
    pub id: String,
}
