use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hd_core::error::{AuthError, DirectoryError, HelpdeskError, SessionError};
use serde::Serialize;
use utoipa::ToSchema;

const HIDDEN_INTERNAL: &str = "internal server error";

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub code: String,
    pub error: String,
    pub correlation_id: Option<String>,
}

pub fn map_error(
    err: &HelpdeskError,
    correlation_id: Option<String>,
    expose_errors: bool,
) -> (StatusCode, Json<ErrorEnvelope>) {
    let (status, code, message) = match err {
        HelpdeskError::Session(session) => map_session_error(session),
        HelpdeskError::Auth(auth) => map_auth_error(auth),
        HelpdeskError::Directory(directory) => map_directory_error(directory),
        HelpdeskError::Internal { .. } => {
            let message = if expose_errors {
                err.to_string()
            } else {
                HIDDEN_INTERNAL.to_string()
            };
            (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
        }
    };

    if status.is_server_error() {
        tracing::error!(correlation_id = ?correlation_id, error = %err, "request failed");
    } else {
        tracing::warn!(
            correlation_id = ?correlation_id,
            status = status.as_u16(),
            error = %err,
            "request rejected"
        );
    }

    (status, Json(envelope(code, message, correlation_id)))
}

pub fn error_response(
    err: &HelpdeskError,
    correlation_id: Option<String>,
    expose_errors: bool,
) -> Response {
    map_error(err, correlation_id, expose_errors).into_response()
}

/// 400 for bodies and query strings that do not deserialize.
pub fn malformed_request(message: String, correlation_id: Option<String>) -> Response {
    tracing::warn!(correlation_id = ?correlation_id, error = %message, "malformed request");
    (
        StatusCode::BAD_REQUEST,
        Json(envelope("invalid_input", message, correlation_id)),
    )
        .into_response()
}

fn envelope(code: &str, error: String, correlation_id: Option<String>) -> ErrorEnvelope {
    ErrorEnvelope {
        success: false,
        code: code.to_string(),
        error,
        correlation_id,
    }
}

fn map_session_error(err: &SessionError) -> (StatusCode, &'static str, String) {
    match err {
        SessionError::NotFound | SessionError::SpecialistNotFound | SessionError::UserNotFound => {
            (StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        SessionError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
        SessionError::Forbidden { .. } => (StatusCode::FORBIDDEN, "forbidden", err.to_string()),
        SessionError::Conflict { .. } => (StatusCode::CONFLICT, "conflict", err.to_string()),
    }
}

fn map_auth_error(err: &AuthError) -> (StatusCode, &'static str, String) {
    (StatusCode::UNAUTHORIZED, "unauthorized", err.to_string())
}

fn map_directory_error(err: &DirectoryError) -> (StatusCode, &'static str, String) {
    match err {
        DirectoryError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
        DirectoryError::Duplicate { .. } => (StatusCode::CONFLICT, "conflict", err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        let cases = [
            (HelpdeskError::from(SessionError::NotFound), StatusCode::NOT_FOUND),
            (SessionError::invalid("x").into(), StatusCode::BAD_REQUEST),
            (SessionError::forbidden("x").into(), StatusCode::FORBIDDEN),
            (
                SessionError::Conflict {
                    message: "x".to_string(),
                }
                .into(),
                StatusCode::CONFLICT,
            ),
            (AuthError::MissingCredential.into(), StatusCode::UNAUTHORIZED),
            (HelpdeskError::internal("disk"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            let (status, _) = map_error(&err, None, false);
            assert_eq!(status, expected, "{err}");
        }
    }

    #[test]
    fn internal_details_are_hidden_unless_exposed() {
        let err = HelpdeskError::internal("database is locked");
        let (_, Json(hidden)) = map_error(&err, Some("c1".to_string()), false);
        assert_eq!(hidden.error, HIDDEN_INTERNAL);
        assert_eq!(hidden.correlation_id.as_deref(), Some("c1"));
        assert!(!hidden.success);
        let (_, Json(shown)) = map_error(&err, None, true);
        assert!(shown.error.contains("database is locked"));
    }
}
