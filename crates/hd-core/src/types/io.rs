use crate::types::enums::{SessionStatus, SessionType, SortOrder};
use crate::types::ids::SpecialistId;
use crate::types::session::HelpSession;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;
/// Largest row offset the store can bind.
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// Payment reference as sent by clients: either a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum InstapayReferenceInput {
    Number(u64),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateHelpSessionInput {
    pub steps: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub instapay_reference: Option<InstapayReferenceInput>,
    pub specialist: Option<String>,
    pub note: Option<String>,
}

/// Body of the general update path. Every field is optional; see
/// [`UpdateHelpSessionInput::into_updates`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateHelpSessionInput {
    pub status: Option<SessionStatus>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: Option<u32>,
    #[serde(rename = "type")]
    pub session_type: Option<SessionType>,
    pub note: Option<String>,
    pub description: Option<String>,
}

/// One requested field change on the general update path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionUpdate {
    SetStatus { status: SessionStatus },
    SetEndTime { end_time: DateTime<Utc> },
    SetDuration { seconds: u32 },
    SetType { session_type: SessionType },
    AppendNote { text: String },
    SetDescription { description: String },
}

impl UpdateHelpSessionInput {
    /// Converts the open body into typed intents in a fixed order.
    /// Empty strings count as absent.
    pub fn into_updates(self) -> Vec<SessionUpdate> {
        let mut updates = Vec::new();
        if let Some(status) = self.status {
            updates.push(SessionUpdate::SetStatus { status });
        }
        if let Some(end_time) = self.end_time {
            updates.push(SessionUpdate::SetEndTime { end_time });
        }
        if let Some(seconds) = self.duration {
            updates.push(SessionUpdate::SetDuration { seconds });
        }
        if let Some(session_type) = self.session_type {
            updates.push(SessionUpdate::SetType { session_type });
        }
        if let Some(text) = self.note.filter(|value| !value.is_empty()) {
            updates.push(SessionUpdate::AppendNote { text });
        }
        if let Some(description) = self.description.filter(|value| !value.is_empty()) {
            updates.push(SessionUpdate::SetDescription { description });
        }
        updates
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AssignStatusInput {
    pub status: SessionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UpdateTypeInput {
    #[serde(rename = "type")]
    pub session_type: SessionType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct AppendNoteInput {
    pub note: Option<String>,
}

/// Raw paging parameters; out-of-range values fall back to defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Page {
    pub page: u64,
    pub limit: u64,
}

impl Page {
    /// Rows before this page. Pages past the end saturate to an offset
    /// that simply yields no rows.
    pub fn skip(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.limit)
            .min(MAX_OFFSET)
    }
}

impl From<PageQuery> for Page {
    fn from(query: PageQuery) -> Self {
        let page = query
            .page
            .filter(|value| *value > 0)
            .map(|value| value as u64)
            .unwrap_or(DEFAULT_PAGE);
        let limit = query
            .limit
            .filter(|value| *value > 0)
            .map(|value| (value as u64).min(MAX_LIMIT))
            .unwrap_or(DEFAULT_LIMIT);
        Self { page, limit }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub pages: u64,
    pub limit: u64,
}

impl Pagination {
    pub fn new(total: u64, page: Page) -> Self {
        Self {
            total,
            page: page.page,
            pages: total.div_ceil(page.limit),
            limit: page.limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionPage {
    pub sessions: Vec<HelpSession>,
    pub pagination: Pagination,
}

/// Store-level predicate. All present fields must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFilter {
    pub status: Option<SessionStatus>,
    pub specialist_id: Option<SpecialistId>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct ListSessionsQuery {
    pub status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct TechnicianSessionsQuery {
    pub status: Option<String>,
    #[serde(alias = "technicianId")]
    pub technician_id: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct SearchSessionsQuery {
    pub search: Option<String>,
    pub sort: Option<SortOrder>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SearchResults {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_requests: u64,
    pub requests: Vec<HelpSession>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Dashboard {
    pub total: u64,
    pub sessions: Vec<crate::types::session::SessionSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_and_caps() {
        let page = Page::from(PageQuery::default());
        assert_eq!((page.page, page.limit), (1, 10));
        let page = Page::from(PageQuery {
            page: Some(-3),
            limit: Some(5000),
        });
        assert_eq!((page.page, page.limit), (1, MAX_LIMIT));
        let page = Page::from(PageQuery {
            page: Some(3),
            limit: Some(20),
        });
        assert_eq!(page.skip(), 40);
        let page = Page::from(PageQuery {
            page: Some(i64::MAX),
            limit: Some(100),
        });
        assert_eq!(page.page, i64::MAX as u64);
        assert_eq!(page.skip(), MAX_OFFSET);
        let page = Page::from(PageQuery {
            page: Some(200_000_000_000_000_000),
            limit: Some(100),
        });
        assert_eq!(page.skip(), MAX_OFFSET);
    }

    #[test]
    fn pagination_rounds_pages_up() {
        let page = Page { page: 2, limit: 10 };
        assert_eq!(Pagination::new(21, page).pages, 3);
        assert_eq!(Pagination::new(0, page).pages, 0);
    }

    #[test]
    fn update_body_becomes_ordered_intents() {
        let input: UpdateHelpSessionInput = serde_json::from_str(
            r#"{"status":"active","type":"short","note":"checked cables","description":""}"#,
        )
        .unwrap();
        let updates = input.into_updates();
        assert_eq!(
            updates,
            vec![
                SessionUpdate::SetStatus {
                    status: SessionStatus::Active
                },
                SessionUpdate::SetType {
                    session_type: SessionType::Short
                },
                SessionUpdate::AppendNote {
                    text: "checked cables".to_string()
                },
            ]
        );
    }

    #[test]
    fn reference_accepts_numbers_and_strings() {
        let input: CreateHelpSessionInput =
            serde_json::from_str(r#"{"instapay_reference": 510000000001}"#).unwrap();
        assert_eq!(
            input.instapay_reference,
            Some(InstapayReferenceInput::Number(510000000001))
        );
        let input: CreateHelpSessionInput =
            serde_json::from_str(r#"{"instapay_reference": "510000000001"}"#).unwrap();
        assert_eq!(
            input.instapay_reference,
            Some(InstapayReferenceInput::Text("510000000001".to_string()))
        );
    }
}
