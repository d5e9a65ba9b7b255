use crate::types::enums::{SessionStatus, SessionType};
use crate::types::ids::{HelpSessionId, SpecialistId, UserId};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Requester details copied at creation; never re-synced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserSnapshot {
    pub id: UserId,
    pub username: String,
    pub phone_number: String,
}

/// Technician details copied when a specialist is attached to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SpecialistSnapshot {
    pub id: SpecialistId,
    pub name: String,
    pub specialization: Option<String>,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HelpSession {
    pub id: HelpSessionId,
    pub user: UserSnapshot,
    pub specialist: Option<SpecialistSnapshot>,
    pub status: SessionStatus,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    pub note: String,
    pub instapay_reference: u64,
    pub description: String,
    pub steps: String,
    pub image_url: String,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: Option<u32>,
    pub day_of_the_week: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HelpSession {
    pub fn assigned_specialist(&self) -> Option<&SpecialistId> {
        self.specialist.as_ref().map(|snapshot| &snapshot.id)
    }

    pub fn is_assigned_to(&self, specialist_id: &SpecialistId) -> bool {
        self.assigned_specialist() == Some(specialist_id)
    }
}

/// Validated creation payload handed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHelpSession {
    pub user: UserSnapshot,
    pub specialist: Option<SpecialistSnapshot>,
    pub instapay_reference: u64,
    pub note: String,
    pub steps: String,
    pub description: String,
    pub image_url: String,
}

/// Dashboard projection of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionSummary {
    pub id: HelpSessionId,
    pub status: SessionStatus,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    pub specialist_id: Option<SpecialistId>,
    pub specialist_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub day_of_the_week: u8,
}

impl From<&HelpSession> for SessionSummary {
    fn from(session: &HelpSession) -> Self {
        Self {
            id: session.id.clone(),
            status: session.status,
            session_type: session.session_type,
            specialist_id: session.assigned_specialist().cloned(),
            specialist_name: session.specialist.as_ref().map(|s| s.name.clone()),
            created_at: session.created_at,
            day_of_the_week: session.day_of_the_week,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionStatusRow {
    pub id: HelpSessionId,
    pub status: SessionStatus,
    pub specialist_id: Option<SpecialistId>,
}

impl From<&HelpSession> for SessionStatusRow {
    fn from(session: &HelpSession) -> Self {
        Self {
            id: session.id.clone(),
            status: session.status,
            specialist_id: session.assigned_specialist().cloned(),
        }
    }
}

/// Completed sessions bucketed by how recently they were opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CompletedByPeriod {
    pub day: Vec<SessionStatusRow>,
    pub week: Vec<SessionStatusRow>,
    pub month: Vec<SessionStatusRow>,
}

/// Weekday index with Sunday as 0.
pub fn day_of_the_week(at: &DateTime<Utc>) -> u8 {
    at.weekday().num_days_from_sunday() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn day_of_the_week_counts_from_sunday() {
        let sunday = Utc.with_ymd_and_hms(2024, 6, 2, 12, 0, 0).unwrap();
        let saturday = Utc.with_ymd_and_hms(2024, 6, 8, 23, 59, 59).unwrap();
        assert_eq!(day_of_the_week(&sunday), 0);
        assert_eq!(day_of_the_week(&saturday), 6);
    }
}
