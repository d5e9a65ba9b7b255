use crate::types::io::SessionUpdate;
use crate::types::{
    HelpSession, SessionStatus, SessionType, SpecialistId, SpecialistSnapshot, UserId,
};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;

/// Columns to overwrite. `None` leaves a column untouched.
///
/// Status is a flat field: any value allowed on a path may replace any
/// current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionPatch {
    pub status: Option<SessionStatus>,
    pub specialist: Option<SpecialistSnapshot>,
    pub session_type: Option<SessionType>,
    /// Full note log after appending, never a fragment.
    pub note: Option<String>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: Option<u32>,
    pub description: Option<String>,
}

impl SessionPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.specialist.is_none()
            && self.session_type.is_none()
            && self.note.is_none()
            && self.end_time.is_none()
            && self.duration.is_none()
            && self.description.is_none()
    }

    pub fn apply(&self, session: &mut HelpSession) {
        if let Some(status) = self.status {
            session.status = status;
        }
        if let Some(specialist) = &self.specialist {
            session.specialist = Some(specialist.clone());
        }
        if let Some(session_type) = self.session_type {
            session.session_type = session_type;
        }
        if let Some(note) = &self.note {
            session.note = note.clone();
        }
        if let Some(end_time) = self.end_time {
            session.end_time = Some(end_time);
        }
        if let Some(duration) = self.duration {
            session.duration = Some(duration);
        }
        if let Some(description) = &self.description {
            session.description = description.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteAuthor {
    Technician(SpecialistId),
    Admin(UserId),
}

impl fmt::Display for NoteAuthor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Technician(id) => write!(f, "Technician: {id}"),
            Self::Admin(id) => write!(f, "Admin: {id}"),
        }
    }
}

/// `[<timestamp>] [<author>] <trimmed text>`
pub fn format_note_entry(author: &NoteAuthor, text: &str, at: DateTime<Utc>) -> String {
    format!(
        "[{}] [{}] {}",
        at.to_rfc3339_opts(SecondsFormat::Millis, true),
        author,
        text.trim()
    )
}

pub fn append_note(existing: &str, entry: &str) -> String {
    if existing.is_empty() {
        entry.to_string()
    } else {
        format!("{existing}\n{entry}")
    }
}

/// Folds validated intents into one patch for `session`.
///
/// Notes accumulate: every `AppendNote` adds an entry to the log.
pub fn plan_updates(
    session: &HelpSession,
    updates: &[SessionUpdate],
    author: &NoteAuthor,
    now: DateTime<Utc>,
) -> SessionPatch {
    let mut patch = SessionPatch::default();
    let mut note = session.note.clone();
    let mut note_changed = false;
    for update in updates {
        match update {
            SessionUpdate::SetStatus { status } => patch.status = Some(*status),
            SessionUpdate::SetEndTime { end_time } => patch.end_time = Some(*end_time),
            SessionUpdate::SetDuration { seconds } => patch.duration = Some(*seconds),
            SessionUpdate::SetType { session_type } => patch.session_type = Some(*session_type),
            SessionUpdate::AppendNote { text } => {
                note = append_note(&note, &format_note_entry(author, text, now));
                note_changed = true;
            }
            SessionUpdate::SetDescription { description } => {
                patch.description = Some(description.trim().to_string());
            }
        }
    }
    if note_changed {
        patch.note = Some(note);
    }
    patch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HelpSessionId, UserSnapshot};
    use chrono::TimeZone;

    fn session() -> HelpSession {
        let at = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
        HelpSession {
            id: HelpSessionId::generate(),
            user: UserSnapshot {
                id: UserId::generate(),
                username: "amr".to_string(),
                phone_number: "01000000000".to_string(),
            },
            specialist: None,
            status: SessionStatus::Pending,
            session_type: SessionType::Unset,
            note: String::new(),
            instapay_reference: 510000000001,
            description: "no sound".to_string(),
            steps: "checked volume".to_string(),
            image_url: "https://img.example/a.png".to_string(),
            end_time: None,
            duration: None,
            day_of_the_week: 1,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn note_entry_format() {
        let id = SpecialistId::generate();
        let at = Utc.with_ymd_and_hms(2024, 6, 3, 10, 30, 0).unwrap();
        let entry = format_note_entry(&NoteAuthor::Technician(id.clone()), "  swapped cable ", at);
        assert_eq!(
            entry,
            format!("[2024-06-03T10:30:00.000Z] [Technician: {id}] swapped cable")
        );
    }

    #[test]
    fn notes_accumulate_in_order() {
        let first = append_note("", "a");
        let second = append_note(&first, "b");
        assert_eq!(second, "a\nb");
    }

    #[test]
    fn plan_only_touches_requested_fields() {
        let s = session();
        let author = NoteAuthor::Technician(SpecialistId::generate());
        let patch = plan_updates(
            &s,
            &[SessionUpdate::SetDuration { seconds: 600 }],
            &author,
            Utc::now(),
        );
        assert_eq!(
            patch,
            SessionPatch {
                duration: Some(600),
                ..SessionPatch::default()
            }
        );
    }

    #[test]
    fn same_updates_twice_match_once_except_notes() {
        let author = NoteAuthor::Admin(UserId::generate());
        let updates = vec![
            SessionUpdate::SetStatus {
                status: SessionStatus::Completed,
            },
            SessionUpdate::SetType {
                session_type: SessionType::Long,
            },
            SessionUpdate::AppendNote {
                text: "closed".to_string(),
            },
        ];
        let mut once = session();
        plan_updates(&once, &updates, &author, Utc::now()).apply(&mut once);
        let mut twice = once.clone();
        plan_updates(&twice, &updates, &author, Utc::now()).apply(&mut twice);

        assert_eq!(once.status, twice.status);
        assert_eq!(once.session_type, twice.session_type);
        assert_eq!(once.note.lines().count(), 1);
        assert_eq!(twice.note.lines().count(), 2);
        assert!(twice.note.starts_with(&once.note));
    }

    #[test]
    fn empty_patch_detection() {
        assert!(SessionPatch::default().is_empty());
        let patch = SessionPatch {
            session_type: Some(SessionType::Short),
            ..SessionPatch::default()
        };
        assert!(!patch.is_empty());
    }
}
