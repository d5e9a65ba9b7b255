use crate::types::{HelpSession, HelpSessionId, SessionStatus, SpecialistId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// How a specialist came to be attached to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClaimPath {
    Creation,
    AutoAssign,
    AcceptReject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", content = "payload")]
pub enum EventBody {
    SessionCreated {
        session: HelpSession,
    },
    SessionClaimed {
        session_id: HelpSessionId,
        specialist_id: SpecialistId,
        previous_specialist_id: Option<SpecialistId>,
        path: ClaimPath,
    },
    SessionStatusChanged {
        session_id: HelpSessionId,
        from: SessionStatus,
        to: SessionStatus,
    },
    SessionUpdated {
        session: HelpSession,
    },
    NoteAppended {
        session_id: HelpSessionId,
        entry: String,
    },
    SessionDeleted {
        session_id: HelpSessionId,
    },
}
