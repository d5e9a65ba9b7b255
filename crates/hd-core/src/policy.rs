use crate::error::SessionError;
use crate::types::{Actor, HelpSession};

/// How the caller relates to one session. Exactly one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Admin,
    AssignedSpecialist,
    /// Session unassigned or assigned to another specialist.
    OtherSpecialist,
    OwningUser,
    OtherUser,
}

pub fn relation(actor: &Actor, session: &HelpSession) -> Relation {
    match actor {
        Actor::Admin(_) => Relation::Admin,
        Actor::Specialist(id) if session.is_assigned_to(id) => Relation::AssignedSpecialist,
        Actor::Specialist(_) => Relation::OtherSpecialist,
        Actor::User(id) if session.user.id == *id => Relation::OwningUser,
        Actor::User(_) => Relation::OtherUser,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Read,
    /// Lists, dashboard, statistics, search and the event feed.
    List,
    UpdateStatus,
    AssignAndSetStatus,
    UpdateType,
    AppendNote,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::List => "list",
            Self::UpdateStatus => "update_status",
            Self::AssignAndSetStatus => "assign_and_set_status",
            Self::UpdateType => "update_type",
            Self::AppendNote => "append_note",
            Self::Delete => "delete",
        }
    }
}

/// Role gate on the actor kind alone. Runs before the payload is
/// validated or the session is loaded.
pub fn gate(action: Action, actor: &Actor) -> Result<(), SessionError> {
    let allowed = match action {
        Action::Create => matches!(actor, Actor::User(_)),
        Action::Read => true,
        Action::List | Action::UpdateStatus => actor.is_admin() || actor.is_specialist(),
        Action::AssignAndSetStatus | Action::UpdateType | Action::AppendNote => {
            actor.is_specialist()
        }
        Action::Delete => actor.is_admin(),
    };
    if allowed {
        Ok(())
    } else {
        Err(SessionError::forbidden(denial_message(action)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// Attach the calling specialist to the unassigned session, then proceed.
    ClaimThenAllow,
    Deny(&'static str),
}

/// Relation check against a loaded session.
pub fn decide(action: Action, actor: &Actor, session: &HelpSession) -> Decision {
    let relation = relation(actor, session);
    match (action, relation) {
        (Action::Create | Action::List, _) => Decision::Allow,
        (Action::Read, Relation::OtherUser) => Decision::Deny(denial_message(action)),
        (Action::Read, _) => Decision::Allow,
        (Action::UpdateStatus, Relation::Admin | Relation::AssignedSpecialist) => Decision::Allow,
        (Action::UpdateStatus, Relation::OtherSpecialist) if session.specialist.is_none() => {
            Decision::ClaimThenAllow
        }
        (
            Action::AssignAndSetStatus,
            Relation::AssignedSpecialist | Relation::OtherSpecialist,
        ) => Decision::Allow,
        (Action::UpdateType | Action::AppendNote, Relation::AssignedSpecialist) => {
            Decision::Allow
        }
        (Action::Delete, Relation::Admin) => Decision::Allow,
        _ => Decision::Deny(denial_message(action)),
    }
}

/// [`decide`], with denial turned into [`SessionError::Forbidden`].
pub fn authorize(
    action: Action,
    actor: &Actor,
    session: &HelpSession,
) -> Result<Decision, SessionError> {
    match decide(action, actor, session) {
        Decision::Deny(message) => Err(SessionError::forbidden(message)),
        decision => Ok(decision),
    }
}

fn denial_message(action: Action) -> &'static str {
    match action {
        Action::Create => "only users can create help sessions",
        Action::Read => "not allowed to view this help session",
        Action::List => "only admins and specialists can list help sessions",
        Action::UpdateStatus => "not allowed to update this help session",
        Action::AssignAndSetStatus => "only specialists can accept or reject help sessions",
        Action::UpdateType => "only the assigned specialist can change the session type",
        Action::AppendNote => "only the assigned specialist can add notes",
        Action::Delete => "only admins can delete help sessions",
    }
}
