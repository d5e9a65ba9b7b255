use crate::types::directory::User;
use crate::types::ids::{SpecialistId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Resolved caller identity. Role is fixed at resolution time and passed
/// explicitly into every core operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Actor {
    Admin(UserId),
    User(UserId),
    Specialist(SpecialistId),
}

impl Actor {
    pub fn from_user(user: &User) -> Self {
        if user.is_admin {
            Self::Admin(user.id.clone())
        } else {
            Self::User(user.id.clone())
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin(_))
    }

    pub fn is_specialist(&self) -> bool {
        matches!(self, Self::Specialist(_))
    }

    pub fn specialist_id(&self) -> Option<&SpecialistId> {
        match self {
            Self::Specialist(id) => Some(id),
            _ => None,
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::Admin(id) | Self::User(id) => Some(id),
            Self::Specialist(_) => None,
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin(id) => write!(f, "admin:{id}"),
            Self::User(id) => write!(f, "user:{id}"),
            Self::Specialist(id) => write!(f, "specialist:{id}"),
        }
    }
}
