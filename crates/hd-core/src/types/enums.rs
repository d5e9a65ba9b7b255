use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Every status a help session can hold, shared by creation and all update paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Accepted,
    Active,
    Completed,
    Rejected,
    Canceled,
}

impl SessionStatus {
    /// Values the general update path may set.
    pub const UPDATE_PATH: [SessionStatus; 4] = [
        SessionStatus::Pending,
        SessionStatus::Active,
        SessionStatus::Completed,
        SessionStatus::Canceled,
    ];

    /// Values the accept/reject assignment path may set.
    pub const ASSIGNMENT_PATH: [SessionStatus; 2] =
        [SessionStatus::Accepted, SessionStatus::Rejected];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Canceled => "canceled",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "rejected" => Ok(Self::Rejected),
            "canceled" => Ok(Self::Canceled),
            other => Err(format!("unknown session status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    #[default]
    #[serde(rename = "")]
    Unset,
    Short,
    Long,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unset => "",
            Self::Short => "short",
            Self::Long => "long",
        }
    }
}

impl FromStr for SessionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(Self::Unset),
            "short" => Ok(Self::Short),
            "long" => Ok(Self::Long),
            other => Err(format!("unknown session type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}
