use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;
use utoipa::ToSchema;

/// `hs_<ULID>`, minted when a session is opened.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(as = String)]
pub struct HelpSessionId(String);

/// `usr_<ULID>`; admins share the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(as = String)]
pub struct UserId(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(as = String)]
pub struct SpecialistId(String);

/// Subject of a bearer token. The prefix says which directory owns it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(untagged)]
#[schema(as = String)]
pub enum AccountId {
    User(UserId),
    Specialist(SpecialistId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("{value:?} is not a {kind} id (expected {prefix}<ulid>)")]
    WrongKind {
        kind: &'static str,
        prefix: &'static str,
        value: String,
    },
    #[error("{value:?} does not end in a 26-character ulid")]
    BadUlid { value: String },
    #[error("{value:?} names neither a user (usr_) nor a specialist (spc_)")]
    UnknownAccount { value: String },
}

fn check_id(value: &str, kind: &'static str, prefix: &'static str) -> Result<(), IdError> {
    let suffix = value.strip_prefix(prefix).ok_or_else(|| IdError::WrongKind {
        kind,
        prefix,
        value: value.to_string(),
    })?;
    match Ulid::from_string(suffix) {
        Ok(_) => Ok(()),
        Err(_) => Err(IdError::BadUlid {
            value: value.to_string(),
        }),
    }
}

macro_rules! prefixed_id {
    ($name:ident, $kind:literal, $prefix:literal) => {
        impl $name {
            pub const PREFIX: &'static str = $prefix;

            pub fn new(value: String) -> Result<Self, IdError> {
                check_id(&value, $kind, Self::PREFIX)?;
                Ok(Self(value))
            }

            pub fn generate() -> Self {
                Self(format!("{}{}", Self::PREFIX, Ulid::new()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s.to_owned())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                Self::new(String::deserialize(deserializer)?).map_err(serde::de::Error::custom)
            }
        }
    };
}

prefixed_id!(HelpSessionId, "help session", "hs_");
prefixed_id!(UserId, "user", "usr_");
prefixed_id!(SpecialistId, "specialist", "spc_");

impl AccountId {
    pub fn as_str(&self) -> &str {
        match self {
            Self::User(id) => id.as_str(),
            Self::Specialist(id) => id.as_str(),
        }
    }

    /// Routes a token subject to the user or specialist directory by prefix.
    pub fn parse(value: &str) -> Result<Self, IdError> {
        if value.starts_with(UserId::PREFIX) {
            UserId::from_str(value).map(Self::User)
        } else if value.starts_with(SpecialistId::PREFIX) {
            SpecialistId::from_str(value).map(Self::Specialist)
        } else {
            Err(IdError::UnknownAccount {
                value: value.to_string(),
            })
        }
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Self::parse(&String::deserialize(deserializer)?).map_err(serde::de::Error::custom)
    }
}

impl FromStr for AccountId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_round_trip_through_parse() {
        let id = HelpSessionId::generate();
        assert!(id.as_str().starts_with("hs_"));
        assert_eq!(HelpSessionId::from_str(id.as_str()).unwrap(), id);
    }

    #[test]
    fn user_id_is_not_a_specialist_id() {
        let user = UserId::generate();
        let err = SpecialistId::new(user.as_str().to_string()).unwrap_err();
        assert!(matches!(
            err,
            IdError::WrongKind {
                kind: "specialist",
                prefix: "spc_",
                ..
            }
        ));
    }

    #[test]
    fn short_suffix_is_rejected() {
        let err = HelpSessionId::new("hs_123".to_string()).unwrap_err();
        assert!(matches!(err, IdError::BadUlid { .. }));
    }

    #[test]
    fn account_id_dispatches_on_prefix() {
        let specialist = SpecialistId::generate();
        match AccountId::parse(specialist.as_str()).unwrap() {
            AccountId::Specialist(id) => assert_eq!(id, specialist),
            other => panic!("unexpected account {other:?}"),
        }
        let err = AccountId::parse("hs_01J0000000000000000000000").unwrap_err();
        assert!(matches!(err, IdError::UnknownAccount { .. }));
        assert!(err.to_string().contains("neither a user"));
    }
}
