use chrono::{DateTime, SecondsFormat, Utc};
use hd_core::error::{DirectoryError, HelpdeskError, SessionError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("json encode failed: {message}")]
    JsonEncode { message: String },
    #[error("json decode failed: {message}")]
    JsonDecode { message: String },
    #[error("invalid enum value: {value}")]
    InvalidEnum { value: String },
    #[error("invalid timestamp: {value}")]
    InvalidTimestamp { value: String },
    #[error("invalid stored value in {column}: {message}")]
    InvalidColumn {
        column: &'static str,
        message: String,
    },
}

impl From<DbError> for HelpdeskError {
    fn from(err: DbError) -> Self {
        HelpdeskError::internal(err)
    }
}

/// Fixed width so stored timestamps sort lexically.
pub fn to_rfc3339(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn from_rfc3339(value: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DbError::InvalidTimestamp {
            value: value.to_string(),
        })
}

pub fn encode_json<T: Serialize>(value: &T) -> Result<String, DbError> {
    serde_json::to_string(value).map_err(|err| DbError::JsonEncode {
        message: err.to_string(),
    })
}

pub fn decode_json<T: DeserializeOwned>(value: &str) -> Result<T, DbError> {
    serde_json::from_str(value).map_err(|err| DbError::JsonDecode {
        message: err.to_string(),
    })
}

pub fn encode_enum<T: Serialize>(value: &T) -> Result<String, DbError> {
    let json = serde_json::to_value(value).map_err(|err| DbError::JsonEncode {
        message: err.to_string(),
    })?;
    match json {
        Value::String(value) => Ok(value),
        other => Err(DbError::InvalidEnum {
            value: other.to_string(),
        }),
    }
}

pub fn decode_enum<T: DeserializeOwned>(value: &str) -> Result<T, DbError> {
    let json = Value::String(value.to_string());
    serde_json::from_value(json).map_err(|_| DbError::InvalidEnum {
        value: value.to_string(),
    })
}

pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

pub fn sql_err(err: rusqlite::Error) -> HelpdeskError {
    HelpdeskError::internal(err)
}

/// Unique violations on session rows mean the payment reference is taken.
pub fn session_write_err(err: rusqlite::Error) -> HelpdeskError {
    if is_unique_violation(&err) {
        SessionError::Conflict {
            message: "instapay reference already used".to_string(),
        }
        .into()
    } else {
        sql_err(err)
    }
}

pub fn directory_write_err(err: rusqlite::Error) -> HelpdeskError {
    if is_unique_violation(&err) {
        DirectoryError::Duplicate {
            message: "email already registered".to_string(),
        }
        .into()
    } else {
        sql_err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_are_fixed_width_and_ordered() {
        let whole = Utc.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap();
        let later = whole + chrono::Duration::microseconds(1500);
        let a = to_rfc3339(&whole);
        let b = to_rfc3339(&later);
        assert_eq!(a.len(), b.len());
        assert!(a < b);
        assert_eq!(from_rfc3339(&b).unwrap(), later);
    }

    #[test]
    fn enum_codec_uses_serde_names() {
        use hd_core::types::SessionStatus;
        assert_eq!(encode_enum(&SessionStatus::Canceled).unwrap(), "canceled");
        let status: SessionStatus = decode_enum("active").unwrap();
        assert_eq!(status, SessionStatus::Active);
        assert!(decode_enum::<SessionStatus>("Active").is_err());
    }
}
