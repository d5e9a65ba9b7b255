use crate::util::{
    decode_enum, encode_enum, from_rfc3339, session_write_err, sql_err, to_rfc3339, DbError,
};
use hd_core::error::{HelpdeskError, SessionError};
use hd_core::sessions::SessionRepository;
use hd_core::transitions::SessionPatch;
use hd_core::types::io::SessionFilter;
use hd_core::types::session::day_of_the_week;
use hd_core::types::{
    HelpSession, HelpSessionId, NewHelpSession, SortOrder, SpecialistId, SpecialistSnapshot,
    UserId, UserSnapshot,
};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use std::str::FromStr;

const SESSION_COLUMNS: &str = "id, user_id, user_username, user_phone_number, specialist_id, specialist_name, specialist_specialization, specialist_email, specialist_phone, status, session_type, note, instapay_reference, description, steps, image_url, end_time, duration, day_of_the_week, created_at, updated_at";

pub struct SessionRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> SessionRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn write_row(&self, sql: &str, session: &HelpSession) -> Result<(), HelpdeskError> {
        let specialist = session.specialist.as_ref();
        let status = encode_enum(&session.status)?;
        let session_type = encode_enum(&session.session_type)?;
        let reference = reference_to_sql(session.instapay_reference)?;
        let end_time = session.end_time.map(|value| to_rfc3339(&value));
        self.conn
            .execute(
                sql,
                rusqlite::params![
                    session.id.as_str(),
                    session.user.id.as_str(),
                    session.user.username,
                    session.user.phone_number,
                    specialist.map(|s| s.id.as_str()),
                    specialist.map(|s| s.name.as_str()),
                    specialist.and_then(|s| s.specialization.as_deref()),
                    specialist.map(|s| s.email.as_str()),
                    specialist.map(|s| s.phone.as_str()),
                    status,
                    session_type,
                    session.note,
                    reference,
                    session.description,
                    session.steps,
                    session.image_url,
                    end_time,
                    session.duration,
                    session.day_of_the_week,
                    to_rfc3339(&session.created_at),
                    to_rfc3339(&session.updated_at),
                ],
            )
            .map_err(session_write_err)?;
        Ok(())
    }
}

impl<'a> SessionRepository for SessionRepo<'a> {
    fn create(&self, input: NewHelpSession) -> Result<HelpSession, HelpdeskError> {
        let now = chrono::Utc::now();
        let session = HelpSession {
            id: HelpSessionId::generate(),
            user: input.user,
            specialist: input.specialist,
            status: hd_core::types::SessionStatus::Pending,
            session_type: hd_core::types::SessionType::Unset,
            note: input.note,
            instapay_reference: input.instapay_reference,
            description: input.description,
            steps: input.steps,
            image_url: input.image_url,
            end_time: None,
            duration: None,
            day_of_the_week: day_of_the_week(&now),
            created_at: now,
            updated_at: now,
        };
        let sql = format!(
            "INSERT INTO help_sessions ({SESSION_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)"
        );
        self.write_row(&sql, &session)?;
        Ok(session)
    }

    fn find(&self, id: &HelpSessionId) -> Result<Option<HelpSession>, HelpdeskError> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM help_sessions WHERE id = ?1");
        let raw = self
            .conn
            .query_row(&sql, [id.as_str()], SessionRow::read)
            .optional()
            .map_err(sql_err)?;
        raw.map(SessionRow::into_session).transpose()
    }

    fn find_many(
        &self,
        filter: &SessionFilter,
        sort: SortOrder,
        skip: u64,
        limit: Option<u64>,
    ) -> Result<Vec<HelpSession>, HelpdeskError> {
        let (clause, mut values) = where_clause(filter);
        let direction = match sort {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM help_sessions{clause} ORDER BY created_at {direction}, id {direction} LIMIT ? OFFSET ?"
        );
        values.push(Value::Integer(match limit {
            Some(limit) => to_sql_int(limit)?,
            None => -1,
        }));
        values.push(Value::Integer(to_sql_int(skip)?));

        let mut stmt = self.conn.prepare(&sql).map_err(sql_err)?;
        let rows = stmt
            .query_map(params_from_iter(values), SessionRow::read)
            .map_err(sql_err)?;
        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row.map_err(sql_err)?.into_session()?);
        }
        Ok(sessions)
    }

    fn count(&self, filter: &SessionFilter) -> Result<u64, HelpdeskError> {
        let (clause, values) = where_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM help_sessions{clause}");
        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(values), |row| row.get(0))
            .map_err(sql_err)?;
        Ok(count.max(0) as u64)
    }

    fn update_by_id(
        &self,
        id: &HelpSessionId,
        patch: &SessionPatch,
    ) -> Result<HelpSession, HelpdeskError> {
        let mut session = self.find(id)?.ok_or(SessionError::NotFound)?;
        if patch.is_empty() {
            return Ok(session);
        }
        patch.apply(&mut session);
        session.updated_at = chrono::Utc::now();
        let sql = format!(
            "UPDATE help_sessions SET ({SESSION_COLUMNS}) = (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21) WHERE id = ?1"
        );
        self.write_row(&sql, &session)?;
        Ok(session)
    }

    fn delete_by_id(&self, id: &HelpSessionId) -> Result<bool, HelpdeskError> {
        let changed = self
            .conn
            .execute("DELETE FROM help_sessions WHERE id = ?1", [id.as_str()])
            .map_err(sql_err)?;
        Ok(changed > 0)
    }
}

/// Builds ` WHERE ...` with positional parameters in clause order.
fn where_clause(filter: &SessionFilter) -> (String, Vec<Value>) {
    let mut conditions = Vec::new();
    let mut values = Vec::new();
    if let Some(status) = filter.status {
        conditions.push("status = ?".to_string());
        values.push(Value::Text(status.as_str().to_string()));
    }
    if let Some(specialist_id) = &filter.specialist_id {
        conditions.push("specialist_id = ?".to_string());
        values.push(Value::Text(specialist_id.as_str().to_string()));
    }
    // created_from is inclusive, created_to exclusive.
    if let Some(from) = &filter.created_from {
        conditions.push("created_at >= ?".to_string());
        values.push(Value::Text(to_rfc3339(from)));
    }
    if let Some(to) = &filter.created_to {
        conditions.push("created_at < ?".to_string());
        values.push(Value::Text(to_rfc3339(to)));
    }
    if let Some(term) = &filter.search {
        conditions.push(
            "(CAST(instapay_reference AS TEXT) LIKE ? ESCAPE '\\' OR lower(user_username) LIKE ? ESCAPE '\\' OR lower(COALESCE(specialist_name, '')) LIKE ? ESCAPE '\\')"
                .to_string(),
        );
        let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
        for _ in 0..3 {
            values.push(Value::Text(pattern.clone()));
        }
    }
    if conditions.is_empty() {
        (String::new(), values)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), values)
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn to_sql_int(value: u64) -> Result<i64, DbError> {
    i64::try_from(value).map_err(|err| DbError::InvalidColumn {
        column: "limit",
        message: err.to_string(),
    })
}

fn reference_to_sql(value: u64) -> Result<i64, DbError> {
    i64::try_from(value).map_err(|err| DbError::InvalidColumn {
        column: "instapay_reference",
        message: err.to_string(),
    })
}

/// Raw column values; decoding happens outside the rusqlite row callback.
struct SessionRow {
    id: String,
    user_id: String,
    user_username: String,
    user_phone_number: String,
    specialist_id: Option<String>,
    specialist_name: Option<String>,
    specialist_specialization: Option<String>,
    specialist_email: Option<String>,
    specialist_phone: Option<String>,
    status: String,
    session_type: String,
    note: String,
    instapay_reference: i64,
    description: String,
    steps: String,
    image_url: String,
    end_time: Option<String>,
    duration: Option<u32>,
    day_of_the_week: u8,
    created_at: String,
    updated_at: String,
}

impl SessionRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            user_username: row.get(2)?,
            user_phone_number: row.get(3)?,
            specialist_id: row.get(4)?,
            specialist_name: row.get(5)?,
            specialist_specialization: row.get(6)?,
            specialist_email: row.get(7)?,
            specialist_phone: row.get(8)?,
            status: row.get(9)?,
            session_type: row.get(10)?,
            note: row.get(11)?,
            instapay_reference: row.get(12)?,
            description: row.get(13)?,
            steps: row.get(14)?,
            image_url: row.get(15)?,
            end_time: row.get(16)?,
            duration: row.get(17)?,
            day_of_the_week: row.get(18)?,
            created_at: row.get(19)?,
            updated_at: row.get(20)?,
        })
    }

    fn into_session(self) -> Result<HelpSession, HelpdeskError> {
        let specialist = match self.specialist_id {
            Some(id) => Some(SpecialistSnapshot {
                id: SpecialistId::from_str(&id).map_err(|err| invalid("specialist_id", err))?,
                name: self.specialist_name.unwrap_or_default(),
                specialization: self.specialist_specialization,
                email: self.specialist_email.unwrap_or_default(),
                phone: self.specialist_phone.unwrap_or_default(),
            }),
            None => None,
        };
        Ok(HelpSession {
            id: HelpSessionId::from_str(&self.id).map_err(|err| invalid("id", err))?,
            user: UserSnapshot {
                id: UserId::from_str(&self.user_id).map_err(|err| invalid("user_id", err))?,
                username: self.user_username,
                phone_number: self.user_phone_number,
            },
            specialist,
            status: decode_enum(&self.status)?,
            session_type: decode_enum(&self.session_type)?,
            note: self.note,
            instapay_reference: u64::try_from(self.instapay_reference)
                .map_err(|err| invalid("instapay_reference", err))?,
            description: self.description,
            steps: self.steps,
            image_url: self.image_url,
            end_time: self.end_time.as_deref().map(from_rfc3339).transpose()?,
            duration: self.duration,
            day_of_the_week: self.day_of_the_week,
            created_at: from_rfc3339(&self.created_at)?,
            updated_at: from_rfc3339(&self.updated_at)?,
        })
    }
}

fn invalid(column: &'static str, err: impl std::fmt::Display) -> DbError {
    DbError::InvalidColumn {
        column,
        message: err.to_string(),
    }
}
