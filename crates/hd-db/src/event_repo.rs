use crate::util::{decode_enum, decode_json, encode_enum, encode_json, from_rfc3339, sql_err, to_rfc3339};
use hd_core::error::HelpdeskError;
use hd_core::events::EventRepository;
use hd_events::types::EventRecord;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use ulid::Ulid;

pub struct EventRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> EventRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl<'a> EventRepository for EventRepo<'a> {
    fn append(&self, mut event: EventRecord) -> Result<EventRecord, HelpdeskError> {
        event.seq = next_seq(self.conn)?;
        event.id = format!("evt_{}", Ulid::new());
        let source = encode_enum(&event.source)?;
        let body = encode_json(&event.body)?;
        self.conn
            .execute(
                "INSERT INTO events (id, seq, at, correlation_id, source, actor, body_json) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    event.id,
                    event.seq,
                    to_rfc3339(&event.at),
                    event.correlation_id,
                    source,
                    event.actor,
                    body,
                ],
            )
            .map_err(sql_err)?;
        Ok(event)
    }

    fn list(
        &self,
        after: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<EventRecord>, HelpdeskError> {
        let mut sql =
            "SELECT id, seq, at, correlation_id, source, actor, body_json FROM events".to_string();
        let mut values = Vec::new();
        if let Some(after) = after {
            sql.push_str(" WHERE seq > ?");
            values.push(Value::Integer(after));
        }
        sql.push_str(" ORDER BY seq ASC");
        if let Some(limit) = limit {
            sql.push_str(" LIMIT ?");
            values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql).map_err(sql_err)?;
        let rows = stmt
            .query_map(params_from_iter(values), read_event)
            .map_err(sql_err)?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row.map_err(sql_err)?.into_record()?);
        }
        Ok(events)
    }
}

struct EventRow {
    id: String,
    seq: i64,
    at: String,
    correlation_id: Option<String>,
    source: String,
    actor: Option<String>,
    body_json: String,
}

impl EventRow {
    fn into_record(self) -> Result<EventRecord, HelpdeskError> {
        Ok(EventRecord {
            id: self.id,
            seq: self.seq,
            at: from_rfc3339(&self.at)?,
            correlation_id: self.correlation_id,
            source: decode_enum(&self.source)?,
            actor: self.actor,
            body: decode_json(&self.body_json)?,
        })
    }
}

fn read_event(row: &Row<'_>) -> rusqlite::Result<EventRow> {
    Ok(EventRow {
        id: row.get(0)?,
        seq: row.get(1)?,
        at: row.get(2)?,
        correlation_id: row.get(3)?,
        source: row.get(4)?,
        actor: row.get(5)?,
        body_json: row.get(6)?,
    })
}

fn next_seq(conn: &Connection) -> Result<i64, HelpdeskError> {
    let seq: i64 = conn
        .query_row("SELECT COALESCE(MAX(seq), 0) FROM events", [], |row| {
            row.get(0)
        })
        .map_err(sql_err)?;
    Ok(seq + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::with_test_db;
    use hd_events::types::EventSource;

    fn record() -> EventRecord {
        EventRecord {
            id: String::new(),
            seq: 0,
            at: chrono::Utc::now(),
            correlation_id: Some("req-1".to_string()),
            source: EventSource::Api,
            actor: Some("admin:usr_x".to_string()),
            body: serde_json::json!({ "type": "SessionDeleted", "payload": { "session_id": "hs_x" } }),
        }
    }

    #[test]
    fn append_assigns_increasing_sequence() {
        let conn = with_test_db().unwrap();
        let repo = EventRepo::new(&conn);
        let first = repo.append(record()).unwrap();
        let second = repo.append(record()).unwrap();
        assert_eq!(first.seq, 1);
        assert_eq!(second.seq, 2);
        assert!(first.id.starts_with("evt_"));
    }

    #[test]
    fn list_after_and_limit() {
        let conn = with_test_db().unwrap();
        let repo = EventRepo::new(&conn);
        for _ in 0..4 {
            repo.append(record()).unwrap();
        }
        let all = repo.list(None, None).unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].actor.as_deref(), Some("admin:usr_x"));
        let tail = repo.list(Some(2), Some(1)).unwrap();
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].seq, 3);
    }
}
