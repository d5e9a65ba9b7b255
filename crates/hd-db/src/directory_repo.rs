use crate::util::{directory_write_err, from_rfc3339, sql_err, to_rfc3339, DbError};
use hd_core::directory::DirectoryRepository;
use hd_core::error::HelpdeskError;
use hd_core::types::{NewSpecialist, NewUser, Specialist, SpecialistId, User, UserId};
use rusqlite::{Connection, OptionalExtension, Row};
use std::str::FromStr;

pub struct DirectoryRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> DirectoryRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl<'a> DirectoryRepository for DirectoryRepo<'a> {
    fn get_user(&self, id: &UserId) -> Result<Option<User>, HelpdeskError> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, username, email, phone_number, user_presence, created_at FROM users WHERE id = ?1",
                [id.as_str()],
                read_user,
            )
            .optional()
            .map_err(sql_err)?;
        raw.map(|raw| raw.into_user().map_err(HelpdeskError::from))
            .transpose()
    }

    fn get_specialist(&self, id: &SpecialistId) -> Result<Option<Specialist>, HelpdeskError> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, name, email, phone_number, specialization, created_at FROM specialists WHERE id = ?1",
                [id.as_str()],
                read_specialist,
            )
            .optional()
            .map_err(sql_err)?;
        raw.map(|raw| raw.into_specialist().map_err(HelpdeskError::from))
            .transpose()
    }

    fn add_user(&self, input: NewUser) -> Result<User, HelpdeskError> {
        let user = User {
            id: UserId::generate(),
            username: input.username.trim().to_string(),
            email: input.email.trim().to_lowercase(),
            phone_number: input.phone_number.trim().to_string(),
            is_admin: input.is_admin,
            created_at: chrono::Utc::now(),
        };
        self.conn
            .execute(
                "INSERT INTO users (id, username, email, phone_number, user_presence, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    user.id.as_str(),
                    user.username,
                    user.email,
                    user.phone_number,
                    if user.is_admin { 1 } else { 0 },
                    to_rfc3339(&user.created_at),
                ],
            )
            .map_err(directory_write_err)?;
        Ok(user)
    }

    fn add_specialist(&self, input: NewSpecialist) -> Result<Specialist, HelpdeskError> {
        let specialist = Specialist {
            id: SpecialistId::generate(),
            name: input.name.trim().to_string(),
            email: input.email.trim().to_lowercase(),
            phone_number: input.phone_number.trim().to_string(),
            specialization: input
                .specialization
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            created_at: chrono::Utc::now(),
        };
        self.conn
            .execute(
                "INSERT INTO specialists (id, name, email, phone_number, specialization, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    specialist.id.as_str(),
                    specialist.name,
                    specialist.email,
                    specialist.phone_number,
                    specialist.specialization,
                    to_rfc3339(&specialist.created_at),
                ],
            )
            .map_err(directory_write_err)?;
        Ok(specialist)
    }
}

struct UserRow {
    id: String,
    username: String,
    email: String,
    phone_number: String,
    user_presence: i64,
    created_at: String,
}

impl UserRow {
    fn into_user(self) -> Result<User, DbError> {
        Ok(User {
            id: UserId::from_str(&self.id).map_err(|err| DbError::InvalidColumn {
                column: "users.id",
                message: err.to_string(),
            })?,
            username: self.username,
            email: self.email,
            phone_number: self.phone_number,
            is_admin: self.user_presence == 1,
            created_at: from_rfc3339(&self.created_at)?,
        })
    }
}

fn read_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        phone_number: row.get(3)?,
        user_presence: row.get(4)?,
        created_at: row.get(5)?,
    })
}

struct SpecialistRow {
    id: String,
    name: String,
    email: String,
    phone_number: String,
    specialization: Option<String>,
    created_at: String,
}

impl SpecialistRow {
    fn into_specialist(self) -> Result<Specialist, DbError> {
        Ok(Specialist {
            id: SpecialistId::from_str(&self.id).map_err(|err| DbError::InvalidColumn {
                column: "specialists.id",
                message: err.to_string(),
            })?,
            name: self.name,
            email: self.email,
            phone_number: self.phone_number,
            specialization: self.specialization,
            created_at: from_rfc3339(&self.created_at)?,
        })
    }
}

fn read_specialist(row: &Row<'_>) -> rusqlite::Result<SpecialistRow> {
    Ok(SpecialistRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone_number: row.get(3)?,
        specialization: row.get(4)?,
        created_at: row.get(5)?,
    })
}
