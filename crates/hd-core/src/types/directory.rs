use crate::types::ids::{SpecialistId, UserId};
use crate::types::session::{SpecialistSnapshot, UserSnapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn snapshot(&self) -> UserSnapshot {
        UserSnapshot {
            id: self.id.clone(),
            username: self.username.clone(),
            phone_number: self.phone_number.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Specialist {
    pub id: SpecialistId,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub specialization: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Specialist {
    pub fn snapshot(&self) -> SpecialistSnapshot {
        SpecialistSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            specialization: self.specialization.clone(),
            email: self.email.clone(),
            phone: self.phone_number.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NewSpecialist {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub specialization: Option<String>,
}
