use crate::error::HelpdeskError;
use crate::types::{NewSpecialist, NewUser, Specialist, SpecialistId, User, UserId};

pub trait DirectoryRepository {
    fn get_user(&self, id: &UserId) -> Result<Option<User>, HelpdeskError>;
    fn get_specialist(&self, id: &SpecialistId) -> Result<Option<Specialist>, HelpdeskError>;
    fn add_user(&self, input: NewUser) -> Result<User, HelpdeskError>;
    fn add_specialist(&self, input: NewSpecialist) -> Result<Specialist, HelpdeskError>;
}
