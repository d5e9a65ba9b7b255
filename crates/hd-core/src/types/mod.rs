pub mod actor;
pub mod directory;
pub mod enums;
pub mod event;
pub mod ids;
pub mod io;
pub mod session;

pub use actor::Actor;
pub use directory::{NewSpecialist, NewUser, Specialist, User};
pub use enums::{SessionStatus, SessionType, SortOrder};
pub use event::EventBody;
pub use ids::{AccountId, HelpSessionId, IdError, SpecialistId, UserId};
pub use session::{
    CompletedByPeriod, HelpSession, NewHelpSession, SessionStatusRow, SessionSummary,
    SpecialistSnapshot, UserSnapshot,
};
