pub mod directory;
pub mod error;
pub mod events;
pub mod helpdesk;
pub mod policy;
pub mod sessions;
pub mod store;
pub mod transitions;
pub mod validation;

pub mod types;

pub use crate::error::HelpdeskError;
pub use crate::helpdesk::{Helpdesk, RequestContext};
pub use crate::store::Store;
