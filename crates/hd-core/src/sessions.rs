use crate::error::HelpdeskError;
use crate::transitions::SessionPatch;
use crate::types::io::SessionFilter;
use crate::types::{HelpSession, HelpSessionId, NewHelpSession, SortOrder};

pub trait SessionRepository {
    fn create(&self, input: NewHelpSession) -> Result<HelpSession, HelpdeskError>;
    fn find(&self, id: &HelpSessionId) -> Result<Option<HelpSession>, HelpdeskError>;
    /// Results are ordered by creation time, ties broken by id.
    fn find_many(
        &self,
        filter: &SessionFilter,
        sort: SortOrder,
        skip: u64,
        limit: Option<u64>,
    ) -> Result<Vec<HelpSession>, HelpdeskError>;
    fn count(&self, filter: &SessionFilter) -> Result<u64, HelpdeskError>;
    fn update_by_id(
        &self,
        id: &HelpSessionId,
        patch: &SessionPatch,
    ) -> Result<HelpSession, HelpdeskError>;
    /// Returns `false` when no row matched.
    fn delete_by_id(&self, id: &HelpSessionId) -> Result<bool, HelpdeskError>;
}
