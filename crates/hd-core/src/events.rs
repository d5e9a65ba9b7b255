use crate::error::HelpdeskError;
use hd_events::types::EventRecord;

pub trait EventRepository {
    /// Assigns `id` and `seq`, then persists.
    fn append(&self, event: EventRecord) -> Result<EventRecord, HelpdeskError>;
    fn list(
        &self,
        after: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<EventRecord>, HelpdeskError>;
}
