use crate::directory::DirectoryRepository;
use crate::events::EventRepository;
use crate::sessions::SessionRepository;
use crate::HelpdeskError;

pub trait Store {
    type Sessions<'a>: SessionRepository
    where
        Self: 'a;
    type Directory<'a>: DirectoryRepository
    where
        Self: 'a;
    type Events<'a>: EventRepository
    where
        Self: 'a;

    fn sessions(&self) -> Self::Sessions<'_>;
    fn directory(&self) -> Self::Directory<'_>;
    fn events(&self) -> Self::Events<'_>;

    fn with_tx<F, T>(&self, f: F) -> Result<T, HelpdeskError>
    where
        F: FnOnce(&Self) -> Result<T, HelpdeskError>;
}
