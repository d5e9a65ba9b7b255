use hd_core::error::HelpdeskError;
use hd_core::store::Store;
use rusqlite::Connection;

use crate::directory_repo::DirectoryRepo;
use crate::event_repo::EventRepo;
use crate::session_repo::SessionRepo;

pub struct DbStore {
    conn: Connection,
}

impl DbStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Store for DbStore {
    type Sessions<'a>
        = SessionRepo<'a>
    where
        Self: 'a;
    type Directory<'a>
        = DirectoryRepo<'a>
    where
        Self: 'a;
    type Events<'a>
        = EventRepo<'a>
    where
        Self: 'a;

    fn sessions(&self) -> Self::Sessions<'_> {
        SessionRepo::new(&self.conn)
    }

    fn directory(&self) -> Self::Directory<'_> {
        DirectoryRepo::new(&self.conn)
    }

    fn events(&self) -> Self::Events<'_> {
        EventRepo::new(&self.conn)
    }

    fn with_tx<F, T>(&self, f: F) -> Result<T, HelpdeskError>
    where
        F: FnOnce(&Self) -> Result<T, HelpdeskError>,
    {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(HelpdeskError::internal)?;
        match f(self) {
            Ok(value) => {
                self.conn
                    .execute_batch("COMMIT")
                    .map_err(HelpdeskError::internal)?;
                Ok(value)
            }
            Err(err) => {
                self.conn
                    .execute_batch("ROLLBACK")
                    .map_err(HelpdeskError::internal)?;
                Err(err)
            }
        }
    }
}
