use deadpool::managed::{self, Pool, RecycleError, RecycleResult};
use libsql::{Builder, Connection, Database, Error as LibsqlError};

use crate::database::error::Result;

/// deadpool manager handing out connections to one libsql database
pub struct LibsqlManager {
    database: Database,
}

impl LibsqlManager {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

impl managed::Manager for LibsqlManager {
    type Type = Connection;
    type Error = LibsqlError;

    async fn create(&self) -> Result<Self::Type, Self::Error> {
        let conn = self.database.connect()?;
        // Writers wait for the lock instead of failing with SQLITE_BUSY, and
        // readers never block the writer.
        for pragma in ["PRAGMA busy_timeout = 5000", "PRAGMA journal_mode = WAL"] {
            // Both pragmas answer with a row; stepping it is what applies them.
            conn.query(pragma, ()).await?.next().await?;
        }
        Ok(conn)
    }

    async fn recycle(
        &self,
        conn: &mut Self::Type,
        _: &managed::Metrics,
    ) -> RecycleResult<Self::Error> {
        let mut rows = conn.query("SELECT 1", ()).await?;
        match rows.next().await? {
            Some(_) => Ok(()),
            None => Err(RecycleError::Message("connection health check returned no rows".into())),
        }
    }
}

pub type LibsqlPool = Pool<LibsqlManager>;

/// Open (creating if needed) a local database file and build a pool over it
pub async fn open_pool(path: &str, max_size: usize) -> Result<LibsqlPool> {
    let database = Builder::new_local(path).build().await?;
    let pool = Pool::builder(LibsqlManager::new(database)).max_size(max_size).build()?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_connections_use_wal_and_busy_timeout() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let pool = open_pool(dir.path().join("pool.db").to_string_lossy().as_ref(), 2).await?;
        let conn = pool.get().await?;

        let mode = conn.query("PRAGMA journal_mode", ()).await?.next().await?.expect("journal mode row");
        assert_eq!(mode.get::<String>(0)?.to_lowercase(), "wal");

        let timeout = conn.query("PRAGMA busy_timeout", ()).await?.next().await?.expect("busy timeout row");
        assert_eq!(timeout.get::<i64>(0)?, 5000);

        Ok(())
    }
}
