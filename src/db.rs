use crate::config::Config;
use anyhow::Result;
use libsql::{Builder, Connection, Database as LibsqlDatabase};
use std::path::Path;
use std::time::Duration;

const SCHEMA: &str = include_str!("schema.sql");

/// Owns the libsql database and the single connection every request shares.
///
/// Opened once in `main` before the router is built and handed to handlers
/// through `AppState`; nothing in the crate keeps a global handle.
pub struct Database {
    db: LibsqlDatabase,
    conn: Connection,
    replica: bool,
}

impl Database {
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn is_replica(&self) -> bool {
        self.replica
    }

    /// Pushes pending local writes to the primary. No-op for a local file.
    pub async fn sync(&self) -> Result<()> {
        if self.replica {
            self.db
                .sync()
                .await
                .map_err(|e| anyhow::anyhow!("sync failed: {}", e))?;
        }
        Ok(())
    }

    pub async fn new(cfg: &Config, data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(cfg.app.get_db());

        let (db, replica) = match cfg.app.replica_credentials() {
            Some((url, token)) => {
                tracing::info!("[db] running in synced database mode (offline writes)");
                let sync_interval = Duration::from_secs(cfg.app.sync_interval_seconds);
                let db = Builder::new_synced_database(&path, url.to_string(), token.to_string())
                    .sync_interval(sync_interval)
                    .build()
                    .await?;
                (db, true)
            }
            None => {
                tracing::info!(path = ?path, "[db] running in local mode");
                (Builder::new_local(&path).build().await?, false)
            }
        };

        Self::open(db, replica).await
    }

    pub async fn open_in_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:").build().await?;
        Self::open(db, false).await
    }

    async fn open(db: LibsqlDatabase, replica: bool) -> Result<Self> {
        let conn = db.connect()?;
        conn.query("SELECT 1", ()).await?;

        conn.execute_batch(SCHEMA)
            .await
            .map_err(|e| anyhow::anyhow!("failed to apply schema: {e}"))?;

        Ok(Database { db, conn, replica })
    }
}
