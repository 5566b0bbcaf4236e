//! Database schema migrations.
//!
//! Applied versions are recorded in a `_migrations` table so that opening
//! an existing cache file only runs what is new.

use super::Error;
use tokio_rusqlite::{Connection, params};

/// Migration list: (version, description, SQL).
///
/// Versions must be strictly increasing. Every script uses
/// `CREATE ... IF NOT EXISTS` so re-running one is harmless.
const MIGRATIONS: &[(i64, &str, &str)] =
    &[(1, "page cache table", include_str!("../../migrations/001_page_cache.sql"))];

/// Run any pending migrations.
///
/// # Errors
///
/// Returns [`Error::MigrationFailed`] if a migration script fails to execute,
/// or [`Error::Database`] if the version bookkeeping fails.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
            [],
        )?;

        let current: i64 =
            conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| row.get(0))?;

        for (version, description, sql) in MIGRATIONS {
            if *version <= current {
                continue;
            }

            conn.execute_batch(sql)
                .map_err(|e| Error::MigrationFailed(format!("{version} ({description}): {e}")))?;
            conn.execute(
                "INSERT INTO _migrations (version, applied_at) VALUES (?1, ?2)",
                params![version, chrono::Utc::now().to_rfc3339()],
            )?;
            tracing::debug!(version, description, "applied migration");
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}
