//! Database schema migrations.

use rusqlite::Connection;
use tracing::info;

use cafehunter_core::error::CafeHunterError;

/// Run all pending database migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), CafeHunterError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| CafeHunterError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| {
            CafeHunterError::Storage(format!("Failed to query migration version: {}", e))
        })?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: cafes");
    }

    Ok(())
}

/// Version 1: cafes keyed by id with a geohash index for prefix scans.
fn apply_v1(conn: &Connection) -> Result<(), CafeHunterError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS cafes (
            id              TEXT PRIMARY KEY NOT NULL,
            name            TEXT NOT NULL,
            city            TEXT NOT NULL DEFAULT '',
            address         TEXT NOT NULL DEFAULT '',
            url             TEXT NOT NULL DEFAULT '',
            latitude        REAL NOT NULL CHECK (latitude BETWEEN -90 AND 90),
            longitude       REAL NOT NULL CHECK (longitude BETWEEN -180 AND 180),
            geohash         TEXT NOT NULL,
            tasty           REAL NOT NULL DEFAULT 0 CHECK (tasty BETWEEN 0 AND 5),
            wifi            REAL NOT NULL DEFAULT 0 CHECK (wifi BETWEEN 0 AND 5),
            quiet           REAL NOT NULL DEFAULT 0 CHECK (quiet BETWEEN 0 AND 5),
            cheap           REAL NOT NULL DEFAULT 0 CHECK (cheap BETWEEN 0 AND 5),
            seat            REAL NOT NULL DEFAULT 0 CHECK (seat BETWEEN 0 AND 5),
            music           REAL NOT NULL DEFAULT 0 CHECK (music BETWEEN 0 AND 5),
            time_limited    TEXT NOT NULL DEFAULT '',
            plug            TEXT NOT NULL DEFAULT '',
            imported_at     INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_cafes_geohash
            ON cafes (geohash);

        INSERT INTO schema_migrations (version, name) VALUES (1, 'cafes');
        ",
    )
    .map_err(|e| CafeHunterError::Storage(format!("Migration v1 failed: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(versions, 1);
    }

    #[test]
    fn test_geohash_index_exists() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let name: String = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'index' AND tbl_name = 'cafes'
                 AND name = 'idx_cafes_geohash'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(name, "idx_cafes_geohash");
    }

    #[test]
    fn test_rating_check_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO cafes (id, name, latitude, longitude, geohash, wifi)
             VALUES ('x', 'X', 25.0, 121.5, 'wsqq', 7.0)",
            [],
        );
        assert!(result.is_err());
    }
}
