//! SQLite-backed cafe repository.
//!
//! Cafes are written once by the importer and afterwards only read through
//! geohash prefix range scans.

use std::sync::Arc;

use rusqlite::OptionalExtension;

use cafehunter_core::error::CafeHunterError;
use cafehunter_core::types::{Cafe, CafeRatings, Coordinate};
use cafehunter_spatial::{prefix_upper_bound, SpatialError, SpatialStore};

use crate::db::Database;

const CAFE_COLUMNS: &str = "id, name, city, address, url, latitude, longitude, geohash,
     tasty, wifi, quiet, cheap, seat, music, time_limited, plug";

/// Repository for cafe records.
#[derive(Clone)]
pub struct CafeRepository {
    db: Arc<Database>,
}

impl CafeRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a cafe, replacing any existing row with the same id.
    pub fn save(&self, cafe: &Cafe) -> Result<(), CafeHunterError> {
        self.db.with_conn(|conn| insert_cafe(conn, cafe))
    }

    /// Insert many cafes in a single transaction.
    pub fn save_all(&self, cafes: &[Cafe]) -> Result<usize, CafeHunterError> {
        self.db.with_conn(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| CafeHunterError::Storage(format!("Failed to begin import: {}", e)))?;
            for cafe in cafes {
                insert_cafe(&tx, cafe)?;
            }
            tx.commit()
                .map_err(|e| CafeHunterError::Storage(format!("Failed to commit import: {}", e)))?;
            Ok(cafes.len())
        })
    }

    /// Find a cafe by id.
    pub fn find_by_id(&self, id: &str) -> Result<Option<Cafe>, CafeHunterError> {
        self.db.with_conn(|conn| {
            let sql = format!("SELECT {} FROM cafes WHERE id = ?1", CAFE_COLUMNS);
            conn.query_row(&sql, rusqlite::params![id], row_to_cafe)
                .optional()
                .map_err(|e| CafeHunterError::Storage(e.to_string()))
        })
    }

    /// All cafes whose geohash starts with `prefix`, ordered by geohash.
    pub fn find_by_geohash_prefix(&self, prefix: &str) -> Result<Vec<Cafe>, CafeHunterError> {
        self.db.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM cafes
                 WHERE geohash >= ?1 AND geohash <= ?2
                 ORDER BY geohash, id",
                CAFE_COLUMNS
            );
            let upper = prefix_upper_bound(prefix);
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| CafeHunterError::Storage(e.to_string()))?;
            let rows = stmt
                .query_map(rusqlite::params![prefix, upper], row_to_cafe)
                .map_err(|e| CafeHunterError::Storage(e.to_string()))?;

            let mut cafes = Vec::new();
            for row in rows {
                cafes.push(row.map_err(|e| CafeHunterError::Storage(e.to_string()))?);
            }
            Ok(cafes)
        })
    }

    /// Total number of stored cafes.
    pub fn count(&self) -> Result<u64, CafeHunterError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM cafes", [], |row| row.get(0))
                .map_err(|e| CafeHunterError::Storage(e.to_string()))?;
            Ok(count as u64)
        })
    }
}

impl SpatialStore for CafeRepository {
    fn cafes_with_prefix(&self, prefix: &str) -> Result<Vec<Cafe>, SpatialError> {
        Ok(self.find_by_geohash_prefix(prefix)?)
    }
}

fn insert_cafe(conn: &rusqlite::Connection, cafe: &Cafe) -> Result<(), CafeHunterError> {
    conn.execute(
        "INSERT OR REPLACE INTO cafes (id, name, city, address, url, latitude, longitude, geohash,
             tasty, wifi, quiet, cheap, seat, music, time_limited, plug)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        rusqlite::params![
            cafe.id,
            cafe.name,
            cafe.city,
            cafe.address,
            cafe.url,
            cafe.location.latitude,
            cafe.location.longitude,
            cafe.geohash,
            cafe.ratings.tasty,
            cafe.ratings.wifi,
            cafe.ratings.quiet,
            cafe.ratings.cheap,
            cafe.ratings.seat,
            cafe.ratings.music,
            cafe.time_limited,
            cafe.plug,
        ],
    )
    .map_err(|e| CafeHunterError::Storage(format!("Failed to save cafe {}: {}", cafe.id, e)))?;
    Ok(())
}

fn row_to_cafe(row: &rusqlite::Row<'_>) -> rusqlite::Result<Cafe> {
    Ok(Cafe {
        id: row.get(0)?,
        name: row.get(1)?,
        city: row.get(2)?,
        address: row.get(3)?,
        url: row.get(4)?,
        location: Coordinate::new(row.get(5)?, row.get(6)?),
        geohash: row.get(7)?,
        ratings: CafeRatings {
            tasty: row.get(8)?,
            wifi: row.get(9)?,
            quiet: row.get(10)?,
            cheap: row.get(11)?,
            seat: row.get(12)?,
            music: row.get(13)?,
        },
        time_limited: row.get(14)?,
        plug: row.get(15)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> CafeRepository {
        CafeRepository::new(Arc::new(Database::in_memory().unwrap()))
    }

    fn cafe(id: &str, geohash: &str) -> Cafe {
        Cafe {
            id: id.to_string(),
            name: format!("Cafe {}", id),
            city: "taipei".to_string(),
            address: "No. 1, Zhongxiao W. Rd.".to_string(),
            url: format!("https://example.com/{}", id),
            location: Coordinate::new(25.0421, 121.5074),
            geohash: geohash.to_string(),
            ratings: CafeRatings {
                tasty: 4.5,
                wifi: 3.0,
                quiet: 2.5,
                cheap: 4.0,
                seat: 3.5,
                music: 4.0,
            },
            time_limited: "no".to_string(),
            plug: "yes".to_string(),
        }
    }

    #[test]
    fn test_save_and_find_by_id() {
        let repo = repo();
        let original = cafe("a", "wsqqkyyb");
        repo.save(&original).unwrap();

        let loaded = repo.find_by_id("a").unwrap().unwrap();
        assert_eq!(loaded, original);
        assert!(repo.find_by_id("missing").unwrap().is_none());
    }

    #[test]
    fn test_save_replaces_existing_id() {
        let repo = repo();
        repo.save(&cafe("a", "wsqqkyyb")).unwrap();
        let mut updated = cafe("a", "wsqqkyyb");
        updated.name = "Renamed".to_string();
        repo.save(&updated).unwrap();

        assert_eq!(repo.count().unwrap(), 1);
        assert_eq!(repo.find_by_id("a").unwrap().unwrap().name, "Renamed");
    }

    #[test]
    fn test_prefix_range_scan() {
        let repo = repo();
        repo.save_all(&[
            cafe("a", "wsqqkyyb"),
            cafe("b", "wsqqkyzz"),
            cafe("c", "wsqqkz00"),
            cafe("d", "wsqqkx99"),
        ])
        .unwrap();

        let ids: Vec<String> = repo
            .find_by_geohash_prefix("wsqqky")
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);

        assert_eq!(repo.find_by_geohash_prefix("wsqqk").unwrap().len(), 4);
        assert!(repo.find_by_geohash_prefix("wsqqm").unwrap().is_empty());
    }

    #[test]
    fn test_spatial_store_impl_matches_repository() {
        let repo = repo();
        repo.save(&cafe("a", "wsqqkyyb")).unwrap();
        let store: &dyn SpatialStore = &repo;
        assert_eq!(store.cafes_with_prefix("wsqqky").unwrap().len(), 1);
    }

    #[test]
    fn test_save_all_is_atomic() {
        let repo = repo();
        let mut bad = cafe("bad", "wsqqkyyb");
        bad.ratings.wifi = 9.0;
        let result = repo.save_all(&[cafe("a", "wsqqkyyb"), bad]);
        assert!(result.is_err());
        assert_eq!(repo.count().unwrap(), 0);
    }
}
