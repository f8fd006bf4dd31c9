//! Catch record storage.
//!
//! [`CatchStore`] is the seam between the statistics service and wherever
//! records live. [`MemoryStore`] backs tests and one-shot CLI runs;
//! [`SqliteStore`] persists to a file.

use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::error::{CatchLogError, Result};
use crate::{parse_catch_date, CatchRecord, Fish};

/// Query surface the service needs from a repository.
pub trait CatchStore: Send + Sync {
    /// Persist records, returning them with ids assigned.
    fn save_all(&self, records: &[CatchRecord]) -> Result<Vec<CatchRecord>>;
    fn find_all(&self) -> Result<Vec<CatchRecord>>;
    fn find_by_name(&self, name: &str) -> Result<Vec<CatchRecord>>;
    fn find_by_species(&self, species: &str) -> Result<Vec<CatchRecord>>;
    fn find_by_name_and_species(&self, name: &str, species: &str) -> Result<Vec<CatchRecord>>;
    fn count_by_name_and_species(&self, name: &str, species: &str) -> Result<usize>;
    fn total_weight_by_name_and_species(&self, name: &str, species: &str) -> Result<f64>;
    fn save_fish(&self, fish: &Fish) -> Result<Fish>;
    fn find_all_fish(&self) -> Result<Vec<Fish>>;
}

fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    m.lock().map_err(|_| CatchLogError::Poisoned)
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<CatchRecord>>,
    fish: Mutex<Vec<Fish>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn select(&self, pred: impl Fn(&CatchRecord) -> bool) -> Result<Vec<CatchRecord>> {
        Ok(lock(&self.records)?.iter().filter(|r| pred(r)).cloned().collect())
    }
}

impl CatchStore for MemoryStore {
    fn save_all(&self, records: &[CatchRecord]) -> Result<Vec<CatchRecord>> {
        let mut stored = lock(&self.records)?;
        let mut saved = Vec::with_capacity(records.len());
        for record in records {
            let mut record = record.clone();
            record.id = Some(stored.len() as i64 + 1);
            stored.push(record.clone());
            saved.push(record);
        }
        Ok(saved)
    }

    fn find_all(&self) -> Result<Vec<CatchRecord>> {
        self.select(|_| true)
    }

    fn find_by_name(&self, name: &str) -> Result<Vec<CatchRecord>> {
        self.select(|r| r.name == name)
    }

    fn find_by_species(&self, species: &str) -> Result<Vec<CatchRecord>> {
        self.select(|r| r.species == species)
    }

    fn find_by_name_and_species(&self, name: &str, species: &str) -> Result<Vec<CatchRecord>> {
        self.select(|r| r.name == name && r.species == species)
    }

    fn count_by_name_and_species(&self, name: &str, species: &str) -> Result<usize> {
        Ok(self.find_by_name_and_species(name, species)?.len())
    }

    fn total_weight_by_name_and_species(&self, name: &str, species: &str) -> Result<f64> {
        Ok(self
            .find_by_name_and_species(name, species)?
            .iter()
            .map(|r| r.weight)
            .sum())
    }

    fn save_fish(&self, fish: &Fish) -> Result<Fish> {
        let mut stored = lock(&self.fish)?;
        let mut fish = fish.clone();
        fish.id = Some(stored.len() as i64 + 1);
        stored.push(fish.clone());
        Ok(fish)
    }

    fn find_all_fish(&self) -> Result<Vec<Fish>> {
        Ok(lock(&self.fish)?.clone())
    }
}

// ---------------------------------------------------------------------------
// SqliteStore
// ---------------------------------------------------------------------------

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS catch_data (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    name     TEXT NOT NULL,
    species  TEXT NOT NULL,
    weight   REAL NOT NULL,
    date     TEXT NOT NULL,
    location TEXT,
    gear     TEXT,
    zone     TEXT
);
CREATE INDEX IF NOT EXISTS idx_catch_data_species ON catch_data (species);
CREATE INDEX IF NOT EXISTS idx_catch_data_name_species ON catch_data (name, species);
CREATE TABLE IF NOT EXISTS fish (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    name     TEXT NOT NULL,
    species  TEXT NOT NULL,
    weight   REAL NOT NULL,
    date     TEXT NOT NULL,
    location TEXT,
    gear     TEXT,
    zone     TEXT
);
"#;

const RECORD_COLUMNS: &str = "id, name, species, weight, date, location, gear, zone";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening sqlite store");
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn query_records(&self, where_clause: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<CatchRecord>> {
        let conn = lock(&self.conn)?;
        let sql = format!(
            "SELECT {} FROM catch_data {} ORDER BY date, id",
            RECORD_COLUMNS, where_clause
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(args, row_to_record)?;
        rows.map(|row| -> Result<CatchRecord> { row? })
            .collect::<Result<Vec<_>>>()
    }
}

type RowFields = (i64, String, String, f64, String, Option<String>, Option<String>, Option<String>);

fn row_fields(row: &Row<'_>) -> rusqlite::Result<RowFields> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

/// Dates are stored as ISO text; a bad value surfaces as `InvalidDate`
/// instead of aborting the whole query inside rusqlite.
fn row_to_record(row: &Row<'_>) -> rusqlite::Result<Result<CatchRecord>> {
    let (id, name, species, weight, date, location, gear, zone) = row_fields(row)?;
    Ok(parse_catch_date(&date).map(|date| CatchRecord {
        id: Some(id),
        name,
        species,
        weight,
        date,
        location,
        gear,
        zone,
    }))
}

fn row_to_fish(row: &Row<'_>) -> rusqlite::Result<Result<Fish>> {
    let (id, name, species, weight, date, location, gear, zone) = row_fields(row)?;
    Ok(parse_catch_date(&date).map(|date| Fish {
        id: Some(id),
        name,
        species,
        weight,
        date,
        location,
        gear,
        zone,
    }))
}

impl CatchStore for SqliteStore {
    fn save_all(&self, records: &[CatchRecord]) -> Result<Vec<CatchRecord>> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;
        let mut saved = Vec::with_capacity(records.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO catch_data (name, species, weight, date, location, gear, zone)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for record in records {
                stmt.execute(params![
                    record.name,
                    record.species,
                    record.weight,
                    record.date.format("%Y-%m-%d").to_string(),
                    record.location,
                    record.gear,
                    record.zone,
                ])?;
                let mut record = record.clone();
                record.id = Some(tx.last_insert_rowid());
                saved.push(record);
            }
        }
        tx.commit()?;
        debug!(count = saved.len(), "saved catch records");
        Ok(saved)
    }

    fn find_all(&self) -> Result<Vec<CatchRecord>> {
        self.query_records("", &[])
    }

    fn find_by_name(&self, name: &str) -> Result<Vec<CatchRecord>> {
        self.query_records("WHERE name = ?1", &[&name])
    }

    fn find_by_species(&self, species: &str) -> Result<Vec<CatchRecord>> {
        self.query_records("WHERE species = ?1", &[&species])
    }

    fn find_by_name_and_species(&self, name: &str, species: &str) -> Result<Vec<CatchRecord>> {
        self.query_records("WHERE name = ?1 AND species = ?2", &[&name, &species])
    }

    fn count_by_name_and_species(&self, name: &str, species: &str) -> Result<usize> {
        let conn = lock(&self.conn)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM catch_data WHERE name = ?1 AND species = ?2",
            params![name, species],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn total_weight_by_name_and_species(&self, name: &str, species: &str) -> Result<f64> {
        let conn = lock(&self.conn)?;
        let total: f64 = conn.query_row(
            "SELECT COALESCE(SUM(weight), 0.0) FROM catch_data WHERE name = ?1 AND species = ?2",
            params![name, species],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    fn save_fish(&self, fish: &Fish) -> Result<Fish> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO fish (name, species, weight, date, location, gear, zone)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                fish.name,
                fish.species,
                fish.weight,
                fish.date.format("%Y-%m-%d").to_string(),
                fish.location,
                fish.gear,
                fish.zone,
            ],
        )?;
        let mut fish = fish.clone();
        fish.id = Some(conn.last_insert_rowid());
        Ok(fish)
    }

    fn find_all_fish(&self) -> Result<Vec<Fish>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM fish ORDER BY date, id",
            RECORD_COLUMNS
        ))?;
        let rows = stmt.query_map([], row_to_fish)?;
        rows.map(|row| -> Result<Fish> { row? })
            .collect::<Result<Vec<_>>>()
    }
}
