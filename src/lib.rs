pub mod cli;
pub mod config;
pub mod error;
pub mod import;
pub mod report;
pub mod season;
pub mod service;
pub mod stats;
pub mod store;
pub mod web;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use error::{CatchLogError, Result};
pub use season::{DayKey, Season};
pub use service::{CatchService, StatsSettings};
pub use store::{CatchStore, MemoryStore, SqliteStore};

// ---------------------------------------------------------------------------
// CatchRecord — one scraped catch
// ---------------------------------------------------------------------------

/// A single fish as reported by the scraper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatchRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Angler name.
    pub name: String,
    pub species: String,
    /// Weight in kilograms.
    pub weight: f64,
    #[serde(alias = "localDate", with = "catch_date")]
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gear: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
}

impl CatchRecord {
    /// Minimal record; location, gear and zone left empty.
    pub fn new(name: &str, species: &str, weight: f64, date: NaiveDate) -> Self {
        CatchRecord {
            id: None,
            name: name.to_string(),
            species: species.to_string(),
            weight,
            date,
            location: None,
            gear: None,
            zone: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Fish — normalised copy of a CatchRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fish {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub species: String,
    pub weight: f64,
    #[serde(with = "catch_date")]
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gear: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
}

impl From<&CatchRecord> for Fish {
    fn from(record: &CatchRecord) -> Self {
        Fish {
            id: None,
            name: record.name.clone(),
            species: record.species.clone(),
            weight: record.weight,
            date: record.date,
            location: record.location.clone(),
            gear: record.gear.clone(),
            zone: record.zone.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Date parsing
// ---------------------------------------------------------------------------

/// Parse a catch date in ISO (`2022-06-18`) or scraped (`18.06.2022`) form.
pub fn parse_catch_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d.%m.%Y"))
        .map_err(|_| CatchLogError::InvalidDate(s.to_string()))
}

/// Serde adapter: lenient on input, ISO on output.
mod catch_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format("%Y-%m-%d"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_catch_date(&s).map_err(serde::de::Error::custom)
    }
}
