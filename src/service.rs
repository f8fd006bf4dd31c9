//! Catch statistics service: ties a [`CatchStore`] to the stats pipeline.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::error::Result;
use crate::season::Season;
use crate::stats::{self, AnglerStats, SevenDayPeriod, WeekStats, YearSummary};
use crate::store::CatchStore;
use crate::{CatchRecord, Fish};

/// Tunables for the ranking pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSettings {
    pub season: Season,
    /// Days per bucket for season-calendar weeks.
    pub week_length: usize,
    /// Days per window for the rolling ranking.
    pub period_days: u32,
    /// How many buckets each ranking keeps.
    pub top_n: usize,
}

impl Default for StatsSettings {
    fn default() -> Self {
        StatsSettings {
            season: Season::default(),
            week_length: stats::DEFAULT_WEEK_LENGTH,
            period_days: stats::DEFAULT_WEEK_LENGTH as u32,
            top_n: stats::DEFAULT_TOP_N,
        }
    }
}

/// One angler's catches of a species together with their totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnglerReport {
    pub name: String,
    pub angler_stats: AnglerStats,
    pub data: Vec<CatchRecord>,
}

pub struct CatchService<S: CatchStore> {
    store: S,
    settings: StatsSettings,
}

impl<S: CatchStore> CatchService<S> {
    pub fn new(store: S, settings: StatsSettings) -> Self {
        CatchService { store, settings }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn save_all(&self, records: &[CatchRecord]) -> Result<Vec<CatchRecord>> {
        let saved = self.store.save_all(records)?;
        info!(count = saved.len(), "stored catch records");
        Ok(saved)
    }

    pub fn find_all(&self) -> Result<Vec<CatchRecord>> {
        self.store.find_all()
    }

    pub fn find_by_name(&self, name: &str) -> Result<Vec<CatchRecord>> {
        self.store.find_by_name(name)
    }

    /// Totals computed by the store, average derived here.
    pub fn angler_stats(&self, name: &str, species: &str) -> Result<AnglerStats> {
        let count = self.store.count_by_name_and_species(name, species)?;
        let total = self.store.total_weight_by_name_and_species(name, species)?;
        Ok(stats::angler_stats_from_totals(name, count, total))
    }

    pub fn find_by_name_and_species(&self, name: &str, species: &str) -> Result<AnglerReport> {
        let angler_stats = self.angler_stats(name, species)?;
        let data = self.store.find_by_name_and_species(name, species)?;
        Ok(AnglerReport {
            name: name.to_string(),
            angler_stats,
            data,
        })
    }

    fn species_records(&self, species: &str) -> Result<Vec<CatchRecord>> {
        let records = self.store.find_by_species(species)?;
        debug!(species, count = records.len(), "loaded records for ranking");
        Ok(records)
    }

    pub fn best_weeks_by_year(&self, species: &str) -> Result<BTreeMap<i32, Vec<WeekStats>>> {
        let records = self.species_records(species)?;
        let s = &self.settings;
        Ok(stats::best_weeks_by_year(&records, &s.season, s.week_length, s.top_n))
    }

    pub fn best_weeks_all_time(&self, species: &str) -> Result<Vec<WeekStats>> {
        let records = self.species_records(species)?;
        let s = &self.settings;
        Ok(stats::best_weeks_all_time(&records, &s.season, s.week_length, s.top_n))
    }

    pub fn best_rolling_periods(&self, species: &str) -> Result<BTreeMap<i32, Vec<SevenDayPeriod>>> {
        let records = self.species_records(species)?;
        Ok(stats::best_rolling_periods_by_year(
            &records,
            self.settings.period_days,
            self.settings.top_n,
        ))
    }

    pub fn yearly_summaries(&self, species: &str) -> Result<Vec<YearSummary>> {
        Ok(stats::yearly_summaries(&self.species_records(species)?))
    }

    /// Copy every stored catch record into the fish table.
    pub fn convert_data_to_fish(&self) -> Result<usize> {
        let records = self.store.find_all()?;
        for record in &records {
            self.store.save_fish(&Fish::from(record))?;
        }
        info!(count = records.len(), "converted catch records to fish");
        Ok(records.len())
    }
}
