//! # Catch statistics pipeline
//!
//! ## Responsibility
//! Turn a flat list of catch records into the aggregates shown to anglers:
//! the best weeks of each season, per-angler totals, and yearly summaries.
//!
//! The best-weeks pipeline runs in fixed stages:
//!
//! 1. [`filter_in_season`] drops catches outside the [`Season`] window.
//! 2. [`group_by_year`] splits the remainder per year (for per-year ranking).
//! 3. [`group_by_day_and_month`] buckets catches onto the season calendar,
//!    with every season day present even when nothing was caught.
//! 4. [`daily_stats`] reduces each bucket to a [`DayStats`].
//! 5. [`weekly_stats`] walks the day list in `week_length` chunks.
//! 6. [`best_weeks`] ranks chunks by fish count and keeps the top `n`.
//!
//! [`best_rolling_periods_by_year`] is the date-anchored alternative: windows
//! start at the first catch of the year instead of the season start.
//!
//! ## Guarantees
//! - Deterministic: all groupings use ordered maps; ranking is a stable sort
//! - Non-panicking: every average is guarded against a zero count

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::season::{DayKey, Season};
use crate::CatchRecord;

/// Days per bucket unless configured otherwise.
pub const DEFAULT_WEEK_LENGTH: usize = 7;
/// How many weeks a ranking keeps unless configured otherwise.
pub const DEFAULT_TOP_N: usize = 3;

// ---------------------------------------------------------------------------
// Aggregate types
// ---------------------------------------------------------------------------

/// Catches landed on one calendar day of the season.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStats {
    pub date: DayKey,
    pub fish_count: usize,
    pub total_weight: f64,
    pub average_weight: f64,
}

/// One `week_length` chunk of the season calendar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekStats {
    pub start_date: DayKey,
    pub end_date: DayKey,
    pub count: usize,
    pub total_weight: f64,
    /// Rounded to two decimals.
    pub average_weight: f64,
}

/// A date-anchored window, used by the rolling ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SevenDayPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub count: usize,
    pub total_weight: f64,
    pub average_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnglerStats {
    pub name: String,
    pub count: usize,
    pub total_weight: f64,
    pub average_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearSummary {
    pub year: i32,
    pub count: usize,
    pub total_weight: f64,
    pub average_weight: f64,
    pub median_weight: f64,
    pub heaviest: f64,
}

// ---------------------------------------------------------------------------
// Small numeric helpers
// ---------------------------------------------------------------------------

/// Round half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn average(total: f64, count: usize) -> f64 {
    if count > 0 {
        total / count as f64
    } else {
        0.0
    }
}

/// Median of `values`; the mean of the two middle values for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Keep only catches whose month/day lies inside `season`.
pub fn filter_in_season<'a>(records: &'a [CatchRecord], season: &Season) -> Vec<&'a CatchRecord> {
    records.iter().filter(|r| season.contains(r.date)).collect()
}

/// Split catches per year. Input order is kept within each year.
pub fn group_by_year<'a>(records: &[&'a CatchRecord]) -> BTreeMap<i32, Vec<&'a CatchRecord>> {
    let mut by_year: BTreeMap<i32, Vec<&'a CatchRecord>> = BTreeMap::new();
    for record in records {
        by_year.entry(record.date.year()).or_default().push(*record);
    }
    by_year
}

/// Bucket catches by calendar day. Every day of the season gets a bucket,
/// empty or not; catches outside the season calendar are ignored.
pub fn group_by_day_and_month<'a>(
    records: &[&'a CatchRecord],
    season: &Season,
) -> BTreeMap<DayKey, Vec<&'a CatchRecord>> {
    let mut by_day: BTreeMap<DayKey, Vec<&'a CatchRecord>> = season
        .calendar()
        .into_iter()
        .map(|day| (day, Vec::new()))
        .collect();

    for record in records {
        if let Some(bucket) = by_day.get_mut(&DayKey::of(record.date)) {
            bucket.push(*record);
        }
    }
    by_day
}

// ---------------------------------------------------------------------------
// Reduction
// ---------------------------------------------------------------------------

pub fn day_stats(date: DayKey, records: &[&CatchRecord]) -> DayStats {
    let fish_count = records.len();
    let total_weight: f64 = records.iter().map(|r| r.weight).sum();
    DayStats {
        date,
        fish_count,
        total_weight,
        average_weight: average(total_weight, fish_count),
    }
}

/// One [`DayStats`] per bucket, in calendar order.
pub fn daily_stats(by_day: &BTreeMap<DayKey, Vec<&CatchRecord>>) -> Vec<DayStats> {
    by_day
        .iter()
        .map(|(day, records)| day_stats(*day, records))
        .collect()
}

/// Aggregate consecutive days into chunks of `week_length`. The final chunk
/// holds whatever days remain and may be shorter.
pub fn weekly_stats(days: &[DayStats], week_length: usize) -> Vec<WeekStats> {
    if week_length == 0 {
        return Vec::new();
    }

    days.chunks(week_length)
        .map(|week| {
            let count: usize = week.iter().map(|d| d.fish_count).sum();
            let total_weight: f64 = week.iter().map(|d| d.total_weight).sum();
            // chunks() never yields an empty slice.
            let start_date = week[0].date;
            let end_date = week[week.len() - 1].date;
            WeekStats {
                start_date,
                end_date,
                count,
                total_weight,
                average_weight: round2(average(total_weight, count)),
            }
        })
        .collect()
}

/// Rank by fish count, highest first, and keep `top_n`. Ties keep their
/// calendar order.
pub fn best_weeks(mut weeks: Vec<WeekStats>, top_n: usize) -> Vec<WeekStats> {
    weeks.sort_by(|a, b| b.count.cmp(&a.count));
    weeks.truncate(top_n);
    weeks
}

fn rank_weeks(records: &[&CatchRecord], season: &Season, week_length: usize, top_n: usize) -> Vec<WeekStats> {
    let by_day = group_by_day_and_month(records, season);
    best_weeks(weekly_stats(&daily_stats(&by_day), week_length), top_n)
}

// ---------------------------------------------------------------------------
// Rankings
// ---------------------------------------------------------------------------

/// Best weeks of each year, keyed by year ascending. Years without a single
/// in-season catch are absent.
pub fn best_weeks_by_year(
    records: &[CatchRecord],
    season: &Season,
    week_length: usize,
    top_n: usize,
) -> BTreeMap<i32, Vec<WeekStats>> {
    let in_season = filter_in_season(records, season);
    group_by_year(&in_season)
        .into_iter()
        .map(|(year, catches)| (year, rank_weeks(&catches, season, week_length, top_n)))
        .collect()
}

/// Best weeks with every year pooled onto one season calendar.
pub fn best_weeks_all_time(
    records: &[CatchRecord],
    season: &Season,
    week_length: usize,
    top_n: usize,
) -> Vec<WeekStats> {
    let in_season = filter_in_season(records, season);
    rank_weeks(&in_season, season, week_length, top_n)
}

/// Consecutive `period_days` windows from the first to the last catch date.
/// Dates with no catches contribute nothing; a window past the last catch is
/// never opened.
pub fn rolling_periods(records: &[&CatchRecord], period_days: u32) -> Vec<SevenDayPeriod> {
    if period_days == 0 || records.is_empty() {
        return Vec::new();
    }

    let mut by_date: BTreeMap<NaiveDate, (usize, f64)> = BTreeMap::new();
    for record in records {
        let entry = by_date.entry(record.date).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += record.weight;
    }

    let (Some(first), Some(last)) = (
        by_date.keys().next().copied(),
        by_date.keys().next_back().copied(),
    ) else {
        return Vec::new();
    };

    let step = Duration::days(i64::from(period_days));
    let span = Duration::days(i64::from(period_days) - 1);
    let mut periods = Vec::new();
    let mut start = first;
    while start <= last {
        let end = start + span;
        let (count, total_weight) = by_date
            .range(start..=end)
            .fold((0usize, 0.0f64), |(c, w), (_, (dc, dw))| (c + dc, w + dw));
        periods.push(SevenDayPeriod {
            start_date: start,
            end_date: end,
            count,
            total_weight,
            average_weight: average(total_weight, count),
        });
        start += step;
    }
    periods
}

/// Best date-anchored windows per year. No season filter is applied.
pub fn best_rolling_periods_by_year(
    records: &[CatchRecord],
    period_days: u32,
    top_n: usize,
) -> BTreeMap<i32, Vec<SevenDayPeriod>> {
    let all: Vec<&CatchRecord> = records.iter().collect();
    group_by_year(&all)
        .into_iter()
        .map(|(year, catches)| {
            let mut periods = rolling_periods(&catches, period_days);
            periods.sort_by(|a, b| b.count.cmp(&a.count));
            periods.truncate(top_n);
            (year, periods)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Angler and yearly summaries
// ---------------------------------------------------------------------------

/// Derive angler stats from a pre-computed count and total.
pub fn angler_stats_from_totals(name: &str, count: usize, total_weight: f64) -> AnglerStats {
    AnglerStats {
        name: name.to_string(),
        count,
        total_weight,
        average_weight: average(total_weight, count),
    }
}

/// Stats over `records`, which the caller has already narrowed to one angler.
pub fn angler_stats(name: &str, records: &[CatchRecord]) -> AnglerStats {
    let total: f64 = records.iter().map(|r| r.weight).sum();
    angler_stats_from_totals(name, records.len(), total)
}

pub fn yearly_summaries(records: &[CatchRecord]) -> Vec<YearSummary> {
    let all: Vec<&CatchRecord> = records.iter().collect();
    group_by_year(&all)
        .into_iter()
        .map(|(year, catches)| {
            let weights: Vec<f64> = catches.iter().map(|r| r.weight).collect();
            let total_weight: f64 = weights.iter().sum();
            YearSummary {
                year,
                count: weights.len(),
                total_weight,
                average_weight: round2(average(total_weight, weights.len())),
                median_weight: median(&weights).unwrap_or(0.0),
                heaviest: weights.iter().copied().fold(0.0, f64::max),
            }
        })
        .collect()
}
