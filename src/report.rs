//! Terminal rendering of rankings and summaries.

use colored::*;
use std::collections::BTreeMap;
use std::fmt::Write;

use crate::service::AnglerReport;
use crate::stats::{SevenDayPeriod, WeekStats, YearSummary};

fn week_line(out: &mut String, rank: usize, week: &WeekStats) {
    let _ = writeln!(
        out,
        "  {}. {} – {}  {} fish  {} kg total  {} kg avg",
        rank,
        week.start_date,
        week.end_date,
        week.count.to_string().bright_green(),
        format!("{:.1}", week.total_weight),
        format!("{:.2}", week.average_weight).bright_cyan(),
    );
}

pub fn render_best_weeks_by_year(species: &str, by_year: &BTreeMap<i32, Vec<WeekStats>>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", format!("Best weeks for {}", species).bold());
    if by_year.is_empty() {
        let _ = writeln!(out, "  {}", "no in-season catches".dimmed());
    }
    for (year, weeks) in by_year {
        let _ = writeln!(out, "{}", year.to_string().bright_blue());
        for (i, week) in weeks.iter().enumerate() {
            week_line(&mut out, i + 1, week);
        }
    }
    out
}

pub fn render_best_weeks(species: &str, weeks: &[WeekStats]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", format!("Best weeks of all time for {}", species).bold());
    if weeks.iter().all(|w| w.count == 0) {
        let _ = writeln!(out, "  {}", "no in-season catches".dimmed());
        return out;
    }
    for (i, week) in weeks.iter().enumerate() {
        week_line(&mut out, i + 1, week);
    }
    out
}

pub fn render_rolling(species: &str, by_year: &BTreeMap<i32, Vec<SevenDayPeriod>>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", format!("Best rolling periods for {}", species).bold());
    for (year, periods) in by_year {
        let _ = writeln!(out, "{}", year.to_string().bright_blue());
        for (i, p) in periods.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {}. {} – {}  {} fish  {} kg avg",
                i + 1,
                p.start_date.format("%d.%m"),
                p.end_date.format("%d.%m"),
                p.count.to_string().bright_green(),
                format!("{:.2}", p.average_weight).bright_cyan(),
            );
        }
    }
    out
}

pub fn render_angler(report: &AnglerReport) -> String {
    let s = &report.angler_stats;
    let mut out = String::new();
    let _ = writeln!(out, "{}", report.name.bold());
    let _ = writeln!(
        out,
        "  {} fish  {:.1} kg total  {:.2} kg avg",
        s.count.to_string().bright_green(),
        s.total_weight,
        s.average_weight
    );
    for record in &report.data {
        let _ = writeln!(
            out,
            "  {}  {:>6.2} kg  {}",
            record.date.format("%Y-%m-%d"),
            record.weight,
            record.location.as_deref().unwrap_or("-").dimmed()
        );
    }
    out
}

pub fn render_yearly(species: &str, summaries: &[YearSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", format!("Yearly summary for {}", species).bold());
    let _ = writeln!(
        out,
        "  {:<6} {:>6} {:>10} {:>8} {:>8} {:>8}",
        "year", "fish", "total kg", "avg", "median", "max"
    );
    for y in summaries {
        let _ = writeln!(
            out,
            "  {:<6} {:>6} {:>10.1} {:>8.2} {:>8.2} {:>8.2}",
            y.year, y.count, y.total_weight, y.average_weight, y.median_weight, y.heaviest
        );
    }
    out
}
