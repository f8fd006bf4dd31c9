//! Tests for the service over a file-backed SQLite store — import, reopen,
//! angler reports, rankings and fish conversion.

use catch_log::import::read_records;
use catch_log::{CatchService, CatchStore, SqliteStore, StatsSettings};
use std::io::Write;

const SCRAPED: &str = r#"
{"name":"Ola","species":"Laks","weight":4.5,"date":"18.06.2022","location":"Gaula","gear":"Flue","zone":"Sone 1"}
{"name":"Ola","species":"Laks","weight":7.0,"date":"19.06.2022","location":"Gaula"}
{"name":"Kari","species":"Laks","weight":12.2,"date":"20.06.2022","location":"Orkla"}
{"name":"Kari","species":"Sjøørret","weight":1.1,"date":"21.06.2022"}
{"name":"Ola","species":"Laks","weight":3.3,"date":"10.07.2023"}
{"name":"Ola","species":"Laks","weight":2.0,"date":"19.05.2022"}
"#;

fn write_scraped(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("scraped.jsonl");
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(SCRAPED.as_bytes()).unwrap();
    path
}

fn imported_service(dir: &tempfile::TempDir) -> CatchService<SqliteStore> {
    let store = SqliteStore::open(dir.path().join("catches.db")).unwrap();
    let service = CatchService::new(store, StatsSettings::default());
    let records = read_records(write_scraped(dir)).unwrap();
    service.save_all(&records).unwrap();
    service
}

#[test]
fn test_import_reads_every_line() {
    let dir = tempfile::tempdir().unwrap();
    let records = read_records(write_scraped(&dir)).unwrap();
    assert_eq!(records.len(), 6);
    assert_eq!(records[0].gear.as_deref(), Some("Flue"));
}

#[test]
fn test_import_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_records(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, catch_log::CatchLogError::Io(_)));
}

#[test]
fn test_records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    drop(imported_service(&dir));
    let reopened = SqliteStore::open(dir.path().join("catches.db")).unwrap();
    assert_eq!(reopened.find_all().unwrap().len(), 6);
}

#[test]
fn test_angler_report_from_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let service = imported_service(&dir);
    let report = service.find_by_name_and_species("Ola", "Laks").unwrap();
    assert_eq!(report.angler_stats.count, 4);
    assert!((report.angler_stats.total_weight - 16.8).abs() < 1e-9);
    assert!((report.angler_stats.average_weight - 4.2).abs() < 1e-9);
    assert_eq!(report.data.len(), 4);
}

#[test]
fn test_best_weeks_by_year_from_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let service = imported_service(&dir);
    let best = service.best_weeks_by_year("Laks").unwrap();
    assert_eq!(best.keys().copied().collect::<Vec<_>>(), vec![2022, 2023]);

    let first_2022 = &best[&2022][0];
    assert_eq!(first_2022.start_date.to_string(), "06.15");
    assert_eq!(first_2022.end_date.to_string(), "06.21");
    assert_eq!(first_2022.count, 3);
    assert_eq!(first_2022.average_weight, 7.9);

    assert_eq!(best[&2023][0].count, 1);
}

#[test]
fn test_yearly_includes_off_season() {
    let dir = tempfile::tempdir().unwrap();
    let service = imported_service(&dir);
    let yearly = service.yearly_summaries("Laks").unwrap();
    assert_eq!(yearly[0].year, 2022);
    assert_eq!(yearly[0].count, 4);
    assert_eq!(yearly[0].heaviest, 12.2);
    assert!((yearly[0].median_weight - 5.75).abs() < 1e-9);
}

#[test]
fn test_convert_data_to_fish_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let service = imported_service(&dir);
    assert_eq!(service.convert_data_to_fish().unwrap(), 6);
    let fish = service.store().find_all_fish().unwrap();
    assert_eq!(fish.len(), 6);
    assert!(fish.iter().all(|f| f.id.is_some()));
}

#[test]
fn test_custom_top_n() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(dir.path().join("c.db")).unwrap();
    let settings = StatsSettings {
        top_n: 1,
        ..StatsSettings::default()
    };
    let service = CatchService::new(store, settings);
    service.save_all(&read_records(write_scraped(&dir)).unwrap()).unwrap();
    let all_time = service.best_weeks_all_time("Laks").unwrap();
    assert_eq!(all_time.len(), 1);
    assert_eq!(all_time[0].count, 3);
}
