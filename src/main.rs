use clap::{CommandFactory, Parser};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use catch_log::cli::{Args, Command};
use catch_log::config::Config;
use catch_log::{import, report, web};
use catch_log::{CatchService, CatchStore, MemoryStore, SqliteStore, StatsSettings};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("catch_log=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn emit<T: Serialize>(json: bool, value: &T, render: impl FnOnce(&T) -> String) -> catch_log::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", render(value));
    }
    Ok(())
}

async fn run<S: CatchStore + 'static>(
    store: S,
    settings: StatsSettings,
    args: Args,
    default_port: u16,
) -> catch_log::Result<()> {
    let service = CatchService::new(store, settings);
    let json = args.json;

    match args.command {
        Command::Import { file } => {
            let records = import::read_records(&file)?;
            let saved = service.save_all(&records)?;
            emit(json, &saved.len(), |n| format!("Imported {} records.\n", n))?;
        }
        Command::BestWeeks {
            species,
            all_time: true,
            ..
        } => {
            let weeks = service.best_weeks_all_time(&species)?;
            emit(json, &weeks, |w| report::render_best_weeks(&species, w))?;
        }
        Command::BestWeeks {
            species,
            rolling: true,
            ..
        } => {
            let periods = service.best_rolling_periods(&species)?;
            emit(json, &periods, |p| report::render_rolling(&species, p))?;
        }
        Command::BestWeeks { species, .. } => {
            let by_year = service.best_weeks_by_year(&species)?;
            emit(json, &by_year, |b| report::render_best_weeks_by_year(&species, b))?;
        }
        Command::Angler { name, species } => {
            let angler = service.find_by_name_and_species(&name, &species)?;
            emit(json, &angler, report::render_angler)?;
        }
        Command::Yearly { species } => {
            let summaries = service.yearly_summaries(&species)?;
            emit(json, &summaries, |s| report::render_yearly(&species, s))?;
        }
        Command::Convert => {
            let converted = service.convert_data_to_fish()?;
            emit(json, &converted, |n| format!("Converted {} entities successfully.\n", n))?;
        }
        Command::Serve { port } => {
            web::serve(port.unwrap_or(default_port), Arc::new(service)).await?;
        }
        Command::Completions { .. } => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    if let Command::Completions { shell } = args.command {
        clap_complete::generate(shell, &mut Args::command(), "catch-log", &mut std::io::stdout());
        return Ok(());
    }

    let config = Config::load(args.config.as_deref())?;
    let settings = config.stats_settings()?;
    let database = args.db.clone().or_else(|| config.database.clone());

    match database {
        Some(path) => run(SqliteStore::open(&path)?, settings, args, config.port).await?,
        None => {
            warn!("no database configured; using an in-memory store");
            run(MemoryStore::new(), settings, args, config.port).await?
        }
    }

    Ok(())
}
