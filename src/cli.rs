use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "catch-log")]
#[command(version)]
#[command(about = "Fishing log: import scraped catches and rank the best weeks of the season")]
pub struct Args {
    /// TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database file (overrides the config; in-memory when unset)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Print JSON instead of coloured tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Load scraped records (JSON array or JSON lines) into the store
    Import {
        /// File written by the scraper
        file: PathBuf,
    },

    /// Rank the best weeks of the season for a species
    BestWeeks {
        #[arg(long, short)]
        species: String,

        /// Pool every year onto one season calendar
        #[arg(long, conflicts_with = "rolling")]
        all_time: bool,

        /// Use windows anchored on each year's first catch
        #[arg(long)]
        rolling: bool,
    },

    /// Totals and catches for one angler
    Angler {
        name: String,

        #[arg(long, short)]
        species: String,
    },

    /// Per-year count, total, average and median weight
    Yearly {
        #[arg(long, short)]
        species: String,
    },

    /// Copy every catch record into the fish table
    Convert,

    /// Serve the JSON API
    Serve {
        /// Port to listen on (defaults to the config value)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}
