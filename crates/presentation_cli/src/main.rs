//! Skywatch CLI
//!
//! Offline access to the stored readings and summaries, replay of the
//! reference scenarios, and status checks against a running server.

#![allow(clippy::print_stdout)]

mod engine;

use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use infrastructure::{AppConfig, LogFormat, init_tracing};
use serde::Serialize;

use crate::engine::LocalEngine;

/// Skywatch CLI
#[derive(Parser)]
#[command(name = "skywatch-cli")]
#[command(author, version, about = "Skywatch weather monitoring CLI", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (defaults to ./config.toml when present)
    #[arg(short, long, env = "SKYWATCH_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Override the database URL (e.g. sqlite::memory:)
    #[arg(long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recompute and print the daily summary of a location
    Summarize {
        /// Location name
        location: String,

        /// UTC date (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Run breach detection on the latest two readings of a location
    Check {
        /// Location name
        location: String,
    },

    /// Print stored readings, newest first
    Readings {
        /// Location name
        location: String,

        /// Maximum number of readings
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },

    /// Store the Delhi sample day (25/28/22/30 °C) and print its summary
    SimulateDay {
        /// Location name
        #[arg(default_value = "Delhi")]
        location: String,

        /// UTC date (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Replay the consecutive breach scenario (36, 37, then 38 °C)
    SimulateBreach {
        /// Location name
        #[arg(default_value = "X")]
        location: String,
    },

    /// Show monitor status of a running server
    Status {
        /// Server URL
        #[arg(short, long, default_value = "http://localhost:3000")]
        url: String,
    },

    /// Check server readiness (exit code 1 when not ready)
    Health {
        /// Server URL
        #[arg(short, long, default_value = "http://localhost:3000")]
        url: String,
    },
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Format endpoint URL
fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn open_engine(cli: &Cli) -> anyhow::Result<LocalEngine> {
    let mut config = AppConfig::load_from(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(url) = &cli.database {
        config.database.url.clone_from(url);
    }
    LocalEngine::open(&config.database, config.monitor.thresholds()?).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(LogFormat::Text, log_filter_from_verbosity(cli.verbose))?;

    let client = reqwest::Client::new();

    match &cli.command {
        Commands::Status { url } => {
            let resp = client
                .get(endpoint_url(url, "/api/monitor/status"))
                .send()
                .await?
                .json::<serde_json::Value>()
                .await?;
            print_json(&resp)?;
        },

        Commands::Health { url } => {
            let resp = client.get(endpoint_url(url, "/ready")).send().await?;
            let ready = resp.status().is_success();
            print_json(&resp.json::<serde_json::Value>().await?)?;
            if !ready {
                std::process::exit(1);
            }
        },

        Commands::Summarize { location, date } => {
            let engine = open_engine(&cli).await?;
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            match engine.summarize(location, date).await? {
                Some(summary) => print_json(&summary)?,
                None => println!("No readings for {location} on {date}"),
            }
            engine.close().await;
        },

        Commands::Check { location } => {
            let engine = open_engine(&cli).await?;
            print_json(&engine.check(location).await?)?;
            engine.close().await;
        },

        Commands::Readings { location, limit } => {
            let engine = open_engine(&cli).await?;
            print_json(&engine.readings(location, *limit).await?)?;
            engine.close().await;
        },

        Commands::SimulateDay { location, date } => {
            let engine = open_engine(&cli).await?;
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            print_json(&engine.simulate_day(location, date).await?)?;
            engine.close().await;
        },

        Commands::SimulateBreach { location } => {
            let engine = open_engine(&cli).await?;
            print_json(&engine.simulate_breach(location, Utc::now()).await?)?;
            engine.close().await;
        },
    }

    Ok(())
}
