use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mlb_similar_players::ingest::{self, ColumnSpec};
use mlb_similar_players::{SimilarityConfig, pipeline, report, synthetic};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let config = load_config(&args)?;
    let started = Instant::now();

    let table = match flag_value(&args, "--synthetic").and_then(|v| v.parse::<usize>().ok()) {
        Some(players) => {
            info!(players, "generating synthetic league");
            synthetic::synthetic_table(players, 2017).context("synthetic league")?
        }
        None => {
            info!(path = %config.input.display(), "reading player data");
            let columns = ColumnSpec {
                id: flag_value(&args, "--id-column"),
                ..ColumnSpec::default()
            }
            .with_statistics(config.weights.iter().map(|w| w.statistic.clone()));
            ingest::read_player_table(&config.input, &columns)
                .with_context(|| format!("load {}", config.input.display()))?
        }
    };

    let result = pipeline::run(&table, &config).context("similarity run failed")?;

    let export = report::export_workbook_with_progress(
        &config.output,
        &result,
        config.include_scores,
        |progress| {
            info!(
                current = progress.current,
                total = progress.total,
                "{}",
                progress.message
            )
        },
    )?;

    println!("Similar players complete");
    println!("Output: {}", config.output.display());
    println!("Players: {}", table.len());
    println!("Sheets: {} ({} rows)", export.sheets, export.rows);
    if export.short_rows > 0 {
        println!("Rows with fewer than 5 neighbors: {}", export.short_rows);
    }
    if !result.unassigned.is_empty() {
        println!("Players only in ALL: {}", result.unassigned.len());
    }
    let anomalies = result.non_finite();
    if anomalies > 0 {
        println!("Non-finite distances zeroed: {anomalies}");
    }
    println!("Runtime: {:.1}s", started.elapsed().as_secs_f64());

    Ok(())
}

/// Defaults < config file < environment < arguments.
fn load_config(args: &[String]) -> Result<SimilarityConfig> {
    let config_path = flag_value(args, "--config")
        .map(PathBuf::from)
        .or_else(|| std::env::var("MLB_SIM_CONFIG").ok().map(PathBuf::from));
    let mut config = match config_path {
        Some(path) => SimilarityConfig::load_file(&path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => SimilarityConfig::default(),
    };
    config.apply_env_overrides();

    if let Some(path) = flag_value(args, "--input") {
        config.input = PathBuf::from(path);
    }
    if let Some(path) = flag_value(args, "--output") {
        config.output = PathBuf::from(path);
    }
    if let Some(threads) = flag_value(args, "--threads").and_then(|v| v.parse::<usize>().ok()) {
        config.threads = Some(threads.clamp(1, 64));
    }
    if args.iter().any(|arg| arg == "--scores") {
        config.include_scores = true;
    }
    config.validate()?;
    Ok(config)
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(flag).and_then(|rest| rest.strip_prefix('=')) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
