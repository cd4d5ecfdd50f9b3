// ABOUTME: Snapcal CLI - analyze food photos, save scans, and browse history from the terminal
// ABOUTME: Wires the analyzer, sqlite store, file identity, and gateway together
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Snapcal
//!
//! Usage:
//! ```bash
//! # Analyze a photo and print the identified items
//! snapcal-cli analyze lunch.jpg
//!
//! # Analyze and persist the scan
//! snapcal-cli analyze lunch.jpg --save
//!
//! # Browse saved scans
//! snapcal-cli history --limit 20
//! snapcal-cli show 3e7c9d2a-...
//! snapcal-cli summary 2026-08-29
//! snapcal-cli stats
//!
//! # Look up USDA nutrition data
//! snapcal-cli search "chicken rice"
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use snapcal::analysis::{usda::NutritionSearchClient, FoodAnalyzer};
use snapcal::config::AppConfig;
use snapcal::gateway::{ScanDraft, ScanGateway};
use snapcal::identity::FileIdentity;
use snapcal::models::scan::ScanRecord;
use snapcal::models::FoodResult;
use snapcal::store::{sqlite::SqliteStore, PageRequest};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "snapcal-cli",
    about = "Snapcal food-photo calorie tracker CLI",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Record store URL override
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a food photo
    Analyze {
        /// Path to the image file
        image: PathBuf,
        /// Persist the scan after analysis
        #[arg(long)]
        save: bool,
    },
    /// List saved scans, newest first
    History {
        /// Maximum number of scans to show
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Show one saved scan
    Show {
        /// Scan record id
        id: String,
    },
    /// Aggregate one UTC day's scans
    Summary {
        /// Day to summarize (YYYY-MM-DD)
        date: chrono::NaiveDate,
    },
    /// Cross-scan statistics for this installation
    Stats,
    /// Delete one saved scan
    Delete {
        /// Scan record id
        id: String,
    },
    /// Search USDA nutrition entries by food name
    Search {
        /// Food name to look up
        query: String,
        /// Results per page
        #[arg(long, default_value_t = 25)]
        page_size: u32,
    },
    /// Probe the analysis service health endpoint
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    snapcal::logging::init(if cli.verbose { "debug" } else { "info" });

    let mut config = AppConfig::from_env()?;
    if let Some(database_url) = cli.database_url {
        config.database_url = database_url;
    }

    match cli.command {
        Command::Analyze { image, save } => analyze(&config, &image, save).await,
        Command::History { limit } => history(&config, limit).await,
        Command::Show { id } => show(&config, &id).await,
        Command::Summary { date } => summary(&config, date).await,
        Command::Stats => stats(&config).await,
        Command::Delete { id } => delete(&config, &id).await,
        Command::Search { query, page_size } => search(&config, &query, page_size).await,
        Command::Health => health(&config).await,
    }
}

async fn build_gateway(config: &AppConfig) -> Result<ScanGateway<SqliteStore, FileIdentity>> {
    let store = SqliteStore::new(&config.database_url)
        .await
        .with_context(|| format!("opening record store at {}", config.database_url))?;
    let identity = match &config.identity_path {
        Some(path) => FileIdentity::new(path),
        None => FileIdentity::from_default().context("resolving identity file location")?,
    };
    Ok(ScanGateway::with_config(
        store,
        identity,
        config.gateway_config(),
    ))
}

async fn analyze(config: &AppConfig, image: &PathBuf, save: bool) -> Result<()> {
    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("reading {}", image.display()))?;

    let analyzer = FoodAnalyzer::new(config.analyzer_url.clone(), config.analysis_timeout)?;
    let foods = analyzer.analyze(&bytes).await?;

    let mut total = 0.0;
    for food in &foods {
        print_food(food);
        total += food.calculated_total_calories();
    }
    println!("  total: {total:.0} kcal across {} item(s)", foods.len());

    if save {
        let gateway = build_gateway(config).await?;
        let draft = ScanDraft {
            foods,
            image_path: Some(image.display().to_string()),
            app_version: Some(env!("CARGO_PKG_VERSION").to_owned()),
            platform: Some("cli".to_owned()),
            analyzed_at: Some(chrono::Utc::now()),
        };
        let id = gateway.save_scan(&draft).await?;
        println!("  saved as {id}");
    }
    Ok(())
}

async fn history(config: &AppConfig, limit: u32) -> Result<()> {
    let gateway = build_gateway(config).await?;
    let scans = gateway.history(&PageRequest::first(limit)).await?;
    if scans.is_empty() {
        println!("no scans on record");
        return Ok(());
    }
    for scan in &scans {
        println!(
            "{}  {}  {:>7.0} kcal  {} item(s)",
            scan.id,
            scan.created_at.format("%Y-%m-%d %H:%M"),
            scan.document.total_calories,
            scan.document.foods.len()
        );
    }
    Ok(())
}

async fn show(config: &AppConfig, id: &str) -> Result<()> {
    let gateway = build_gateway(config).await?;
    let Some(scan) = gateway.scan(id).await? else {
        println!("scan {id} not found");
        return Ok(());
    };
    print_scan(&scan);
    Ok(())
}

async fn summary(config: &AppConfig, date: chrono::NaiveDate) -> Result<()> {
    let gateway = build_gateway(config).await?;
    let day = gateway.daily_summary(date).await?;
    println!(
        "{}: {} scan(s), {} item(s), {:.0} kcal",
        day.date, day.scan_count, day.totals.item_count, day.totals.total_calories
    );
    let n = &day.totals.nutrient_totals;
    println!(
        "  protein {:.1} g / carbs {:.1} g / fat {:.1} g / fiber {:.1} g",
        n.protein_g, n.carbs_g, n.fat_g, n.fiber_g
    );
    Ok(())
}

async fn stats(config: &AppConfig) -> Result<()> {
    let gateway = build_gateway(config).await?;
    let stats = gateway.statistics().await?;
    println!(
        "{} scan(s), {} item(s), {:.0} kcal total, mean confidence {:.2}",
        stats.total_scans,
        stats.totals.item_count,
        stats.totals.total_calories,
        stats.totals.average_confidence
    );
    if let (Some(first), Some(last)) = (stats.first_scan_at, stats.last_scan_at) {
        println!("  from {} to {}", first.format("%Y-%m-%d"), last.format("%Y-%m-%d"));
    }
    for (label, count) in &stats.totals.database_counts {
        println!("  {label}: {count}");
    }
    Ok(())
}

async fn delete(config: &AppConfig, id: &str) -> Result<()> {
    let gateway = build_gateway(config).await?;
    gateway.delete_scan(id).await?;
    println!("deleted scan {id}");
    Ok(())
}

async fn search(config: &AppConfig, query: &str, page_size: u32) -> Result<()> {
    let client = NutritionSearchClient::new(config.search_url.clone(), config.read_timeout)?;
    let results = client
        .search_with(query, snapcal::analysis::usda::DEFAULT_DATA_TYPES, page_size)
        .await?;
    println!(
        "{} match(es) of {} total",
        results.foods.len(),
        results.total_results
    );
    for food in &results.foods {
        let info = food.nutrients.to_nutrient_info();
        println!(
            "  [{}] {}  ({})  protein {:.1} / carbs {:.1} / fat {:.1} per 100 g",
            food.fdc_id.map_or_else(|| "-".to_owned(), |id| id.to_string()),
            food.description,
            food.data_type.as_deref().unwrap_or("unknown type"),
            info.protein,
            info.carbs,
            info.fat
        );
    }
    Ok(())
}

async fn health(config: &AppConfig) -> Result<()> {
    let analyzer = FoodAnalyzer::new(config.analyzer_url.clone(), config.analysis_timeout)?;
    let health = analyzer.health().await?;
    println!(
        "status: {}  service: {}  api key: {}",
        health.status, health.service, health.gemini_api_key
    );
    Ok(())
}

fn print_food(food: &FoodResult) {
    println!(
        "- {}  {:.0} g  {:>6.0} kcal  [{} confidence, {}]",
        food.name,
        food.weight_grams,
        food.calculated_total_calories(),
        food.confidence_level(),
        food.data_source_info()
    );
}

fn print_scan(scan: &ScanRecord) {
    println!(
        "scan {}  {}  {:.0} kcal",
        scan.id,
        scan.created_at.format("%Y-%m-%d %H:%M:%S"),
        scan.document.total_calories
    );
    for food in &scan.document.foods {
        println!(
            "- {}  {:.0} g  {:>6.0} kcal  (confidence {:.2})",
            food.name, food.weight_grams, food.total_calories, food.confidence
        );
    }
    if let Some(path) = &scan.document.image_path {
        println!("  image: {path}");
    }
    let quality = &scan.document.data_quality;
    println!("  mean confidence: {:.2}", quality.average_confidence);
}
