//! HOS Planner - Hours-of-Service trip planner
//!
//! Plans truck trips under the property-carrier HOS rules and renders the
//! driver's daily log sheets. Serves requests over NATS or runs one-shot
//! from the command line.

mod cli;
mod config;
mod defaults;
mod error;
mod handlers;
mod services;
mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use base64::Engine;
use clap::Parser;
use serde_json::json;
use tracing::{error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command, PlanArgs};
use crate::config::Config;
use crate::services::planner::TripPlanner;
use crate::types::TripPlanResult;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Serve);

    // Logs directory - use LOGS_DIR env var or default to ../logs
    let logs_dir = std::env::var("LOGS_DIR")
        .unwrap_or_else(|_| "../logs".to_string());
    std::fs::create_dir_all(&logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(
        Rotation::DAILY,
        &logs_dir,
        "planner.log",
    );
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // One-shot planning prints JSON on stdout, so console logs go to stderr
    let one_shot = matches!(command, Command::Plan(_));
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,hos_planner=debug".into()),
        ))
        .with((!one_shot).then(tracing_subscriber::fmt::layer))  // stdout
        .with(one_shot.then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))  // file
        .init();

    let config = Config::from_env()?;
    info!("Configuration loaded");

    match command {
        Command::Serve => serve(config).await,
        Command::Plan(args) => plan(config, args).await,
    }
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting HOS Planner...");

    let planner = Arc::new(TripPlanner::from_config(&config)?);

    // Connect to NATS (supports optional NATS_USER/NATS_PASSWORD auth).
    let nats_client = match (std::env::var("NATS_USER"), std::env::var("NATS_PASSWORD")) {
        (Ok(user), Ok(password)) if !user.is_empty() => {
            async_nats::ConnectOptions::new()
                .user_and_password(user, password)
                .connect(&config.nats_url)
                .await?
        }
        _ => async_nats::connect(&config.nats_url).await?,
    };
    info!("Connected to NATS at {}", config.nats_url);

    let handler_result = handlers::start_handlers(nats_client, planner).await;

    if let Err(e) = handler_result {
        error!("Handler error: {}", e);
        return Err(e);
    }

    Ok(())
}

async fn plan(mut config: Config, args: PlanArgs) -> Result<()> {
    if let Some(policy) = args.rest_policy {
        config.hos_rules = config.hos_rules.with_rest_policy(policy);
    }

    let planner = TripPlanner::from_config(&config)?;
    let request = args.to_request(config.trip_start_time);
    let result = planner.plan_trip(&request).await?;

    if let Some(dir) = &args.out_dir {
        write_log_sheets(&result, dir)?;
    }

    println!("{}", serde_json::to_string_pretty(&summary(&result))?);
    Ok(())
}

/// Result without the encoded images
fn summary(result: &TripPlanResult) -> serde_json::Value {
    let days: Vec<_> = result
        .daily_logs
        .iter()
        .map(|day| {
            json!({
                "sequence": day.sequence,
                "date": day.date,
                "miles": day.miles,
                "drivingHours": day.driving_hours,
                "onDutyHours": day.on_duty_hours,
                "intervals": day.intervals,
            })
        })
        .collect();

    json!({
        "tripId": result.trip_id,
        "driverName": result.driver_name,
        "currentLocation": result.current_location,
        "pickupLocation": result.pickup_location,
        "dropoffLocation": result.dropoff_location,
        "legMiles": result.leg_miles,
        "totalDistanceMiles": result.total_distance_miles,
        "totalTimeHours": result.total_time_hours,
        "finalCycleHours": result.final_cycle_hours,
        "estimatedDays": result.estimated_days,
        "departure": result.departure,
        "arrival": result.arrival,
        "dailyLogs": days,
        "warnings": result.warnings,
    })
}

fn write_log_sheets(result: &TripPlanResult, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    for day in &result.daily_logs {
        let png = base64::engine::general_purpose::STANDARD
            .decode(&day.image_b64)
            .context("Failed to decode log sheet image")?;
        let path = dir.join(format!("day-{}.png", day.sequence));
        std::fs::write(&path, png)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote {}", path.display());
    }

    Ok(())
}
