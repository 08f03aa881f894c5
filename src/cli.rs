//! CLI argument parsing for the hos-planner binary.

use std::path::PathBuf;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Args, Parser, Subcommand};

use crate::services::hos::RestPolicy;
use crate::types::PlanTripRequest;

#[derive(Parser)]
#[command(name = "hos-planner", about = "Hours-of-Service trip planner and daily log generator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Answer trip planning requests over NATS (default if no subcommand given)
    Serve,
    /// Plan one trip, print a JSON summary and optionally write the log sheets
    Plan(PlanArgs),
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Current location of the driver
    #[arg(long)]
    pub from: String,
    #[arg(long)]
    pub pickup: String,
    #[arg(long)]
    pub dropoff: String,
    /// On-duty hours already used in the current cycle
    #[arg(long)]
    pub cycle_hours: f64,
    /// Name printed on the log sheets
    #[arg(long)]
    pub driver: Option<String>,
    /// Departure date (YYYY-MM-DD), default today
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Departure time (HH:MM), default TRIP_START_TIME
    #[arg(long, value_parser = parse_clock)]
    pub start_time: Option<NaiveTime>,
    /// "sleeper-split" or "off-duty-10", default HOS_REST_POLICY
    #[arg(long)]
    pub rest_policy: Option<RestPolicy>,
    /// Directory for day-N.png log sheets
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

fn parse_clock(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").map_err(|e| format!("expected HH:MM: {}", e))
}

impl PlanArgs {
    /// Departure from --date/--start-time; `None` leaves the default to the planner
    pub fn departure(&self, default_start: NaiveTime) -> Option<NaiveDateTime> {
        if self.date.is_none() && self.start_time.is_none() {
            return None;
        }
        let date = self.date.unwrap_or_else(|| Local::now().date_naive());
        Some(date.and_time(self.start_time.unwrap_or(default_start)))
    }

    pub fn to_request(&self, default_start: NaiveTime) -> PlanTripRequest {
        PlanTripRequest {
            current_location: self.from.clone(),
            pickup_location: self.pickup.clone(),
            dropoff_location: self.dropoff.clone(),
            current_cycle_hours: self.cycle_hours,
            driver_name: self.driver.clone(),
            departure: self.departure(default_start),
        }
    }
}
