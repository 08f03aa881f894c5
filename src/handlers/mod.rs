//! NATS message handlers

pub mod ping;
pub mod trip;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_nats::subject::ToSubject;
use async_nats::Client;
use serde::Serialize;
use tokio::select;
use tracing::{error, info};

use crate::services::planner::TripPlanner;

pub const SUBJECT_PING: &str = "hos.ping";
pub const SUBJECT_TRIP_PLAN: &str = "hos.trip.plan";
/// Planned trips are published here for persistence
pub const SUBJECT_TRIP_PLANNED: &str = "hos.trip.planned";

/// Serialize `value` and publish it on `subject`
pub async fn publish_json<T: Serialize>(
    client: &Client,
    subject: impl ToSubject,
    value: &T,
) -> Result<()> {
    let bytes = serde_json::to_vec(value).context("Failed to serialize message")?;
    client
        .publish(subject, bytes.into())
        .await
        .context("Failed to publish message")?;
    Ok(())
}

/// Start all message handlers
pub async fn start_handlers(client: Client, planner: Arc<TripPlanner>) -> Result<()> {
    info!("Starting message handlers...");

    let ping_sub = client.subscribe(SUBJECT_PING).await?;
    let trip_plan_sub = client.subscribe(SUBJECT_TRIP_PLAN).await?;

    info!("Subscribed to {}, {}", SUBJECT_PING, SUBJECT_TRIP_PLAN);

    let client_ping = client.clone();
    let ping_handle = tokio::spawn(async move {
        ping::handle_ping(client_ping, ping_sub).await
    });

    let client_trip = client.clone();
    let trip_plan_handle = tokio::spawn(async move {
        trip::handle_plan(client_trip, trip_plan_sub, planner).await
    });

    info!("All handlers started, waiting for messages...");

    // Any handler finishing means the subscription is gone
    select! {
        result = ping_handle => {
            error!("Ping handler finished: {:?}", result);
        }
        result = trip_plan_handle => {
            error!("Trip plan handler finished: {:?}", result);
        }
    }

    Ok(())
}
