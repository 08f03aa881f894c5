//! Trip planning handler

use std::sync::Arc;

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use serde_json::json;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{publish_json, SUBJECT_TRIP_PLANNED};
use crate::error::PlanError;
use crate::services::planner::TripPlanner;
use crate::types::{ErrorResponse, PlanTripRequest, Request, SuccessResponse};

/// Map a planning failure onto the wire error envelope
pub fn plan_error_response(request_id: Uuid, err: &PlanError) -> ErrorResponse {
    let response = ErrorResponse::new(request_id, err.code(), err.to_string());

    match err {
        PlanError::GeocodingFailed { locations } => {
            response.with_details(json!({ "locations": locations }))
        }
        PlanError::CycleExceeded { final_cycle_hours, limit } => response.with_details(json!({
            "finalCycleHours": final_cycle_hours,
            "limit": limit,
        })),
        _ => response,
    }
}

/// Handle hos.trip.plan requests
pub async fn handle_plan(
    client: Client,
    mut subscriber: Subscriber,
    planner: Arc<TripPlanner>,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received trip.plan message");

        let reply = match msg.reply {
            Some(ref r) => r.clone(),
            None => {
                error!("trip.plan message without reply subject");
                continue;
            }
        };

        let request: Request<PlanTripRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse trip.plan request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                publish_json(&client, reply, &error).await?;
                continue;
            }
        };

        match planner.plan_trip(&request.payload).await {
            Ok(result) => {
                info!(
                    "Trip {} planned: {:.1} mi over {} day(s)",
                    result.trip_id, result.total_distance_miles, result.estimated_days
                );

                // Persistence consumes the planned trip from its own subject
                if let Err(e) = publish_json(&client, SUBJECT_TRIP_PLANNED, &result).await {
                    error!("Failed to publish planned trip {}: {}", result.trip_id, e);
                }

                let success = SuccessResponse::new(request.id, result);
                publish_json(&client, reply, &success).await?;
            }
            Err(e) => {
                if e.is_client_error() {
                    warn!("Trip plan rejected: {}", e);
                } else {
                    error!("Trip planning failed: {}", e);
                }
                publish_json(&client, reply, &plan_error_response(request.id, &e)).await?;
            }
        }
    }

    Ok(())
}
