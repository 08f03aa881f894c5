//! Trip planning request/response types

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DutyStatusInterval, ResolvedLocation};

/// Request to plan a trip
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanTripRequest {
    pub current_location: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    /// On-duty hours already used in the current 70-hour/8-day cycle
    pub current_cycle_hours: f64,
    /// Name printed on the log sheets
    #[serde(default)]
    pub driver_name: Option<String>,
    /// Departure; defaults to the configured start time today
    #[serde(default)]
    pub departure: Option<NaiveDateTime>,
}

/// Planned trip, ready to hand to persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPlanResult {
    pub trip_id: Uuid,
    /// Name printed on the log sheets
    pub driver_name: String,
    pub current_location: ResolvedLocation,
    pub pickup_location: ResolvedLocation,
    pub dropoff_location: ResolvedLocation,
    pub current_cycle_hours: f64,
    pub leg_miles: [f64; 2],
    pub total_distance_miles: f64,
    pub total_time_hours: f64,
    pub final_cycle_hours: f64,
    pub estimated_days: usize,
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
    /// Ordered day records, one per log sheet
    pub daily_logs: Vec<DailyLogResult>,
    pub warnings: Vec<PlanWarning>,
}

/// One rendered day of the trip
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLogResult {
    /// 1-based position within the trip
    pub sequence: usize,
    pub date: NaiveDate,
    pub miles: f64,
    pub driving_hours: f64,
    pub on_duty_hours: f64,
    pub intervals: Vec<DutyStatusInterval>,
    /// Base64 encoded PNG log sheet
    pub image_b64: String,
}

/// Non-fatal issue encountered while planning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanWarning {
    /// Index of the affected leg (0 = to pickup, 1 = to dropoff)
    pub leg_index: Option<usize>,
    pub warning_type: String,
    pub message: String,
}

impl PlanWarning {
    pub const PROVIDER_DEGRADED: &'static str = "PROVIDER_DEGRADED";

    pub fn provider_degraded(leg_index: usize, message: impl Into<String>) -> Self {
        Self {
            leg_index: Some(leg_index),
            warning_type: Self::PROVIDER_DEGRADED.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_trip_request_accepts_minimal_payload() {
        let json = r#"{
            "currentLocation": "Chicago, IL",
            "pickupLocation": "Gary, IN",
            "dropoffLocation": "Columbus, OH",
            "currentCycleHours": 12.5
        }"#;

        let request: PlanTripRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.pickup_location, "Gary, IN");
        assert_eq!(request.current_cycle_hours, 12.5);
        assert!(request.driver_name.is_none());
        assert!(request.departure.is_none());
    }

    #[test]
    fn test_provider_degraded_warning() {
        let warning = PlanWarning::provider_degraded(1, "ORS timed out");
        assert_eq!(warning.leg_index, Some(1));
        assert_eq!(warning.warning_type, "PROVIDER_DEGRADED");
    }
}
