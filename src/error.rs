//! Trip planning errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Geocoding failed for: {}", .locations.join(", "))]
    GeocodingFailed { locations: Vec<String> },

    #[error("Trip is infeasible: {reason}")]
    TripInfeasible { reason: String },

    #[error("Trip exceeds the {limit:.0}-hour cycle ({final_cycle_hours:.1} hours on duty)")]
    CycleExceeded { final_cycle_hours: f64, limit: f64 },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Log sheet rendering failed: {0}")]
    Render(#[from] image::ImageError),
}

impl PlanError {
    pub fn infeasible(reason: impl Into<String>) -> Self {
        PlanError::TripInfeasible { reason: reason.into() }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        PlanError::InvalidInput { message: message.into() }
    }

    /// Stable error code used on the wire
    pub fn code(&self) -> &'static str {
        match self {
            PlanError::GeocodingFailed { .. } => "GEOCODING_FAILED",
            PlanError::TripInfeasible { .. } => "TRIP_INFEASIBLE",
            PlanError::CycleExceeded { .. } => "CYCLE_EXCEEDED",
            PlanError::InvalidInput { .. } => "INVALID_REQUEST",
            PlanError::Render(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the caller can fix the request; rendering errors are our bugs
    pub fn is_client_error(&self) -> bool {
        !matches!(self, PlanError::Render(_))
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geocoding_failed_lists_locations() {
        let err = PlanError::GeocodingFailed {
            locations: vec!["Nowhere".to_string(), "Atlantis".to_string()],
        };
        assert_eq!(err.to_string(), "Geocoding failed for: Nowhere, Atlantis");
        assert_eq!(err.code(), "GEOCODING_FAILED");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_cycle_exceeded_message() {
        let err = PlanError::CycleExceeded { final_cycle_hours: 75.46, limit: 70.0 };
        assert_eq!(
            err.to_string(),
            "Trip exceeds the 70-hour cycle (75.5 hours on duty)"
        );
        assert_eq!(err.code(), "CYCLE_EXCEEDED");
    }

    #[test]
    fn test_render_error_is_internal() {
        let err = PlanError::Render(image::ImageError::Limits(
            image::error::LimitError::from_kind(image::error::LimitErrorKind::DimensionError),
        ));
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert!(!err.is_client_error());
    }
}
