//! Routing service for leg distance lookups
//!
//! Uses OpenRouteService (heavy-goods-vehicle profile) when an API key is
//! configured and falls back to great-circle distance otherwise or whenever
//! the routed lookup fails.

mod openroute;

pub use openroute::{OpenRouteClient, OpenRouteConfig};

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::RoutingSettings;
use crate::services::geo::great_circle_miles;
use crate::types::Coordinates;

/// Distance provider trait for abstraction (OpenRouteService, great-circle, fakes)
#[async_trait]
pub trait DistanceProvider: Send + Sync {
    /// Driving distance in miles from `from` to `to`
    async fn route_distance(&self, from: &Coordinates, to: &Coordinates) -> Result<f64>;

    /// Get service name for logging
    fn name(&self) -> &str;
}

/// Where a leg distance came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceSource {
    Routed,
    GreatCircle,
}

/// Distance of a single trip leg
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegDistance {
    pub miles: f64,
    pub source: DistanceSource,
    /// Set when the routed lookup failed and great-circle was used instead
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded_reason: Option<String>,
}

#[cfg(test)]
impl LegDistance {
    pub fn is_degraded(&self) -> bool {
        self.degraded_reason.is_some()
    }
}

/// Routed lookup with great-circle fallback; never fails
pub struct FallbackDistance {
    primary: Option<Box<dyn DistanceProvider>>,
}

impl FallbackDistance {
    pub fn new(primary: Box<dyn DistanceProvider>) -> Self {
        Self { primary: Some(primary) }
    }

    /// Great-circle only (no routing engine configured)
    pub fn great_circle_only() -> Self {
        Self { primary: None }
    }

    pub fn name(&self) -> &str {
        self.primary.as_ref().map(|p| p.name()).unwrap_or("GreatCircle")
    }

    pub async fn leg_distance(&self, from: &Coordinates, to: &Coordinates) -> LegDistance {
        let fallback = great_circle_miles(from, to);

        let Some(primary) = &self.primary else {
            return LegDistance {
                miles: fallback,
                source: DistanceSource::GreatCircle,
                degraded_reason: None,
            };
        };

        match primary.route_distance(from, to).await {
            Ok(miles) if miles.is_finite() && miles >= 0.0 => {
                debug!("{} routed distance: {:.1} mi", primary.name(), miles);
                LegDistance {
                    miles,
                    source: DistanceSource::Routed,
                    degraded_reason: None,
                }
            }
            Ok(miles) => {
                warn!("{} returned unusable distance {}, using great-circle", primary.name(), miles);
                LegDistance {
                    miles: fallback,
                    source: DistanceSource::GreatCircle,
                    degraded_reason: Some(format!("{} returned unusable distance {}", primary.name(), miles)),
                }
            }
            Err(e) => {
                warn!("{} error: {:#}, using great-circle fallback", primary.name(), e);
                LegDistance {
                    miles: fallback,
                    source: DistanceSource::GreatCircle,
                    degraded_reason: Some(format!("{}: {:#}", primary.name(), e)),
                }
            }
        }
    }
}

/// Create the distance service from configuration
///
/// A missing or placeholder API key selects great-circle distances.
pub fn create_distance_service(settings: &RoutingSettings) -> Result<FallbackDistance> {
    match &settings.ors_api_key {
        Some(key) => {
            let config = OpenRouteConfig::new(&settings.ors_base_url, key);
            info!("OpenRouteService routing enabled at {}", settings.ors_base_url);
            Ok(FallbackDistance::new(Box::new(OpenRouteClient::new(config)?)))
        }
        None => {
            info!("Using great-circle distances (ORS_API_KEY not configured)");
            Ok(FallbackDistance::great_circle_only())
        }
    }
}
