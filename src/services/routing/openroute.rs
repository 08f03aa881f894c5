//! OpenRouteService directions client
//!
//! OpenRouteService API documentation:
//! https://openrouteservice.org/dev/#/api-docs/v2/directions

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::DistanceProvider;
use crate::services::geo::meters_to_miles;
use crate::types::Coordinates;

/// Truck routing profile
const HGV_PROFILE: &str = "driving-hgv";

/// OpenRouteService client configuration
#[derive(Debug, Clone)]
pub struct OpenRouteConfig {
    /// Base URL (e.g., "https://api.openrouteservice.org")
    pub base_url: String,
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl OpenRouteConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout_seconds: 10,
        }
    }
}

/// OpenRouteService routing client
pub struct OpenRouteClient {
    client: Client,
    config: OpenRouteConfig,
}

impl OpenRouteClient {
    pub fn new(config: OpenRouteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    fn directions_url(&self) -> String {
        format!(
            "{}/v2/directions/{}",
            self.config.base_url.trim_end_matches('/'),
            HGV_PROFILE
        )
    }

    /// Build the directions request; ORS wants [lng, lat] pairs
    fn build_directions_request(&self, from: &Coordinates, to: &Coordinates) -> DirectionsRequest {
        DirectionsRequest {
            coordinates: vec![[from.lng, from.lat], [to.lng, to.lat]],
            units: "m".to_string(),
        }
    }
}

#[async_trait]
impl DistanceProvider for OpenRouteClient {
    async fn route_distance(&self, from: &Coordinates, to: &Coordinates) -> Result<f64> {
        let request = self.build_directions_request(from, to);

        let response = self.client
            .post(self.directions_url())
            .header(AUTHORIZATION, &self.config.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to OpenRouteService")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenRouteService returned error {}: {}", status, body);
        }

        let directions: DirectionsResponse = response
            .json()
            .await
            .context("Failed to parse OpenRouteService response")?;

        let meters = directions
            .routes
            .first()
            .map(|r| r.summary.distance)
            .context("OpenRouteService response has no routes")?;

        debug!("OpenRouteService leg distance: {:.0} m", meters);

        Ok(meters_to_miles(meters))
    }

    fn name(&self) -> &str {
        "OpenRouteService"
    }
}

// OpenRouteService API types

#[derive(Debug, Serialize)]
struct DirectionsRequest {
    coordinates: Vec<[f64; 2]>,
    units: String,
}

/// JSON (not GeoJSON) directions response
#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    summary: RouteSummary,
}

/// ORS omits zero-valued summary fields
#[derive(Debug, Deserialize)]
struct RouteSummary {
    /// Distance in meters
    #[serde(default)]
    distance: f64,
}
