//! Configuration management

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveTime;

use crate::defaults;
use crate::services::hos::{HosRules, RestPolicy};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// NATS server URL
    pub nats_url: String,

    pub geocoder: GeocoderSettings,

    pub routing: RoutingSettings,

    /// Hours-of-Service limits applied by the simulator
    pub hos_rules: HosRules,

    /// Time of day trips depart when the request gives no departure
    pub trip_start_time: NaiveTime,

    /// Name printed on log sheets when the request gives none
    pub driver_name: String,
}

/// Geocoder backend selection and Nominatim protection settings
#[derive(Debug, Clone)]
pub struct GeocoderSettings {
    /// "mock" or "nominatim"
    pub backend: String,
    pub nominatim_url: String,
    pub rate_limit_interval: Duration,
    pub circuit_breaker_threshold: u32,
    pub circuit_breaker_recovery: Duration,
}

/// OpenRouteService settings; no key means great-circle distances
#[derive(Debug, Clone)]
pub struct RoutingSettings {
    pub ors_api_key: Option<String>,
    pub ors_base_url: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from any variable source
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let parsed = |key: &str| var(key).and_then(|s| s.trim().parse::<u64>().ok());

        let nats_url = var("NATS_URL").unwrap_or_else(|| defaults::DEFAULT_NATS_URL.to_string());

        let geocoder = GeocoderSettings {
            backend: var("GEOCODER_BACKEND")
                .map(|s| s.trim().to_lowercase())
                .unwrap_or_else(|| "mock".to_string()),
            nominatim_url: var("NOMINATIM_BASE_URL")
                .unwrap_or_else(|| defaults::DEFAULT_NOMINATIM_URL.to_string()),
            rate_limit_interval: Duration::from_millis(
                parsed("NOMINATIM_RATE_LIMIT_MS").unwrap_or(defaults::DEFAULT_RATE_LIMIT_MS),
            ),
            circuit_breaker_threshold: parsed("NOMINATIM_CB_THRESHOLD")
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(defaults::DEFAULT_CIRCUIT_BREAKER_THRESHOLD),
            circuit_breaker_recovery: Duration::from_secs(
                parsed("NOMINATIM_CB_RECOVERY_SECS")
                    .unwrap_or(defaults::DEFAULT_CIRCUIT_BREAKER_RECOVERY_SECS),
            ),
        };

        let ors_api_key = var("ORS_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty() && k != defaults::ORS_PLACEHOLDER_KEY);

        let routing = RoutingSettings {
            ors_api_key,
            ors_base_url: var("ORS_BASE_URL").unwrap_or_else(|| defaults::DEFAULT_ORS_URL.to_string()),
        };

        let mut hos_rules = HosRules::default();
        if let Some(policy) = var("HOS_REST_POLICY") {
            hos_rules.rest_policy = policy
                .parse::<RestPolicy>()
                .context("HOS_REST_POLICY must be 'sleeper-split' or 'off-duty-10'")?;
        }

        let trip_start_time = match var("TRIP_START_TIME") {
            Some(s) => NaiveTime::parse_from_str(s.trim(), "%H:%M")
                .with_context(|| format!("TRIP_START_TIME must be HH:MM, got '{}'", s))?,
            None => defaults::default_trip_start(),
        };

        let driver_name = var("DRIVER_NAME")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| defaults::DEFAULT_DRIVER_NAME.to_string());

        if geocoder.backend == "nominatim" && geocoder.rate_limit_interval < Duration::from_secs(1) {
            tracing::warn!("⚠ NOMINATIM_RATE_LIMIT_MS below 1000 violates the public Nominatim usage policy");
        }

        Ok(Self {
            nats_url,
            geocoder,
            routing,
            hos_rules,
            trip_start_time,
            driver_name,
        })
    }
}
