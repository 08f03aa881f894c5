use chrono::NaiveTime;

pub const DEFAULT_NATS_URL: &str = "nats://localhost:4222";

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

pub const DEFAULT_ORS_URL: &str = "https://api.openrouteservice.org";

/// Nominatim allows 1 req/s
pub const DEFAULT_RATE_LIMIT_MS: u64 = 1500;

pub const DEFAULT_CIRCUIT_BREAKER_THRESHOLD: u32 = 3;

pub const DEFAULT_CIRCUIT_BREAKER_RECOVERY_SECS: u64 = 300;

pub const DEFAULT_DRIVER_NAME: &str = "Driver";

/// Placeholder value shipped in sample .env files
pub const ORS_PLACEHOLDER_KEY: &str = "your_ors_key_here";

pub fn default_trip_start() -> NaiveTime {
    NaiveTime::from_hms_opt(6, 30, 0).expect("valid static default trip start")
}
