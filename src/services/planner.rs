//! Trip planning: geocode the stops, measure the legs, simulate HOS and
//! render one log sheet per day.

use std::sync::Arc;

use base64::Engine;
use chrono::{Local, NaiveDateTime, NaiveTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::defaults;
use crate::error::{PlanError, Result};
use crate::services::geocoding::{create_geocoder, Geocoder};
use crate::services::hos::{simulate, HosRules, SimulationInput};
use crate::services::log_sheet::render_log_sheet;
use crate::services::routing::{create_distance_service, FallbackDistance};
use crate::types::{
    DailyLogResult, DayLog, PlanTripRequest, PlanWarning, ResolvedLocation, TripPlanResult,
};

pub struct TripPlanner {
    geocoder: Arc<dyn Geocoder>,
    distances: FallbackDistance,
    rules: HosRules,
    trip_start_time: NaiveTime,
    default_driver: String,
}

impl TripPlanner {
    pub fn new(geocoder: Arc<dyn Geocoder>, distances: FallbackDistance, rules: HosRules) -> Self {
        Self {
            geocoder,
            distances,
            rules,
            trip_start_time: defaults::default_trip_start(),
            default_driver: defaults::DEFAULT_DRIVER_NAME.to_string(),
        }
    }

    /// Build the planner with the collaborators selected by configuration
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let geocoder: Arc<dyn Geocoder> = Arc::from(create_geocoder(&config.geocoder)?);
        info!("Geocoder initialized: {}", geocoder.name());

        let distances = create_distance_service(&config.routing)?;
        info!("Distance provider initialized: {}", distances.name());

        Ok(Self::new(geocoder, distances, config.hos_rules.clone())
            .with_start_time(config.trip_start_time)
            .with_default_driver(config.driver_name.clone()))
    }

    pub fn with_start_time(mut self, start: NaiveTime) -> Self {
        self.trip_start_time = start;
        self
    }

    pub fn with_default_driver(mut self, name: impl Into<String>) -> Self {
        self.default_driver = name.into();
        self
    }

    pub async fn plan_trip(&self, request: &PlanTripRequest) -> Result<TripPlanResult> {
        // Reject a bad cycle value before spending any lookups on it
        if !(0.0..=self.rules.cycle_limit_hours).contains(&request.current_cycle_hours) {
            return Err(PlanError::invalid(format!(
                "current cycle hours must be between 0 and {:.0}, got {}",
                self.rules.cycle_limit_hours, request.current_cycle_hours
            )));
        }

        let (current, pickup, dropoff) = futures::join!(
            self.resolve(&request.current_location),
            self.resolve(&request.pickup_location),
            self.resolve(&request.dropoff_location),
        );

        let (current, pickup, dropoff) = match (current, pickup, dropoff) {
            (Some(c), Some(p), Some(d)) => (c, p, d),
            (c, p, d) => {
                let locations = [
                    (c.is_none(), &request.current_location),
                    (p.is_none(), &request.pickup_location),
                    (d.is_none(), &request.dropoff_location),
                ]
                .into_iter()
                .filter(|(failed, _)| *failed)
                .map(|(_, query)| query.clone())
                .collect();
                return Err(PlanError::GeocodingFailed { locations });
            }
        };

        let (to_pickup, to_dropoff) = futures::join!(
            self.distances.leg_distance(&current.coordinates, &pickup.coordinates),
            self.distances.leg_distance(&pickup.coordinates, &dropoff.coordinates),
        );

        let warnings: Vec<PlanWarning> = [&to_pickup, &to_dropoff]
            .into_iter()
            .enumerate()
            .filter_map(|(leg, distance)| {
                distance.degraded_reason.as_ref().map(|reason| {
                    PlanWarning::provider_degraded(
                        leg,
                        format!("Leg {} uses great-circle distance ({})", leg + 1, reason),
                    )
                })
            })
            .collect();

        let departure = request.departure.unwrap_or_else(|| self.default_departure());
        let plan = simulate(
            &self.rules,
            &SimulationInput {
                leg_miles: [to_pickup.miles, to_dropoff.miles],
                starting_cycle_hours: request.current_cycle_hours,
                departure,
            },
        )?;

        let driver = request
            .driver_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(self.default_driver.as_str());

        let daily_logs = plan
            .days
            .iter()
            .enumerate()
            .map(|(i, day)| daily_log_result(i + 1, day, driver, self.rules.cycle_limit_hours))
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Planned trip {} -> {} -> {}: {:.1} mi, {} day(s), cycle {:.1} h",
            current.query,
            pickup.query,
            dropoff.query,
            plan.total_distance_miles,
            plan.days.len(),
            plan.final_cycle_hours
        );

        Ok(TripPlanResult {
            trip_id: Uuid::new_v4(),
            driver_name: driver.to_string(),
            current_location: current,
            pickup_location: pickup,
            dropoff_location: dropoff,
            current_cycle_hours: request.current_cycle_hours,
            leg_miles: plan.leg_miles,
            total_distance_miles: plan.total_distance_miles,
            total_time_hours: plan.total_trip_duration_hours,
            final_cycle_hours: plan.final_cycle_hours,
            estimated_days: plan.days.len(),
            departure: plan.departure,
            arrival: plan.arrival,
            daily_logs,
            warnings,
        })
    }

    /// Geocode one stop; errors count as unresolved
    async fn resolve(&self, query: &str) -> Option<ResolvedLocation> {
        match self.geocoder.geocode(query).await {
            Ok(Some(result)) => {
                debug!(
                    "Resolved '{}' to {} (confidence {:.2})",
                    query, result.display_name, result.confidence
                );
                Some(ResolvedLocation {
                    query: query.to_string(),
                    coordinates: result.coordinates,
                    display_name: result.display_name,
                })
            }
            Ok(None) => {
                warn!("{} could not resolve '{}'", self.geocoder.name(), query);
                None
            }
            Err(e) => {
                warn!("{} failed for '{}': {:#}", self.geocoder.name(), query, e);
                None
            }
        }
    }

    fn default_departure(&self) -> NaiveDateTime {
        Local::now().date_naive().and_time(self.trip_start_time)
    }
}

fn daily_log_result(
    sequence: usize,
    day: &DayLog,
    driver: &str,
    cycle_limit_hours: f64,
) -> Result<DailyLogResult> {
    let png = render_log_sheet(day, driver, cycle_limit_hours)?;

    Ok(DailyLogResult {
        sequence,
        date: day.date,
        miles: day.miles_driven,
        driving_hours: day.driving_hours(),
        on_duty_hours: day.on_duty_hours(),
        intervals: day.intervals.clone(),
        image_b64: base64::engine::general_purpose::STANDARD.encode(png),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::geocoding::GeocodingResult;
    use crate::services::routing::DistanceProvider;
    use crate::types::Coordinates;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Resolves a fixed set of places; "Boom" errors, anything else is unknown
    struct FakeGeocoder {
        places: HashMap<&'static str, Coordinates>,
        calls: AtomicUsize,
    }

    impl FakeGeocoder {
        fn new() -> Self {
            let places = HashMap::from([
                ("Chicago, IL", Coordinates { lat: 41.8781, lng: -87.6298 }),
                ("Gary, IN", Coordinates { lat: 41.5934, lng: -87.3464 }),
                ("Columbus, OH", Coordinates { lat: 39.9612, lng: -82.9988 }),
                ("Dallas, TX", Coordinates { lat: 32.7767, lng: -96.7970 }),
            ]);
            Self { places, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn geocode(&self, query: &str) -> anyhow::Result<Option<GeocodingResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if query == "Boom" {
                anyhow::bail!("geocoder unavailable");
            }
            Ok(self.places.get(query).map(|c| GeocodingResult {
                coordinates: *c,
                confidence: 1.0,
                display_name: format!("{} (fake)", query),
            }))
        }

        fn name(&self) -> &'static str {
            "Fake"
        }
    }

    struct FixedProvider(f64);

    #[async_trait]
    impl DistanceProvider for FixedProvider {
        async fn route_distance(&self, _: &Coordinates, _: &Coordinates) -> anyhow::Result<f64> {
            Ok(self.0)
        }

        fn name(&self) -> &str {
            "Fixed"
        }
    }

    struct DownProvider;

    #[async_trait]
    impl DistanceProvider for DownProvider {
        async fn route_distance(&self, _: &Coordinates, _: &Coordinates) -> anyhow::Result<f64> {
            anyhow::bail!("HTTP 503")
        }

        fn name(&self) -> &str {
            "Down"
        }
    }

    fn build_planner(distances: FallbackDistance) -> (TripPlanner, Arc<FakeGeocoder>) {
        let geocoder = Arc::new(FakeGeocoder::new());
        let planner = TripPlanner::new(geocoder.clone(), distances, HosRules::default());
        (planner, geocoder)
    }

    fn departure() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 11, 17)
            .unwrap()
            .and_hms_opt(6, 30, 0)
            .unwrap()
    }

    fn request(current: &str, pickup: &str, dropoff: &str, cycle: f64) -> PlanTripRequest {
        PlanTripRequest {
            current_location: current.to_string(),
            pickup_location: pickup.to_string(),
            dropoff_location: dropoff.to_string(),
            current_cycle_hours: cycle,
            driver_name: Some("Jane Roe".to_string()),
            departure: Some(departure()),
        }
    }

    #[tokio::test]
    async fn test_plan_trip_single_day() {
        let (planner, _) = build_planner(FallbackDistance::new(Box::new(FixedProvider(125.0))));
        let result = planner
            .plan_trip(&request("Chicago, IL", "Gary, IN", "Columbus, OH", 0.0))
            .await
            .unwrap();

        assert_eq!(result.trip_id.get_version_num(), 4);
        assert_eq!(result.leg_miles, [125.0, 125.0]);
        assert_eq!(result.total_distance_miles, 250.0);
        assert_eq!(result.estimated_days, 1);
        assert_eq!(result.daily_logs.len(), 1);
        assert!(result.warnings.is_empty());
        assert_eq!(result.pickup_location.display_name, "Gary, IN (fake)");
        assert_eq!(result.departure, departure());

        let day = &result.daily_logs[0];
        assert_eq!(day.sequence, 1);
        assert_eq!(day.date, departure().date());
        assert!((day.driving_hours - 250.0 / 55.0).abs() < 1e-9);

        let png = base64::engine::general_purpose::STANDARD
            .decode(&day.image_b64)
            .unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[tokio::test]
    async fn test_plan_trip_multi_day_sequences() {
        let (planner, _) = build_planner(FallbackDistance::new(Box::new(FixedProvider(400.0))));
        let result = planner
            .plan_trip(&request("Chicago, IL", "Gary, IN", "Columbus, OH", 0.0))
            .await
            .unwrap();

        assert!(result.estimated_days >= 2);
        let sequences: Vec<usize> = result.daily_logs.iter().map(|d| d.sequence).collect();
        assert_eq!(sequences, (1..=result.estimated_days).collect::<Vec<_>>());
        assert!(result.arrival > result.departure);
    }

    #[tokio::test]
    async fn test_plan_trip_reports_every_unresolved_location() {
        let (planner, _) = build_planner(FallbackDistance::great_circle_only());
        let err = planner
            .plan_trip(&request("Atlantis", "Gary, IN", "Boom", 0.0))
            .await
            .unwrap_err();

        match err {
            PlanError::GeocodingFailed { locations } => {
                assert_eq!(locations, vec!["Atlantis".to_string(), "Boom".to_string()]);
            }
            other => panic!("expected GeocodingFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_plan_trip_degraded_provider_falls_back_per_leg() {
        let (planner, _) = build_planner(FallbackDistance::new(Box::new(DownProvider)));
        let result = planner
            .plan_trip(&request("Chicago, IL", "Gary, IN", "Columbus, OH", 0.0))
            .await
            .unwrap();

        assert_eq!(result.warnings.len(), 2);
        assert_eq!(result.warnings[0].leg_index, Some(0));
        assert_eq!(result.warnings[1].leg_index, Some(1));
        assert!(result.warnings.iter().all(|w| w.warning_type == PlanWarning::PROVIDER_DEGRADED));

        // Chicago to Gary is ~20 mi in a straight line
        assert!(result.leg_miles[0] > 10.0 && result.leg_miles[0] < 30.0);
    }

    #[tokio::test]
    async fn test_plan_trip_without_routing_has_no_warnings() {
        let (planner, _) = build_planner(FallbackDistance::great_circle_only());
        let result = planner
            .plan_trip(&request("Chicago, IL", "Gary, IN", "Columbus, OH", 0.0))
            .await
            .unwrap();

        assert!(result.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_plan_trip_infeasible_cycle() {
        let (planner, _) = build_planner(FallbackDistance::new(Box::new(FixedProvider(150.0))));
        let err = planner
            .plan_trip(&request("Chicago, IL", "Gary, IN", "Columbus, OH", 68.0))
            .await
            .unwrap_err();

        assert!(matches!(err, PlanError::TripInfeasible { .. } | PlanError::CycleExceeded { .. }));
    }

    #[tokio::test]
    async fn test_plan_trip_rejects_bad_cycle_hours_before_geocoding() {
        let (planner, geocoder) = build_planner(FallbackDistance::great_circle_only());

        for cycle in [-1.0, 70.5, f64::NAN] {
            let err = planner
                .plan_trip(&request("Chicago, IL", "Gary, IN", "Columbus, OH", cycle))
                .await
                .unwrap_err();
            assert!(matches!(err, PlanError::InvalidInput { .. }));
        }
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_plan_trip_defaults_departure_and_driver() {
        let start = NaiveTime::from_hms_opt(5, 15, 0).unwrap();
        let (planner, _) = build_planner(FallbackDistance::new(Box::new(FixedProvider(10.0))));
        let planner = planner.with_start_time(start).with_default_driver("Default Driver");

        let mut req = request("Chicago, IL", "Gary, IN", "Columbus, OH", 0.0);
        req.departure = None;
        req.driver_name = Some("   ".to_string());

        let result = planner.plan_trip(&req).await.unwrap();
        assert_eq!(result.departure.time(), start);
        assert_eq!(result.driver_name, "Default Driver");
    }

    #[tokio::test]
    async fn test_plan_trip_trims_driver_name() {
        let (planner, _) = build_planner(FallbackDistance::new(Box::new(FixedProvider(10.0))));

        let mut req = request("Chicago, IL", "Gary, IN", "Columbus, OH", 0.0);
        req.driver_name = Some("  Jane Roe ".to_string());

        let result = planner.plan_trip(&req).await.unwrap();
        assert_eq!(result.driver_name, "Jane Roe");
    }
}
