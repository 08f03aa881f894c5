//! Hours-of-Service limits

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::PlanError;
use crate::types::DutyStatus;

/// Shape of the rest taken when a daily limit is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestPolicy {
    /// Sleeper berth block followed by an off-duty block (7 h + 3 h)
    #[default]
    SleeperSplit,
    /// One continuous off-duty block (10 h)
    OffDuty10,
}

impl RestPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            RestPolicy::SleeperSplit => "sleeper-split",
            RestPolicy::OffDuty10 => "off-duty-10",
        }
    }
}

impl fmt::Display for RestPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown rest policy '{0}' (expected 'sleeper-split' or 'off-duty-10')")]
pub struct ParseRestPolicyError(String);

impl FromStr for RestPolicy {
    type Err = ParseRestPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "sleeper-split" | "split" => Ok(RestPolicy::SleeperSplit),
            "off-duty-10" | "off-duty" | "10h" => Ok(RestPolicy::OffDuty10),
            _ => Err(ParseRestPolicyError(s.to_string())),
        }
    }
}

/// One block of a rest split
#[derive(Debug, Clone, PartialEq)]
pub struct RestBlock {
    pub status: DutyStatus,
    pub hours: f64,
    pub remark: String,
}

/// Property-carrier HOS limits (70-hour/8-day cycle)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HosRules {
    pub max_continuous_driving_hours: f64,
    pub break_hours: f64,
    pub max_daily_driving_hours: f64,
    pub max_daily_on_duty_hours: f64,
    pub cycle_limit_hours: f64,
    pub rest_policy: RestPolicy,
    pub sleeper_berth_hours: f64,
    pub split_off_duty_hours: f64,
    pub long_rest_hours: f64,
    pub refuel_interval_miles: f64,
    pub refuel_hours: f64,
    pub average_speed_mph: f64,
    pub pre_trip_hours: f64,
    pub pickup_hours: f64,
    pub post_trip_hours: f64,
}

impl Default for HosRules {
    fn default() -> Self {
        Self {
            max_continuous_driving_hours: 8.0,
            break_hours: 0.5,
            max_daily_driving_hours: 11.0,
            max_daily_on_duty_hours: 14.0,
            cycle_limit_hours: 70.0,
            rest_policy: RestPolicy::SleeperSplit,
            sleeper_berth_hours: 7.0,
            split_off_duty_hours: 3.0,
            long_rest_hours: 10.0,
            refuel_interval_miles: 1000.0,
            refuel_hours: 0.5,
            average_speed_mph: 55.0,
            pre_trip_hours: 0.5,
            pickup_hours: 1.0,
            post_trip_hours: 0.5,
        }
    }
}

impl HosRules {
    pub fn with_rest_policy(mut self, rest_policy: RestPolicy) -> Self {
        self.rest_policy = rest_policy;
        self
    }

    /// Pre-trip, pickup loading and post-trip combined
    pub fn fixed_overhead_hours(&self) -> f64 {
        self.pre_trip_hours + self.pickup_hours + self.post_trip_hours
    }

    /// Blocks making up one rest split, in order
    pub fn rest_blocks(&self) -> Vec<RestBlock> {
        match self.rest_policy {
            RestPolicy::SleeperSplit => vec![
                RestBlock {
                    status: DutyStatus::SleeperBerth,
                    hours: self.sleeper_berth_hours,
                    remark: format!("{}hr sleeper berth rest", format_hours(self.sleeper_berth_hours)),
                },
                RestBlock {
                    status: DutyStatus::OffDuty,
                    hours: self.split_off_duty_hours,
                    remark: format!("{}hr off-duty rest", format_hours(self.split_off_duty_hours)),
                },
            ],
            RestPolicy::OffDuty10 => vec![RestBlock {
                status: DutyStatus::OffDuty,
                hours: self.long_rest_hours,
                remark: format!("{}hr off-duty rest", format_hours(self.long_rest_hours)),
            }],
        }
    }

    pub fn break_remark(&self) -> String {
        format!("{}-min rest break", format_hours(self.break_hours * 60.0))
    }

    /// Reject rule sets the simulator cannot make progress with
    pub fn validate(&self) -> Result<(), PlanError> {
        let positive = [
            ("maxContinuousDrivingHours", self.max_continuous_driving_hours),
            ("breakHours", self.break_hours),
            ("maxDailyDrivingHours", self.max_daily_driving_hours),
            ("maxDailyOnDutyHours", self.max_daily_on_duty_hours),
            ("cycleLimitHours", self.cycle_limit_hours),
            ("refuelIntervalMiles", self.refuel_interval_miles),
            ("refuelHours", self.refuel_hours),
            ("averageSpeedMph", self.average_speed_mph),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(PlanError::invalid(format!("{} must be positive, got {}", name, value)));
            }
        }

        let non_negative = [
            ("preTripHours", self.pre_trip_hours),
            ("pickupHours", self.pickup_hours),
            ("postTripHours", self.post_trip_hours),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(PlanError::invalid(format!("{} must not be negative, got {}", name, value)));
            }
        }

        if self.rest_blocks().iter().any(|b| !b.hours.is_finite() || b.hours <= 0.0) {
            return Err(PlanError::invalid("rest blocks must be positive"));
        }

        // Every on-duty task has to fit inside one day's on-duty window
        let longest_task = [
            self.break_hours,
            self.refuel_hours,
            self.pre_trip_hours,
            self.pickup_hours,
            self.post_trip_hours,
        ]
        .into_iter()
        .fold(0.0, f64::max);
        if longest_task > self.max_daily_on_duty_hours || self.max_daily_on_duty_hours > 24.0 {
            return Err(PlanError::invalid(
                "on-duty tasks must fit within the daily on-duty limit, which must fit in a day",
            ));
        }

        Ok(())
    }
}

/// "7" for whole hours, "7.5" otherwise
fn format_hours(hours: f64) -> String {
    if (hours - hours.round()).abs() < 1e-9 {
        format!("{}", hours.round() as i64)
    } else {
        format!("{:.1}", hours)
    }
}
