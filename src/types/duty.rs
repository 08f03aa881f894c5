//! Duty status types produced by the HOS simulator

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Duty status, in the order of the four lines on a paper log sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyStatus {
    OffDuty,
    SleeperBerth,
    Driving,
    OnDutyNotDriving,
}

impl DutyStatus {
    pub const ALL: [DutyStatus; 4] = [
        DutyStatus::OffDuty,
        DutyStatus::SleeperBerth,
        DutyStatus::Driving,
        DutyStatus::OnDutyNotDriving,
    ];

    /// Regulatory line number (1-4)
    pub const fn line(self) -> u8 {
        match self {
            DutyStatus::OffDuty => 1,
            DutyStatus::SleeperBerth => 2,
            DutyStatus::Driving => 3,
            DutyStatus::OnDutyNotDriving => 4,
        }
    }

    /// Label printed next to the lane on the log sheet
    pub const fn label(self) -> &'static str {
        match self {
            DutyStatus::OffDuty => "1. Off Duty",
            DutyStatus::SleeperBerth => "2. Sleeper Berth",
            DutyStatus::Driving => "3. Driving",
            DutyStatus::OnDutyNotDriving => "4. On Duty Not Driving",
        }
    }

    /// Driving and on-duty-not-driving both count toward on-duty limits
    pub const fn is_on_duty(self) -> bool {
        matches!(self, DutyStatus::Driving | DutyStatus::OnDutyNotDriving)
    }
}

/// One scheduled activity within a day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DutyStatusInterval {
    /// Hour of day the interval starts at (0.0 = midnight)
    pub start_offset: f64,
    pub duration_hours: f64,
    pub status: DutyStatus,
    pub remark: String,
}

impl DutyStatusInterval {
    pub fn end_offset(&self) -> f64 {
        self.start_offset + self.duration_hours
    }
}

/// One calendar day of intervals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayLog {
    pub date: NaiveDate,
    /// Chronological, contiguous intervals
    pub intervals: Vec<DutyStatusInterval>,
    pub miles_driven: f64,
    /// Cycle hours accrued once the day's last interval ends
    pub cycle_hours_at_end: f64,
}

impl DayLog {
    /// Total hours logged under `status`
    pub fn hours_in(&self, status: DutyStatus) -> f64 {
        self.intervals
            .iter()
            .filter(|i| i.status == status)
            .map(|i| i.duration_hours)
            .sum()
    }

    pub fn driving_hours(&self) -> f64 {
        self.hours_in(DutyStatus::Driving)
    }

    pub fn on_duty_hours(&self) -> f64 {
        self.hours_in(DutyStatus::Driving) + self.hours_in(DutyStatus::OnDutyNotDriving)
    }

    #[cfg(test)]
    pub fn logged_hours(&self) -> f64 {
        self.intervals.iter().map(|i| i.duration_hours).sum()
    }
}

/// Full simulation output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPlan {
    pub days: Vec<DayLog>,
    pub leg_miles: [f64; 2],
    pub total_distance_miles: f64,
    pub total_trip_duration_hours: f64,
    pub final_cycle_hours: f64,
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
}

impl TripPlan {
    pub fn total_driving_hours(&self) -> f64 {
        self.days.iter().map(DayLog::driving_hours).sum()
    }

    /// All intervals across all days, in order
    #[cfg(test)]
    pub fn intervals(&self) -> impl Iterator<Item = &DutyStatusInterval> {
        self.days.iter().flat_map(|d| d.intervals.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval(start: f64, dur: f64, status: DutyStatus) -> DutyStatusInterval {
        DutyStatusInterval {
            start_offset: start,
            duration_hours: dur,
            status,
            remark: String::new(),
        }
    }

    #[test]
    fn test_duty_status_lines() {
        let lines: Vec<u8> = DutyStatus::ALL.iter().map(|s| s.line()).collect();
        assert_eq!(lines, vec![1, 2, 3, 4]);
        assert!(DutyStatus::Driving.is_on_duty());
        assert!(DutyStatus::OnDutyNotDriving.is_on_duty());
        assert!(!DutyStatus::SleeperBerth.is_on_duty());
    }

    #[test]
    fn test_day_log_totals() {
        let day = DayLog {
            date: NaiveDate::from_ymd_opt(2025, 11, 17).unwrap(),
            intervals: vec![
                interval(6.0, 0.5, DutyStatus::OnDutyNotDriving),
                interval(6.5, 4.0, DutyStatus::Driving),
                interval(10.5, 10.0, DutyStatus::OffDuty),
            ],
            miles_driven: 220.0,
            cycle_hours_at_end: 4.5,
        };

        assert_eq!(day.driving_hours(), 4.0);
        assert_eq!(day.on_duty_hours(), 4.5);
        assert_eq!(day.logged_hours(), 14.5);
        assert_eq!(day.intervals[1].end_offset(), 10.5);
    }

    #[test]
    fn test_duty_status_serializes_snake_case() {
        let json = serde_json::to_string(&DutyStatus::OnDutyNotDriving).unwrap();
        assert_eq!(json, "\"on_duty_not_driving\"");
    }
}
