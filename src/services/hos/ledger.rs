//! Running duty ledger: the simulation clock, per-day counters and the
//! day logs completed so far.
//!
//! The clock counts hours since midnight of the departure date, so the hour
//! of day is `clock - 24 * day_index`. Recording an activity that crosses
//! midnight splits it into one interval per day.

use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::error::{PlanError, Result};
use crate::types::{DayLog, DutyStatus, DutyStatusInterval};

/// Tolerance for hour comparisons
pub const HOURS_EPSILON: f64 = 1e-9;

/// Tolerance for mile comparisons
pub const MILES_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct DutyLedger {
    start_date: NaiveDate,
    current_date: NaiveDate,
    day_index: u32,
    clock: f64,
    departure_clock: f64,
    intervals: Vec<DutyStatusInterval>,
    days: Vec<DayLog>,
    day_miles: f64,

    pub driving_today: f64,
    pub on_duty_today: f64,
    /// A rest split finished on the current calendar day
    pub rested_today: bool,
    pub continuous_driving: f64,
    pub miles_since_refuel: f64,
    pub cycle_hours: f64,
}

impl DutyLedger {
    pub fn new(departure: NaiveDateTime, starting_cycle_hours: f64) -> Self {
        let time = departure.time();
        let clock = time.num_seconds_from_midnight() as f64 / 3600.0
            + time.nanosecond() as f64 / 3.6e12;

        Self {
            start_date: departure.date(),
            current_date: departure.date(),
            day_index: 0,
            clock,
            departure_clock: clock,
            intervals: Vec::new(),
            days: Vec::new(),
            day_miles: 0.0,
            driving_today: 0.0,
            on_duty_today: 0.0,
            rested_today: false,
            continuous_driving: 0.0,
            miles_since_refuel: 0.0,
            cycle_hours: starting_cycle_hours,
        }
    }

    pub fn day_index(&self) -> u32 {
        self.day_index
    }

    /// Hours since departure
    pub fn elapsed_hours(&self) -> f64 {
        self.clock - self.departure_clock
    }

    pub fn hours_until_midnight(&self) -> f64 {
        self.day_end() - self.clock
    }

    fn day_end(&self) -> f64 {
        24.0 * f64::from(self.day_index + 1)
    }

    /// Close the current day when the clock has reached midnight
    pub fn roll_over_midnight(&mut self) -> Result<()> {
        while self.clock >= self.day_end() - HOURS_EPSILON {
            self.flush_day()?;
        }
        Ok(())
    }

    fn flush_day(&mut self) -> Result<()> {
        self.days.push(DayLog {
            date: self.current_date,
            intervals: std::mem::take(&mut self.intervals),
            miles_driven: self.day_miles,
            cycle_hours_at_end: self.cycle_hours,
        });

        self.current_date = self
            .current_date
            .succ_opt()
            .ok_or_else(|| PlanError::invalid("trip runs past the last representable date"))?;
        self.day_index += 1;
        self.day_miles = 0.0;
        self.driving_today = 0.0;
        self.on_duty_today = 0.0;
        self.rested_today = false;
        Ok(())
    }

    /// Record `hours` of `status`, splitting at midnight. `miles` is spread
    /// over the pieces in proportion to their duration.
    pub fn record(&mut self, status: DutyStatus, hours: f64, miles: f64, remark: &str) -> Result<()> {
        let mut hours_left = hours;
        let mut miles_left = miles;

        while hours_left > HOURS_EPSILON {
            self.roll_over_midnight()?;

            let until_midnight = self.hours_until_midnight();
            let portion = if hours_left <= until_midnight + HOURS_EPSILON {
                hours_left
            } else {
                until_midnight
            };
            let portion_miles = miles_left * portion / hours_left;

            self.append(status, portion, portion_miles, remark);
            hours_left -= portion;
            miles_left -= portion_miles;
        }
        Ok(())
    }

    fn append(&mut self, status: DutyStatus, hours: f64, miles: f64, remark: &str) {
        let start_offset = self.clock - 24.0 * f64::from(self.day_index);

        // Consecutive pieces of the same activity become one interval
        match self.intervals.last_mut() {
            Some(last)
                if last.status == status
                    && last.remark == remark
                    && (last.end_offset() - start_offset).abs() < HOURS_EPSILON =>
            {
                last.duration_hours += hours;
            }
            _ => self.intervals.push(DutyStatusInterval {
                start_offset,
                duration_hours: hours,
                status,
                remark: remark.to_string(),
            }),
        }

        if status == DutyStatus::Driving {
            self.driving_today += hours;
        }
        if status.is_on_duty() {
            self.on_duty_today += hours;
            self.cycle_hours += hours;
        }
        self.day_miles += miles;
        self.clock += hours;
    }

    /// Close the last day and hand back the completed logs
    pub fn finish(mut self) -> Vec<DayLog> {
        if !self.intervals.is_empty() {
            self.days.push(DayLog {
                date: self.current_date,
                intervals: std::mem::take(&mut self.intervals),
                miles_driven: self.day_miles,
                cycle_hours_at_end: self.cycle_hours,
            });
        }
        self.days
    }

    /// Wall-clock time the ledger has reached
    pub fn now(&self) -> NaiveDateTime {
        let millis = (self.clock * 3_600_000.0).round() as i64;
        self.start_date.and_time(chrono::NaiveTime::MIN) + chrono::Duration::milliseconds(millis)
    }
}
