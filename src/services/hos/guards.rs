//! Decision guards. Each rule gets its own guard; `next_step` asks them in
//! priority order and the first one that objects decides what happens next.

use super::ledger::{DutyLedger, HOURS_EPSILON, MILES_EPSILON};
use super::rules::HosRules;

/// What the driver does next
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Take the configured rest split
    Rest,
    /// Daily limits are still spent after today's rest; wait for the counters to reset
    OffDutyUntilMidnight,
    /// Mandatory break after continuous driving
    Break,
    Refuel,
    Drive { miles: f64 },
}

pub fn driving_left_today(rules: &HosRules, ledger: &DutyLedger) -> f64 {
    rules.max_daily_driving_hours - ledger.driving_today
}

pub fn on_duty_left_today(rules: &HosRules, ledger: &DutyLedger) -> f64 {
    rules.max_daily_on_duty_hours - ledger.on_duty_today
}

/// A rest split, unless one already ended today without freeing any room
pub fn rest_or_wait(ledger: &DutyLedger) -> Step {
    if ledger.rested_today {
        Step::OffDutyUntilMidnight
    } else {
        Step::Rest
    }
}

/// 11 h driving or 14 h on duty reached today
pub fn day_limit_guard(rules: &HosRules, ledger: &DutyLedger) -> Option<Step> {
    if driving_left_today(rules, ledger) < HOURS_EPSILON
        || on_duty_left_today(rules, ledger) < HOURS_EPSILON
    {
        Some(rest_or_wait(ledger))
    } else {
        None
    }
}

/// 8 h of driving since the last break or rest
pub fn break_guard(rules: &HosRules, ledger: &DutyLedger) -> Option<Step> {
    if ledger.continuous_driving < rules.max_continuous_driving_hours - HOURS_EPSILON {
        return None;
    }
    if on_duty_left_today(rules, ledger) < rules.break_hours - HOURS_EPSILON {
        return Some(rest_or_wait(ledger));
    }
    Some(Step::Break)
}

/// Refuel interval reached since the last fuel stop
pub fn refuel_guard(rules: &HosRules, ledger: &DutyLedger) -> Option<Step> {
    if ledger.miles_since_refuel < rules.refuel_interval_miles - MILES_EPSILON {
        return None;
    }
    if on_duty_left_today(rules, ledger) < rules.refuel_hours - HOURS_EPSILON {
        return Some(rest_or_wait(ledger));
    }
    Some(Step::Refuel)
}

/// Longest drive chunk that stops exactly at the nearest boundary
pub fn drive_step(rules: &HosRules, ledger: &DutyLedger, remaining_miles: f64) -> Step {
    let speed = rules.average_speed_mph;
    let hour_caps = [
        1.0,
        rules.max_continuous_driving_hours - ledger.continuous_driving,
        driving_left_today(rules, ledger),
        on_duty_left_today(rules, ledger),
        ledger.hours_until_midnight(),
    ];

    let miles = hour_caps
        .into_iter()
        .map(|hours| speed * hours)
        .chain([
            remaining_miles,
            rules.refuel_interval_miles - ledger.miles_since_refuel,
        ])
        .fold(f64::INFINITY, f64::min);

    Step::Drive { miles: miles.max(0.0) }
}

/// Pick the next step while `remaining_miles` are left on the current leg
pub fn next_step(rules: &HosRules, ledger: &DutyLedger, remaining_miles: f64) -> Step {
    day_limit_guard(rules, ledger)
        .or_else(|| break_guard(rules, ledger))
        .or_else(|| refuel_guard(rules, ledger))
        .unwrap_or_else(|| drive_step(rules, ledger, remaining_miles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ledger_at(hour: u32) -> DutyLedger {
        let departure = NaiveDate::from_ymd_opt(2025, 11, 17)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        DutyLedger::new(departure, 0.0)
    }

    fn drive_miles(step: Step) -> f64 {
        match step {
            Step::Drive { miles } => miles,
            other => panic!("expected a drive step, got {:?}", other),
        }
    }

    #[test]
    fn test_fresh_day_drives_one_hour_chunk() {
        let rules = HosRules::default();
        let ledger = ledger_at(6);

        let miles = drive_miles(next_step(&rules, &ledger, 500.0));
        assert!((miles - 55.0).abs() < 1e-9);
    }

    #[test]
    fn test_chunk_limited_by_remaining_distance() {
        let rules = HosRules::default();
        let ledger = ledger_at(6);

        assert_eq!(drive_miles(next_step(&rules, &ledger, 20.0)), 20.0);
    }

    #[test]
    fn test_day_limit_guard_on_driving_hours() {
        let rules = HosRules::default();
        let mut ledger = ledger_at(6);
        ledger.driving_today = 11.0;

        assert_eq!(day_limit_guard(&rules, &ledger), Some(Step::Rest));
        assert_eq!(next_step(&rules, &ledger, 100.0), Step::Rest);
    }

    #[test]
    fn test_day_limit_guard_on_on_duty_hours() {
        let rules = HosRules::default();
        let mut ledger = ledger_at(6);
        ledger.driving_today = 6.0;
        ledger.on_duty_today = 14.0;

        assert_eq!(day_limit_guard(&rules, &ledger), Some(Step::Rest));
    }

    #[test]
    fn test_day_limit_after_same_day_rest_waits_for_midnight() {
        let rules = HosRules::default();
        let mut ledger = ledger_at(6);
        ledger.driving_today = 11.0;
        ledger.rested_today = true;

        assert_eq!(day_limit_guard(&rules, &ledger), Some(Step::OffDutyUntilMidnight));
    }

    #[test]
    fn test_day_limit_guard_silent_below_limits() {
        let rules = HosRules::default();
        let mut ledger = ledger_at(6);
        ledger.driving_today = 10.9;
        ledger.on_duty_today = 13.9;

        assert_eq!(day_limit_guard(&rules, &ledger), None);
    }

    #[test]
    fn test_break_guard_after_eight_hours() {
        let rules = HosRules::default();
        let mut ledger = ledger_at(6);
        ledger.continuous_driving = 8.0;
        ledger.driving_today = 8.0;
        ledger.on_duty_today = 8.5;

        assert_eq!(break_guard(&rules, &ledger), Some(Step::Break));
        assert_eq!(next_step(&rules, &ledger, 100.0), Step::Break);
    }

    #[test]
    fn test_break_guard_rests_when_break_does_not_fit() {
        let rules = HosRules::default();
        let mut ledger = ledger_at(6);
        ledger.continuous_driving = 8.0;
        ledger.driving_today = 8.0;
        ledger.on_duty_today = 13.8;

        assert_eq!(break_guard(&rules, &ledger), Some(Step::Rest));
    }

    #[test]
    fn test_refuel_guard_at_interval() {
        let rules = HosRules::default();
        let mut ledger = ledger_at(6);
        ledger.miles_since_refuel = 1000.0;

        assert_eq!(refuel_guard(&rules, &ledger), Some(Step::Refuel));
        ledger.miles_since_refuel = 999.0;
        assert_eq!(refuel_guard(&rules, &ledger), None);
    }

    #[test]
    fn test_break_takes_priority_over_refuel() {
        let rules = HosRules::default();
        let mut ledger = ledger_at(6);
        ledger.continuous_driving = 8.0;
        ledger.driving_today = 8.0;
        ledger.on_duty_today = 8.0;
        ledger.miles_since_refuel = 1000.0;

        assert_eq!(next_step(&rules, &ledger, 100.0), Step::Break);
    }

    #[test]
    fn test_chunk_stops_at_continuous_driving_boundary() {
        let rules = HosRules::default();
        let mut ledger = ledger_at(6);
        ledger.continuous_driving = 7.75;

        let miles = drive_miles(drive_step(&rules, &ledger, 500.0));
        assert!((miles - 55.0 * 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_chunk_stops_at_daily_driving_boundary() {
        let rules = HosRules::default();
        let mut ledger = ledger_at(6);
        ledger.driving_today = 10.5;
        ledger.on_duty_today = 11.0;

        let miles = drive_miles(drive_step(&rules, &ledger, 500.0));
        assert!((miles - 27.5).abs() < 1e-9);
    }

    #[test]
    fn test_chunk_stops_at_on_duty_boundary() {
        let rules = HosRules::default();
        let mut ledger = ledger_at(6);
        ledger.driving_today = 5.0;
        ledger.on_duty_today = 13.6;

        let miles = drive_miles(drive_step(&rules, &ledger, 500.0));
        assert!((miles - 55.0 * 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_chunk_stops_at_refuel_mark() {
        let rules = HosRules::default();
        let mut ledger = ledger_at(6);
        ledger.miles_since_refuel = 990.0;

        assert!((drive_miles(drive_step(&rules, &ledger, 500.0)) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_chunk_stops_at_midnight() {
        let rules = HosRules::default();
        let mut ledger = ledger_at(23);
        ledger.record(crate::types::DutyStatus::OffDuty, 0.5, 0.0, "waiting").unwrap();

        let miles = drive_miles(drive_step(&rules, &ledger, 500.0));
        assert!((miles - 27.5).abs() < 1e-9);
    }
}
