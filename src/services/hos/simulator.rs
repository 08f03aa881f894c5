//! Hours-of-Service trip simulation
//!
//! Walks the trip (pre-trip, leg to pickup, loading, leg to dropoff,
//! post-trip) one step at a time, letting the guards decide when the driver
//! has to stop. The result is a per-day duty log.

use chrono::NaiveDateTime;
use tracing::debug;

use super::guards::{self, Step};
use super::ledger::{DutyLedger, HOURS_EPSILON, MILES_EPSILON};
use super::rules::HosRules;
use crate::error::{PlanError, Result};
use crate::types::{DutyStatus, TripPlan};

/// Loop ceiling; a valid trip needs a few steps per hour driven
const MAX_STEPS: usize = 100_000;

const PRE_TRIP_REMARK: &str = "Pre-trip inspection";
const PICKUP_REMARK: &str = "Pickup loading";
const POST_TRIP_REMARK: &str = "Post-trip inspection";
const REFUEL_REMARK: &str = "Fueling";
const WAIT_REMARK: &str = "Off duty until midnight";
const LEG_REMARKS: [&str; 2] = ["Driving to pickup", "Driving to dropoff"];

/// Inputs of one simulation
#[derive(Debug, Clone)]
pub struct SimulationInput {
    /// Current location to pickup, pickup to dropoff
    pub leg_miles: [f64; 2],
    pub starting_cycle_hours: f64,
    pub departure: NaiveDateTime,
}

/// Simulate the trip under `rules`. Deterministic: the same input always
/// yields the same plan.
pub fn simulate(rules: &HosRules, input: &SimulationInput) -> Result<TripPlan> {
    rules.validate()?;
    validate_input(rules, input)?;

    let total_miles: f64 = input.leg_miles.iter().sum();
    let lower_bound = input.starting_cycle_hours
        + total_miles / rules.average_speed_mph
        + rules.fixed_overhead_hours();
    if lower_bound > rules.cycle_limit_hours + HOURS_EPSILON {
        return Err(PlanError::infeasible(format!(
            "needs at least {:.1} on-duty hours against a {:.0}-hour cycle ({:.1} already used)",
            lower_bound, rules.cycle_limit_hours, input.starting_cycle_hours
        )));
    }

    let mut sim = Simulation {
        rules,
        ledger: DutyLedger::new(input.departure, input.starting_cycle_hours),
        steps: 0,
    };

    sim.on_duty_task(rules.pre_trip_hours, PRE_TRIP_REMARK)?;
    sim.drive_leg(input.leg_miles[0], LEG_REMARKS[0])?;
    sim.on_duty_task(rules.pickup_hours, PICKUP_REMARK)?;
    sim.drive_leg(input.leg_miles[1], LEG_REMARKS[1])?;
    sim.on_duty_task(rules.post_trip_hours, POST_TRIP_REMARK)?;

    let total_trip_duration_hours = sim.ledger.elapsed_hours();
    let final_cycle_hours = sim.ledger.cycle_hours;
    let arrival = sim.ledger.now();
    let days = sim.ledger.finish();

    if final_cycle_hours > rules.cycle_limit_hours + HOURS_EPSILON {
        return Err(PlanError::CycleExceeded {
            final_cycle_hours,
            limit: rules.cycle_limit_hours,
        });
    }

    let plan = TripPlan {
        days,
        leg_miles: input.leg_miles,
        total_distance_miles: total_miles,
        total_trip_duration_hours,
        final_cycle_hours,
        departure: input.departure,
        arrival,
    };

    debug!(
        "Simulated {:.1} mi: {} day(s), {:.2} h driving, {:.2} h elapsed, cycle {:.2} h",
        total_miles,
        plan.days.len(),
        plan.total_driving_hours(),
        total_trip_duration_hours,
        final_cycle_hours
    );

    Ok(plan)
}

fn validate_input(rules: &HosRules, input: &SimulationInput) -> Result<()> {
    for (i, miles) in input.leg_miles.iter().enumerate() {
        if !miles.is_finite() || *miles < 0.0 {
            return Err(PlanError::invalid(format!(
                "leg {} distance must be a non-negative number of miles, got {}",
                i + 1,
                miles
            )));
        }
    }

    let cycle = input.starting_cycle_hours;
    if !cycle.is_finite() || cycle < 0.0 || cycle > rules.cycle_limit_hours {
        return Err(PlanError::invalid(format!(
            "current cycle hours must be between 0 and {:.0}, got {}",
            rules.cycle_limit_hours, cycle
        )));
    }

    Ok(())
}

struct Simulation<'a> {
    rules: &'a HosRules,
    ledger: DutyLedger,
    steps: usize,
}

impl Simulation<'_> {
    fn tick(&mut self) -> Result<()> {
        self.steps += 1;
        if self.steps > MAX_STEPS {
            return Err(PlanError::infeasible("simulation did not converge"));
        }
        Ok(())
    }

    /// Fixed on-duty task; rests first when today's on-duty window is too short
    fn on_duty_task(&mut self, hours: f64, remark: &str) -> Result<()> {
        if hours <= HOURS_EPSILON {
            return Ok(());
        }

        loop {
            self.tick()?;
            self.ledger.roll_over_midnight()?;

            if guards::on_duty_left_today(self.rules, &self.ledger) >= hours - HOURS_EPSILON {
                return self.ledger.record(DutyStatus::OnDutyNotDriving, hours, 0.0, remark);
            }
            self.apply(guards::rest_or_wait(&self.ledger), remark)?;
        }
    }

    fn drive_leg(&mut self, miles: f64, remark: &str) -> Result<()> {
        let mut remaining = miles;

        while remaining > MILES_EPSILON {
            self.tick()?;
            self.ledger.roll_over_midnight()?;

            let step = guards::next_step(self.rules, &self.ledger, remaining);
            if let Step::Drive { miles } = step {
                remaining -= miles;
            }
            self.apply(step, remark)?;
        }
        Ok(())
    }

    fn apply(&mut self, step: Step, drive_remark: &str) -> Result<()> {
        let rules = self.rules;

        match step {
            Step::Rest => {
                let day = self.ledger.day_index();
                for block in rules.rest_blocks() {
                    self.ledger.record(block.status, block.hours, 0.0, &block.remark)?;
                }
                self.ledger.continuous_driving = 0.0;
                self.ledger.rested_today = self.ledger.day_index() == day;
            }
            Step::OffDutyUntilMidnight => {
                let hours = self.ledger.hours_until_midnight();
                self.ledger.record(DutyStatus::OffDuty, hours, 0.0, WAIT_REMARK)?;
            }
            Step::Break => {
                self.ledger.record(
                    DutyStatus::OnDutyNotDriving,
                    rules.break_hours,
                    0.0,
                    &rules.break_remark(),
                )?;
                self.ledger.continuous_driving = 0.0;
            }
            Step::Refuel => {
                self.ledger
                    .record(DutyStatus::OnDutyNotDriving, rules.refuel_hours, 0.0, REFUEL_REMARK)?;
                self.ledger.miles_since_refuel = 0.0;
            }
            Step::Drive { miles } => {
                let hours = miles / rules.average_speed_mph;
                self.ledger.record(DutyStatus::Driving, hours, miles, drive_remark)?;
                self.ledger.continuous_driving += hours;
                self.ledger.miles_since_refuel += miles;
            }
        }
        Ok(())
    }
}
