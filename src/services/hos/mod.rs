//! Hours-of-Service simulation
//!
//! Pure and synchronous: no I/O, no clock reads. Given leg distances, the
//! driver's cycle hours and a departure time, produce the duty log for every
//! calendar day of the trip.

mod guards;
mod ledger;
mod rules;
mod simulator;

pub use rules::{HosRules, RestPolicy};
pub use simulator::{simulate, SimulationInput};
