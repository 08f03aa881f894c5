//! Type definitions

pub mod duty;
pub mod location;
pub mod messages;
pub mod trip;

pub use duty::*;
pub use location::*;
pub use messages::*;
pub use trip::*;
