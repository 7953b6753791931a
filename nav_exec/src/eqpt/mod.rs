//! # Equipment Interface
//!
//! The navigation core talks to the robot's hardware through the traits in
//! this module. Real drivers and the simulation in [`crate::sim`] both
//! implement them.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod motors;
mod range;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use motors::*;
pub use range::*;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors raised by equipment drivers.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum EqptError {
    #[error("The {0:?} sensor returned {1} in, beyond its usable range")]
    OutOfRange(SensorId, Distance),

    #[error("No echo was received by the {0:?} sensor")]
    NoEcho(SensorId),

    #[error("The {0:?} sensor is faulty: {1}")]
    SensorFault(SensorId, String),

    #[error("Actuator fault: {0}")]
    Actuator(String),
}
