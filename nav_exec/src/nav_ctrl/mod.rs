//! Navigation control module
//!
//! Keeps track of the robot's believed pose by dead reckoning. The pose is
//! established from the walls at startup ([`calibration`]), moved by drive
//! commands ([`kinematics`]) and used to place forward sensor detections into
//! the obstacle map ([`perception`]).

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod calibration;
mod cmd;
pub mod kinematics;
mod params;
pub mod perception;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use calibration::CalibrationReport;
pub use cmd::*;
pub use params::*;
pub use perception::ForwardReadings;
pub use state::*;

use std::convert::TryFrom;

use crate::{eqpt::EqptError, pose::Point};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during NavCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum NavCtrlError {
    #[error("Equipment error: {0}")]
    Eqpt(#[from] EqptError),

    #[error(
        "Calibration did not converge after {attempts} attempts \
        (x resolved: {x_resolved}, y resolved: {y_resolved})"
    )]
    CalibrationNotConverged {
        attempts: u32,
        x_resolved: bool,
        y_resolved: bool,
    },

    #[error("Cannot move a negative distance ({0} in), turn around instead")]
    NegativeDistance(i32),

    #[error("Invalid parameters: {0}")]
    InvalidParams(&'static str),

    #[error("The map coordinate ({x}, {y}) cannot be represented")]
    CoordinateOverflow {
        x: i64,
        y: i64,
    },
}

/// Possible errors that can occur while initialising NavCtrl.
#[derive(Debug, thiserror::Error)]
pub enum NavCtrlInitError {
    #[error("Could not load the parameters: {0}")]
    ParamsLoad(util::params::LoadError),

    #[error("Parameters rejected: {0}")]
    ParamsInvalid(NavCtrlError),

    #[error("Could not create the pose archive: {0}")]
    Archive(util::archive::ArchiveError),
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Narrow a wide coordinate back into a map point.
fn checked_point(x: i64, y: i64) -> Result<Point, NavCtrlError> {
    match (i32::try_from(x), i32::try_from(y)) {
        (Ok(x), Ok(y)) => Ok(Point::new(x, y)),
        _ => Err(NavCtrlError::CoordinateOverflow { x, y }),
    }
}
