//! Startup self-localisation
//!
//! Dead reckoning cannot know where the robot started, so on startup the four
//! side sensors are compared with the known size of the operating area. When
//! the front and back readings (plus mounting offsets) add up to the length of
//! the area the robot's `y` is its distance from the back wall, and likewise
//! left and right give `x` from the left wall.
//!
//! The walls are sampled a fixed number of times, every matching sample
//! overwrites the axis it resolves. There is no averaging and no early exit.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info, warn};
use serde::Serialize;

use super::{NavCtrlError, Params};
use crate::{
    eqpt::{RangeSensing, SensorId},
    map::MapExtent,
    pose::{Point, Pose},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Outcome of a calibration run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CalibrationReport {
    /// Number of times the walls were sampled.
    pub attempts: u32,

    /// Number of samples in which left and right matched the map width.
    pub x_matches: u32,

    /// Number of samples in which front and back matched the map length.
    pub y_matches: u32,

    /// Position after calibration.
    pub position: Point,
}

/// One sample of the four side sensors with the mounting offsets applied.
#[derive(Clone, Copy, Debug)]
struct WallSample {
    front: i64,
    right: i64,
    back: i64,
    left: i64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CalibrationReport {
    pub fn converged(&self) -> bool {
        self.x_matches > 0 && self.y_matches > 0
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Establish the absolute position of the robot from the walls of the map.
///
/// The heading is assumed to be correct and is left untouched. Any axis that
/// resolves is written into `pose` even if the other does not, an axis that
/// never resolves keeps its previous value and the call returns
/// [`NavCtrlError::CalibrationNotConverged`].
pub fn establish_starting_pose<R: RangeSensing>(
    pose: &mut Pose,
    sensors: &mut R,
    extent: MapExtent,
    params: &Params,
) -> Result<CalibrationReport, NavCtrlError> {
    let mut report = CalibrationReport::default();
    let tolerance = params.calib_tolerance_in as i64;

    for attempt in 1..=params.calib_num_attempts {
        let sample = sample_walls(sensors, params)?;
        report.attempts = attempt;

        let x_difference = extent.x_max as i64 - sample.right - sample.left;
        let y_difference = extent.y_max as i64 - sample.front - sample.back;

        debug!(
            "Calibration attempt {}: {:?}, x difference {}, y difference {}",
            attempt, sample, x_difference, y_difference
        );

        if y_difference.abs() <= tolerance {
            pose.position.y = sample.back as i32;
            report.y_matches += 1;
        }
        if x_difference.abs() <= tolerance {
            pose.position.x = sample.left as i32;
            report.x_matches += 1;
        }
    }

    report.position = pose.position;

    if report.converged() {
        info!(
            "Calibrated starting position {} ({} x matches, {} y matches)",
            pose.position, report.x_matches, report.y_matches
        );
        Ok(report)
    }
    else {
        warn!(
            "Calibration did not converge, position left at {} ({:?})",
            pose.position, report
        );
        Err(NavCtrlError::CalibrationNotConverged {
            attempts: report.attempts,
            x_resolved: report.x_matches > 0,
            y_resolved: report.y_matches > 0,
        })
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Read the four side sensors, in the order front, right, back, left.
fn sample_walls<R: RangeSensing>(
    sensors: &mut R,
    params: &Params,
) -> Result<WallSample, NavCtrlError> {
    let vertical = params.vertical_offset_in as i64;
    let horizontal = params.horizontal_offset_in as i64;

    let front = sensors.measure_distance(SensorId::Front)? as i64 + vertical;
    let right = sensors.measure_distance(SensorId::Right)? as i64 + horizontal;
    let back = sensors.measure_distance(SensorId::Back)? as i64 + vertical;
    let left = sensors.measure_distance(SensorId::Left)? as i64 + horizontal;

    Ok(WallSample { front, right, back, left })
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
