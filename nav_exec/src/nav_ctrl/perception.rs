//! Placing forward sensor detections into the map
//!
//! The three forward sensors see along fixed directions relative to the
//! robot: straight ahead, and 45 degrees either side. Each reading is first
//! turned into a `(forward, lateral)` offset in the robot's frame, lateral
//! being positive to the robot's right, and then rotated into the map frame
//! according to the heading.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::f64::consts::FRAC_PI_4;

use log::debug;
use serde::Serialize;

use super::{checked_point, NavCtrlError, Params};
use crate::{
    eqpt::{Distance, RangeSensing, SensorId},
    map::ObstacleMap,
    pose::{Point, Pose},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One reading from each of the forward facing sensors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ForwardReadings {
    pub front: Distance,
    pub front_left: Distance,
    pub front_right: Distance,
}

/// Offset from the robot's centre in the robot frame.
///
/// Wide enough to hold any reading plus the mounting offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LocalOffset {
    forward: i64,
    lateral: i64,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Compute the map positions of the obstacles seen by the forward sensors.
///
/// Points are in the order front, front-left, front-right. Readings are not
/// validated, a zero reading places an obstacle on the robot itself. Fails
/// with [`NavCtrlError::CoordinateOverflow`] if any point lies outside the
/// range of a map coordinate.
pub fn obstacle_points(
    pose: &Pose,
    readings: &ForwardReadings,
    params: &Params,
) -> Result<[Point; 3], NavCtrlError> {
    let offsets = [
        LocalOffset {
            forward: readings.front as i64 + params.vertical_offset_in as i64,
            lateral: 0,
        },
        diagonal_offset(readings.front_left, -1),
        diagonal_offset(readings.front_right, 1),
    ];

    let mut points = [pose.position; 3];
    for (point, offset) in points.iter_mut().zip(offsets.iter()) {
        let (dx, dy) = pose.heading.to_map_frame(offset.forward, offset.lateral);
        *point = checked_point(point.x as i64 + dx, point.y as i64 + dy)?;
    }

    Ok(points)
}

/// Read the forward sensors and register the three resulting obstacles into
/// the map.
///
/// Registers exactly three points if all three reads succeed and every point
/// can be represented, and none otherwise.
pub fn detect_obstacles<R, M>(
    pose: &Pose,
    sensors: &mut R,
    map: &mut M,
    params: &Params,
) -> Result<[Point; 3], NavCtrlError>
where
    R: RangeSensing,
    M: ObstacleMap,
{
    let readings = ForwardReadings {
        front: sensors.measure_distance(SensorId::Front)?,
        front_left: sensors.measure_distance(SensorId::FrontLeft)?,
        front_right: sensors.measure_distance(SensorId::FrontRight)?,
    };

    let points = obstacle_points(pose, &readings, params)?;

    debug!(
        "Detections from {} with {:?}: {}, {}, {}",
        pose, readings, points[0], points[1], points[2]
    );

    for point in points.iter() {
        map.register_obstacle(*point);
    }

    Ok(points)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Split a reading from a 45 degree sensor into its components, each
/// truncated towards zero. `side` is -1 for the left sensor and +1 for the
/// right.
fn diagonal_offset(distance: Distance, side: i64) -> LocalOffset {
    let d = distance as f64;

    LocalOffset {
        forward: (d * FRAC_PI_4.cos()) as i64,
        lateral: side * (d * FRAC_PI_4.sin()) as i64,
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
