//! Parameters structure for NavCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::NavCtrlError;
use crate::eqpt::NEUTRAL_PULSE_US;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for navigation control.
///
/// All of these are empirical values measured on a particular robot. Missing
/// entries in a parameter file take the values measured on the prototype robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {

    // ---- GEOMETRY ----

    /// Distance from the front and back sensor faces to the robot's centre.
    ///
    /// Units: inches
    pub vertical_offset_in: i32,

    /// Distance from the left and right sensor faces to the robot's centre.
    ///
    /// Units: inches
    pub horizontal_offset_in: i32,

    /// Readings beyond this are treated as invalid by range drivers.
    ///
    /// Units: inches
    pub max_range_in: u32,

    // ---- DRIVE ----

    /// Ground speed of the robot when driving forward.
    ///
    /// Units: inches/second
    pub forward_speed_ips: f64,

    /// Left servo pulse when driving forward.
    ///
    /// Units: microseconds
    pub forward_left_pulse_us: u16,

    /// Right servo pulse when driving forward. Differs from the left one to
    /// cancel out the robot's drift.
    ///
    /// Units: microseconds
    pub forward_right_pulse_us: u16,

    /// Pulse sent to both servos to pivot left.
    ///
    /// Units: microseconds
    pub turn_left_pulse_us: u16,

    /// Pulse sent to both servos to pivot right.
    ///
    /// Units: microseconds
    pub turn_right_pulse_us: u16,

    /// Pulse which stops the servos.
    ///
    /// Units: microseconds
    pub neutral_pulse_us: u16,

    /// Time taken to pivot 90 degrees to the left.
    ///
    /// Units: milliseconds
    pub left_turn_duration_ms: u64,

    /// Amount by which right turns are shorter than left turns of the same
    /// angle.
    ///
    /// Units: milliseconds
    pub right_turn_adjustment_ms: u64,

    /// How the believed heading reacts to a turn.
    pub turn_heading_mode: TurnHeadingMode,

    // ---- CALIBRATION ----

    /// Number of times the walls are sampled during calibration.
    pub calib_num_attempts: u32,

    /// Largest mismatch between the summed opposing readings and the map
    /// extent which still resolves an axis. Zero requires an exact match.
    ///
    /// Units: inches
    pub calib_tolerance_in: u32,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Whether turning updates the believed heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnHeadingMode {
    /// Turns never change the believed heading. This is how the robot has
    /// always behaved, so moves and detections after a turn are computed as
    /// if it still faced its starting heading.
    Frozen,

    /// Turns rotate the believed heading by the commanded angle rounded to
    /// the nearest quarter turn.
    Tracked,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            vertical_offset_in: 4,
            horizontal_offset_in: 3,
            max_range_in: 300,
            forward_speed_ips: 5.0,
            forward_left_pulse_us: 1700,
            forward_right_pulse_us: 1400,
            turn_left_pulse_us: 1300,
            turn_right_pulse_us: 1700,
            neutral_pulse_us: NEUTRAL_PULSE_US,
            left_turn_duration_ms: 1200,
            right_turn_adjustment_ms: 400,
            turn_heading_mode: TurnHeadingMode::Frozen,
            calib_num_attempts: 6,
            calib_tolerance_in: 0,
        }
    }
}

impl Default for TurnHeadingMode {
    fn default() -> Self {
        TurnHeadingMode::Frozen
    }
}

impl Params {
    /// Check that the parameters describe a robot which can move.
    pub fn validate(&self) -> Result<(), NavCtrlError> {
        if !(self.forward_speed_ips.is_finite() && self.forward_speed_ips > 0.0) {
            return Err(NavCtrlError::InvalidParams(
                "forward_speed_ips must be a positive number"
            ));
        }
        if self.left_turn_duration_ms == 0 {
            return Err(NavCtrlError::InvalidParams(
                "left_turn_duration_ms must be greater than zero"
            ));
        }
        if self.calib_num_attempts == 0 {
            return Err(NavCtrlError::InvalidParams(
                "calib_num_attempts must be greater than zero"
            ));
        }
        if self.vertical_offset_in < 0 || self.horizontal_offset_in < 0 {
            return Err(NavCtrlError::InvalidParams(
                "sensor offsets cannot be negative"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Params::default().validate().is_ok());
    }

    #[test]
    fn test_partial_file() {
        let params: Params = toml::from_str(
            "forward_speed_ips = 6.5\nturn_heading_mode = \"tracked\"\n"
        ).unwrap();

        assert_eq!(params.forward_speed_ips, 6.5);
        assert_eq!(params.turn_heading_mode, TurnHeadingMode::Tracked);
        assert_eq!(params.left_turn_duration_ms, 1200);
        assert_eq!(params.calib_num_attempts, 6);
    }

    #[test]
    fn test_shipped_params() {
        let params: Params = toml::from_str(
            include_str!("../../../params/nav_ctrl.toml")
        ).unwrap();

        assert!(params.validate().is_ok());
        assert_eq!(
            params,
            Params {
                turn_heading_mode: TurnHeadingMode::Tracked,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_validate() {
        let mut params = Params::default();
        params.forward_speed_ips = 0.0;
        assert!(matches!(params.validate(), Err(NavCtrlError::InvalidParams(_))));

        let mut params = Params::default();
        params.calib_num_attempts = 0;
        assert!(matches!(params.validate(), Err(NavCtrlError::InvalidParams(_))));

        let mut params = Params::default();
        params.horizontal_offset_in = -1;
        assert!(matches!(params.validate(), Err(NavCtrlError::InvalidParams(_))));
    }
}
