//! Open loop drive commands
//!
//! The robot has no wheel encoders. Moves and turns are timed using the
//! calibrated forward speed and quarter turn duration, and the believed pose
//! is updated as if the motion happened exactly as commanded.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, warn};

use super::{checked_point, NavCtrlError, Params, TurnHeadingMode};
use crate::{
    eqpt::{Actuation, MotorLease},
    pose::Pose,
};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Time needed to drive `distance_in` at the calibrated forward speed.
///
/// Units: milliseconds
pub fn move_duration_ms(distance_in: u32, params: &Params) -> u64 {
    (distance_in as f64 / params.forward_speed_ips * 1000.0).round() as u64
}

/// Time needed to pivot through `angle_deg`, positive angles turn left.
///
/// Right turns are shortened by the right turn adjustment, never below zero.
///
/// Units: milliseconds
pub fn turn_duration_ms(angle_deg: i32, params: &Params) -> u64 {
    let is_left = angle_deg > 0;
    let angle = (angle_deg as i64).abs() as f64;

    let duration = (angle / 90.0 * params.left_turn_duration_ms as f64).round() as i64;

    if is_left {
        duration as u64
    }
    else {
        (duration - params.right_turn_adjustment_ms as i64).max(0) as u64
    }
}

/// Drive forward by `distance_in` and update the believed position along the
/// current heading.
///
/// Moves whose end point cannot be represented as a map coordinate are
/// rejected before the motors are touched.
///
/// Returns the drive duration in milliseconds.
pub fn move_forward<A: Actuation>(
    pose: &mut Pose,
    motors: &mut A,
    distance_in: i32,
    params: &Params,
) -> Result<u64, NavCtrlError> {
    if distance_in < 0 {
        return Err(NavCtrlError::NegativeDistance(distance_in));
    }

    let step = pose.heading.unit_step();
    let target = checked_point(
        pose.position.x as i64 + step.x as i64 * distance_in as i64,
        pose.position.y as i64 + step.y as i64 * distance_in as i64,
    )?;

    let duration_ms = move_duration_ms(distance_in as u32, params);

    debug!(
        "Moving {} in facing {} ({} ms)",
        distance_in, pose.heading, duration_ms
    );

    {
        let mut lease = MotorLease::acquire(motors)?;
        lease.drive(
            params.forward_left_pulse_us,
            params.forward_right_pulse_us,
            duration_ms,
        )?;
    }

    pose.position = target;

    Ok(duration_ms)
}

/// Pivot on the spot by `angle_deg`, positive angles turn left.
///
/// Whether the believed heading follows the turn is selected by
/// [`Params::turn_heading_mode`]. A zero angle does nothing.
///
/// Returns the drive duration in milliseconds.
pub fn turn<A: Actuation>(
    pose: &mut Pose,
    motors: &mut A,
    angle_deg: i32,
    params: &Params,
) -> Result<u64, NavCtrlError> {
    if angle_deg == 0 {
        debug!("Zero angle turn requested, ignoring");
        return Ok(0);
    }

    let pulse_us = if angle_deg > 0 {
        params.turn_left_pulse_us
    }
    else {
        params.turn_right_pulse_us
    };
    let duration_ms = turn_duration_ms(angle_deg, params);

    if duration_ms == 0 {
        warn!(
            "Turn of {} deg is shorter than the right turn adjustment, \
            the robot will not move",
            angle_deg
        );
    }

    debug!("Turning {} deg ({} ms)", angle_deg, duration_ms);

    {
        let mut lease = MotorLease::acquire(motors)?;
        lease.drive(pulse_us, pulse_us, duration_ms)?;
        lease.drive(params.neutral_pulse_us, params.neutral_pulse_us, 0)?;
    }

    match params.turn_heading_mode {
        TurnHeadingMode::Frozen => (),
        TurnHeadingMode::Tracked => {
            let quarter_turns = (angle_deg as f64 / 90.0).round() as i32;
            pose.heading = pose.heading.rotated(quarter_turns);
            debug!("Heading now {}", pose.heading);
        }
    }

    Ok(duration_ms)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        eqpt::EqptError,
        pose::{Heading, Point},
        sim::{MotorEvent, RecordingMotors},
    };

    fn tracked() -> Params {
        Params {
            turn_heading_mode: TurnHeadingMode::Tracked,
            ..Default::default()
        }
    }

    #[test]
    fn test_move_durations() {
        let params = Params::default();

        assert_eq!(move_duration_ms(0, &params), 0);
        assert_eq!(move_duration_ms(5, &params), 1000);
        assert_eq!(move_duration_ms(12, &params), 2400);
        assert_eq!(move_duration_ms(7, &params), 1400);
    }

    #[test]
    fn test_turn_durations() {
        let params = Params::default();

        assert_eq!(turn_duration_ms(90, &params), 1200);
        assert_eq!(turn_duration_ms(-90, &params), 800);
        assert_eq!(turn_duration_ms(45, &params), 600);
        assert_eq!(turn_duration_ms(180, &params), 2400);
        assert_eq!(turn_duration_ms(-180, &params), 2000);
        assert_eq!(turn_duration_ms(1, &params), 13);

        // Short right turns saturate rather than going negative
        assert_eq!(turn_duration_ms(-20, &params), 0);
    }

    #[test]
    fn test_move_along_each_heading() -> Result<(), NavCtrlError> {
        let params = Params::default();
        let cases = [
            (Heading::Forward, Point::new(10, 22)),
            (Heading::Left, Point::new(-2, 10)),
            (Heading::Backward, Point::new(10, -2)),
            (Heading::Right, Point::new(22, 10)),
        ];

        for (heading, expected) in cases.iter() {
            let mut pose = Pose::new(Point::new(10, 10), *heading);
            let mut motors = RecordingMotors::default();

            let duration = move_forward(&mut pose, &mut motors, 12, &params)?;

            assert_eq!(duration, 2400);
            assert_eq!(pose.position, *expected);
            assert_eq!(pose.heading, *heading);
        }

        Ok(())
    }

    #[test]
    fn test_move_actuation() -> Result<(), NavCtrlError> {
        let params = Params::default();
        let mut pose = Pose::default();
        let mut motors = RecordingMotors::default();

        move_forward(&mut pose, &mut motors, 10, &params)?;

        assert_eq!(
            motors.events(),
            &[
                MotorEvent::Attach,
                MotorEvent::Drive { left_us: 1700, right_us: 1400, duration_ms: 2000 },
                MotorEvent::Detach,
            ]
        );

        Ok(())
    }

    #[test]
    fn test_zero_move() -> Result<(), NavCtrlError> {
        let params = Params::default();
        let mut pose = Pose::new(Point::new(4, 4), Heading::Left);
        let mut motors = RecordingMotors::default();

        assert_eq!(move_forward(&mut pose, &mut motors, 0, &params)?, 0);

        assert_eq!(pose.position, Point::new(4, 4));
        assert_eq!(
            motors.events(),
            &[
                MotorEvent::Attach,
                MotorEvent::Drive { left_us: 1700, right_us: 1400, duration_ms: 0 },
                MotorEvent::Detach,
            ]
        );

        Ok(())
    }

    #[test]
    fn test_negative_move_rejected() {
        let params = Params::default();
        let mut pose = Pose::default();
        let mut motors = RecordingMotors::default();

        let result = move_forward(&mut pose, &mut motors, -3, &params);

        assert!(matches!(result, Err(NavCtrlError::NegativeDistance(-3))));
        assert_eq!(pose, Pose::default());
        assert!(motors.events().is_empty());
    }

    #[test]
    fn test_move_overflow_rejected() {
        let params = Params::default();
        let mut motors = RecordingMotors::default();

        let start = Pose::new(Point::new(0, i32::MAX - 5), Heading::Forward);
        let mut pose = start;
        let result = move_forward(&mut pose, &mut motors, 10, &params);

        assert!(matches!(result, Err(NavCtrlError::CoordinateOverflow { x: 0, .. })));
        assert_eq!(pose, start);
        assert!(motors.events().is_empty());

        let start = Pose::new(Point::new(-10, 0), Heading::Left);
        let mut pose = start;
        assert!(matches!(
            move_forward(&mut pose, &mut motors, i32::MAX, &params),
            Err(NavCtrlError::CoordinateOverflow { .. })
        ));
        assert_eq!(pose, start);
    }

    #[test]
    fn test_huge_move_in_range() -> Result<(), NavCtrlError> {
        let params = Params::default();
        let mut pose = Pose::new(Point::new(0, -1), Heading::Forward);
        let mut motors = RecordingMotors::default();

        let duration = move_forward(&mut pose, &mut motors, i32::MAX, &params)?;

        assert_eq!(pose.position, Point::new(0, i32::MAX - 1));
        assert_eq!(duration, 429_496_729_400);

        Ok(())
    }

    #[test]
    fn test_failed_drive_still_detaches() {
        let params = Params::default();
        let mut pose = Pose::default();
        let mut motors = RecordingMotors::default()
            .fail_drives_with(EqptError::Actuator("stalled".into()));

        let result = move_forward(&mut pose, &mut motors, 10, &params);

        assert!(matches!(result, Err(NavCtrlError::Eqpt(EqptError::Actuator(_)))));
        assert_eq!(pose, Pose::default());
        assert_eq!(motors.events().last(), Some(&MotorEvent::Detach));
        assert!(!motors.is_attached());
    }

    #[test]
    fn test_turn_actuation() -> Result<(), NavCtrlError> {
        let params = Params::default();
        let mut pose = Pose::default();
        let mut motors = RecordingMotors::default();

        assert_eq!(turn(&mut pose, &mut motors, 90, &params)?, 1200);
        assert_eq!(turn(&mut pose, &mut motors, -90, &params)?, 800);

        assert_eq!(
            motors.events(),
            &[
                MotorEvent::Attach,
                MotorEvent::Drive { left_us: 1300, right_us: 1300, duration_ms: 1200 },
                MotorEvent::Drive { left_us: 1500, right_us: 1500, duration_ms: 0 },
                MotorEvent::Detach,
                MotorEvent::Attach,
                MotorEvent::Drive { left_us: 1700, right_us: 1700, duration_ms: 800 },
                MotorEvent::Drive { left_us: 1500, right_us: 1500, duration_ms: 0 },
                MotorEvent::Detach,
            ]
        );

        Ok(())
    }

    #[test]
    fn test_frozen_heading() -> Result<(), NavCtrlError> {
        let params = Params::default();
        let mut pose = Pose::default();
        let mut motors = RecordingMotors::default();

        turn(&mut pose, &mut motors, 90, &params)?;
        assert_eq!(pose.heading, Heading::Forward);

        // Moves keep using the stale heading
        move_forward(&mut pose, &mut motors, 5, &params)?;
        assert_eq!(pose.position, Point::new(0, 5));

        Ok(())
    }

    #[test]
    fn test_tracked_heading() -> Result<(), NavCtrlError> {
        let params = tracked();
        let mut pose = Pose::default();
        let mut motors = RecordingMotors::default();

        turn(&mut pose, &mut motors, 90, &params)?;
        assert_eq!(pose.heading, Heading::Left);

        turn(&mut pose, &mut motors, -180, &params)?;
        assert_eq!(pose.heading, Heading::Right);

        // Under half a quarter turn leaves the heading alone
        turn(&mut pose, &mut motors, 30, &params)?;
        assert_eq!(pose.heading, Heading::Right);

        turn(&mut pose, &mut motors, -90, &params)?;
        assert_eq!(pose.heading, Heading::Backward);

        move_forward(&mut pose, &mut motors, 5, &params)?;
        assert_eq!(pose.position, Point::new(0, -5));

        Ok(())
    }

    #[test]
    fn test_zero_turn() -> Result<(), NavCtrlError> {
        let mut pose = Pose::default();
        let mut motors = RecordingMotors::default();

        assert_eq!(turn(&mut pose, &mut motors, 0, &tracked())?, 0);

        assert_eq!(pose, Pose::default());
        assert!(motors.events().is_empty());

        Ok(())
    }
}
