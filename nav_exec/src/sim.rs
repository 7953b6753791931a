//! # Simulated Equipment
//!
//! Stand-ins for the robot's hardware:
//!
//! - [`SimArena`] models the robot in an empty rectangular arena. It is split
//!   into a [`SimRanger`] and [`SimMotors`] which share the arena, so that
//!   driving the motors changes what the sensors see. The ranger times
//!   simulated echoes through the same [`EchoRanger`] a real driver uses.
//! - [`ScriptedRanges`] replays fixed readings.
//! - [`RecordingMotors`] records every actuation call.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::cell::{Ref, RefCell};
use std::collections::{HashMap, VecDeque};
use std::f64::consts::FRAC_1_SQRT_2;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use log::{debug, trace};

use crate::{
    eqpt::{
        Actuation, Distance, EchoRanger, EchoTimer, EqptError, RangeSensing, SensorId,
        ECHO_US_PER_IN,
    },
    map::MapExtent,
    nav_ctrl::Params,
    pose::{Point, Pose},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A robot inside an empty rectangular arena.
#[derive(Debug, Clone)]
pub struct SimArena {
    extent: MapExtent,

    /// Where the robot really is, as opposed to where it believes it is.
    true_pose: Pose,

    /// Robot calibration used to turn drive commands into motion.
    params: Params,
}

/// Echo timing of rangefinders looking at the walls of a [`SimArena`].
pub struct SimEcho {
    arena: Rc<RefCell<SimArena>>,
}

/// Rangefinders looking at the walls of a [`SimArena`].
pub type SimRanger = EchoRanger<SimEcho>;

/// Drive servos moving the robot around a [`SimArena`].
pub struct SimMotors {
    arena: Rc<RefCell<SimArena>>,
    attached: bool,

    /// Block for the commanded duration like the real servos do.
    realtime: bool,
}

/// Range sensing which replays scripted readings.
///
/// Each sensor first returns its queued readings in order, then its constant
/// reading if one is set, and otherwise fails with [`EqptError::NoEcho`].
#[derive(Debug, Default)]
pub struct ScriptedRanges {
    queues: HashMap<SensorId, VecDeque<Result<Distance, EqptError>>>,
    constants: HashMap<SensorId, Distance>,
    reads: Vec<SensorId>,
}

/// Actuation which records every call.
#[derive(Debug, Default)]
pub struct RecordingMotors {
    events: Vec<MotorEvent>,
    attached: bool,
    attach_error: Option<EqptError>,
    drive_error: Option<EqptError>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A call recorded by [`RecordingMotors`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorEvent {
    Attach,
    Drive {
        left_us: u16,
        right_us: u16,
        duration_ms: u64,
    },
    Detach,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimArena {
    pub fn new(extent: MapExtent, true_pose: Pose, params: Params) -> Self {
        Self {
            extent,
            true_pose,
            params,
        }
    }

    /// Split the arena into the sensors and motors of the simulated robot.
    pub fn into_eqpt(self, realtime: bool) -> (SimRanger, SimMotors) {
        let max_range_in = self.params.max_range_in;
        let arena = Rc::new(RefCell::new(self));

        (
            EchoRanger::new(
                SimEcho {
                    arena: arena.clone(),
                },
                max_range_in,
            ),
            SimMotors {
                arena,
                attached: false,
                realtime,
            },
        )
    }

    pub fn true_pose(&self) -> Pose {
        self.true_pose
    }

    pub fn extent(&self) -> MapExtent {
        self.extent
    }

    /// The distance a sensor would see from the robot's true pose, before any
    /// range limit is applied.
    pub fn range_in(&self, sensor: SensorId) -> Distance {
        // Sensor direction and mounting offset in the robot frame, as
        // (forward, lateral) with lateral positive to the right.
        let (forward, lateral, offset) = match sensor {
            SensorId::Front => (1.0, 0.0, self.params.vertical_offset_in),
            SensorId::Back => (-1.0, 0.0, self.params.vertical_offset_in),
            SensorId::Left => (0.0, -1.0, self.params.horizontal_offset_in),
            SensorId::Right => (0.0, 1.0, self.params.horizontal_offset_in),
            SensorId::FrontLeft => (FRAC_1_SQRT_2, -FRAC_1_SQRT_2, 0),
            SensorId::FrontRight => (FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0),
        };

        let (dx, dy) = self.true_pose.heading.to_map_frame(forward, lateral);

        let range = self.range_to_wall(dx, dy).floor() as i64 - offset as i64;
        range.max(0).min(Distance::MAX as i64) as Distance
    }

    /// The round trip echo time a sensor would measure.
    ///
    /// Units: microseconds
    pub fn echo_us(&self, sensor: SensorId) -> u64 {
        self.range_in(sensor) as u64 * 2 * ECHO_US_PER_IN
    }

    /// Distance along the direction `(dx, dy)` from the robot's centre to the
    /// first wall.
    fn range_to_wall(&self, dx: f64, dy: f64) -> f64 {
        let Point { x, y } = self.true_pose.position;
        let (x, y) = (x as f64, y as f64);

        let mut range = std::f64::INFINITY;

        if dx > 0.0 {
            range = range.min((self.extent.x_max as f64 - x) / dx);
        }
        else if dx < 0.0 {
            range = range.min(-x / dx);
        }
        if dy > 0.0 {
            range = range.min((self.extent.y_max as f64 - y) / dy);
        }
        else if dy < 0.0 {
            range = range.min(-y / dy);
        }

        range.max(0.0)
    }

    /// Apply a drive command to the true pose.
    fn apply_drive(&mut self, left_us: u16, right_us: u16, duration_ms: u64) {
        let p = &self.params;

        if left_us == p.neutral_pulse_us && right_us == p.neutral_pulse_us {
            return;
        }

        if left_us == right_us {
            // Both servos at the same pulse pivot the robot
            let quarter_turn_ms = p.left_turn_duration_ms as f64;
            let quarter_turns = if left_us == p.turn_left_pulse_us {
                (duration_ms as f64 / quarter_turn_ms).round() as i32
            }
            else if left_us == p.turn_right_pulse_us {
                -((duration_ms + p.right_turn_adjustment_ms) as f64 / quarter_turn_ms).round() as i32
            }
            else {
                debug!("Unrecognised pivot pulse {} us, ignoring", left_us);
                0
            };

            self.true_pose.heading = self.true_pose.heading.rotated(quarter_turns);
        }
        else {
            let distance = (duration_ms as f64 * p.forward_speed_ips / 1000.0).round() as i32;
            // Saturates at the edge of the coordinate range
            let step = self.true_pose.heading.unit_step();
            let Point { x, y } = self.true_pose.position;
            self.true_pose.position = Point::new(
                x.saturating_add(step.x * distance),
                y.saturating_add(step.y * distance),
            );
        }

        trace!("Simulated true pose: {}", self.true_pose);
    }
}

impl SimRanger {
    pub fn arena(&self) -> Ref<'_, SimArena> {
        self.timer().arena.borrow()
    }
}

impl EchoTimer for SimEcho {
    fn echo_us(&mut self, sensor: SensorId) -> Result<Option<u64>, EqptError> {
        Ok(Some(self.arena.borrow().echo_us(sensor)))
    }
}

impl SimMotors {
    pub fn arena(&self) -> Ref<'_, SimArena> {
        self.arena.borrow()
    }
}

impl Actuation for SimMotors {
    fn attach(&mut self) -> Result<(), EqptError> {
        self.attached = true;
        Ok(())
    }

    fn drive(&mut self, left_us: u16, right_us: u16, duration_ms: u64) -> Result<(), EqptError> {
        if !self.attached {
            return Err(EqptError::Actuator("servos are not attached".into()));
        }

        if self.realtime {
            thread::sleep(Duration::from_millis(duration_ms));
        }

        self.arena
            .borrow_mut()
            .apply_drive(left_us, right_us, duration_ms);

        Ok(())
    }

    fn detach(&mut self) {
        self.attached = false;
    }
}

impl ScriptedRanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `distance` from `sensor` once any queued readings run out.
    pub fn with_constant(mut self, sensor: SensorId, distance: Distance) -> Self {
        self.constants.insert(sensor, distance);
        self
    }

    /// Queue readings for `sensor`.
    pub fn with_readings(mut self, sensor: SensorId, distances: &[Distance]) -> Self {
        self.queues
            .entry(sensor)
            .or_default()
            .extend(distances.iter().map(|d| Ok(*d)));
        self
    }

    /// Queue a failed read for `sensor`.
    pub fn with_error(mut self, sensor: SensorId, error: EqptError) -> Self {
        self.queues.entry(sensor).or_default().push_back(Err(error));
        self
    }

    /// Every sensor read so far, in order.
    pub fn reads(&self) -> &[SensorId] {
        &self.reads
    }
}

impl RangeSensing for ScriptedRanges {
    fn measure_distance(&mut self, sensor: SensorId) -> Result<Distance, EqptError> {
        self.reads.push(sensor);

        if let Some(reading) = self.queues.get_mut(&sensor).and_then(|q| q.pop_front()) {
            return reading;
        }

        match self.constants.get(&sensor) {
            Some(d) => Ok(*d),
            None => Err(EqptError::NoEcho(sensor)),
        }
    }
}

impl RecordingMotors {
    /// Make every attach fail with `error`.
    pub fn fail_attach_with(mut self, error: EqptError) -> Self {
        self.attach_error = Some(error);
        self
    }

    /// Make every drive fail with `error`.
    pub fn fail_drives_with(mut self, error: EqptError) -> Self {
        self.drive_error = Some(error);
        self
    }

    pub fn events(&self) -> &[MotorEvent] {
        &self.events
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

impl Actuation for RecordingMotors {
    fn attach(&mut self) -> Result<(), EqptError> {
        if let Some(e) = &self.attach_error {
            return Err(e.clone());
        }

        self.attached = true;
        self.events.push(MotorEvent::Attach);
        Ok(())
    }

    fn drive(&mut self, left_us: u16, right_us: u16, duration_ms: u64) -> Result<(), EqptError> {
        if !self.attached {
            return Err(EqptError::Actuator("servos are not attached".into()));
        }
        if let Some(e) = &self.drive_error {
            return Err(e.clone());
        }

        self.events.push(MotorEvent::Drive {
            left_us,
            right_us,
            duration_ms,
        });
        Ok(())
    }

    fn detach(&mut self) {
        self.attached = false;
        self.events.push(MotorEvent::Detach);
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{nav_ctrl::kinematics, pose::Heading};

    fn arena_at(x: i32, y: i32, heading: Heading) -> SimArena {
        SimArena::new(
            MapExtent { x_max: 20, y_max: 30 },
            Pose::new(Point::new(x, y), heading),
            Params::default(),
        )
    }

    #[test]
    fn test_wall_readings() {
        // Vertical offset 4, horizontal offset 3
        let arena = arena_at(6, 8, Heading::Forward);

        assert_eq!(arena.range_in(SensorId::Front), 18);
        assert_eq!(arena.range_in(SensorId::Back), 4);
        assert_eq!(arena.range_in(SensorId::Left), 3);
        assert_eq!(arena.range_in(SensorId::Right), 11);

        // Diagonals hit the side walls first, 6 * sqrt(2) = 8.49
        assert_eq!(arena.range_in(SensorId::FrontLeft), 8);
        assert_eq!(arena.range_in(SensorId::FrontRight), 19);
    }

    #[test]
    fn test_readings_follow_heading() -> Result<(), EqptError> {
        let (mut ranger, _motors) = arena_at(6, 8, Heading::Left).into_eqpt(false);

        assert_eq!(ranger.measure_distance(SensorId::Front)?, 2);
        assert_eq!(ranger.measure_distance(SensorId::Back)?, 10);
        assert_eq!(ranger.measure_distance(SensorId::Left)?, 5);
        assert_eq!(ranger.measure_distance(SensorId::Right)?, 19);

        Ok(())
    }

    #[test]
    fn test_out_of_range() {
        let arena = SimArena::new(
            MapExtent { x_max: 20, y_max: 1000 },
            Pose::new(Point::new(10, 0), Heading::Forward),
            Params::default(),
        );
        assert_eq!(arena.echo_us(SensorId::Front), 996 * 148);

        let (mut ranger, _motors) = arena.into_eqpt(false);

        assert_eq!(
            ranger.measure_distance(SensorId::Front),
            Err(EqptError::OutOfRange(SensorId::Front, 996))
        );
    }

    #[test]
    fn test_motors_move_arena() -> Result<(), crate::nav_ctrl::NavCtrlError> {
        let params = Params::default();
        let (ranger, mut motors) = arena_at(6, 8, Heading::Forward).into_eqpt(false);

        // Belief and truth start out the same
        let mut belief = ranger.arena().true_pose();

        kinematics::move_forward(&mut belief, &mut motors, 10, &params)?;
        assert_eq!(ranger.arena().true_pose().position, Point::new(6, 18));

        kinematics::turn(&mut belief, &mut motors, -90, &params)?;
        assert_eq!(ranger.arena().true_pose().heading, Heading::Right);

        kinematics::turn(&mut belief, &mut motors, 180, &params)?;
        assert_eq!(ranger.arena().true_pose().heading, Heading::Left);

        // The default frozen heading lets belief and truth drift apart
        assert_eq!(belief.heading, Heading::Forward);

        Ok(())
    }

    #[test]
    fn test_sim_motors_need_attach() {
        let (_ranger, mut motors) = arena_at(6, 8, Heading::Forward).into_eqpt(false);

        assert!(matches!(
            motors.drive(1700, 1400, 1000),
            Err(EqptError::Actuator(_))
        ));
        assert_eq!(motors.arena().true_pose().position, Point::new(6, 8));
    }

    #[test]
    fn test_scripted_ranges() {
        let mut ranges = ScriptedRanges::new()
            .with_constant(SensorId::Front, 7)
            .with_readings(SensorId::Front, &[1, 2])
            .with_error(SensorId::Back, EqptError::NoEcho(SensorId::Back));

        assert_eq!(ranges.measure_distance(SensorId::Front), Ok(1));
        assert_eq!(ranges.measure_distance(SensorId::Front), Ok(2));
        assert_eq!(ranges.measure_distance(SensorId::Front), Ok(7));
        assert_eq!(
            ranges.measure_distance(SensorId::Back),
            Err(EqptError::NoEcho(SensorId::Back))
        );
        assert_eq!(
            ranges.measure_distance(SensorId::Left),
            Err(EqptError::NoEcho(SensorId::Left))
        );
        assert_eq!(ranges.reads().len(), 5);
    }
}
