//! Range sensing interface
//!
//! Ultrasonic rangefinders report the length of the echo pulse. Drivers time
//! that pulse through [`EchoTimer`] and [`EchoRanger`] turns it into a
//! validated distance.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::EqptError;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Round trip echo time of sound per inch travelled.
///
/// Units: microseconds/inch
pub const ECHO_US_PER_IN: u64 = 74;

// ------------------------------------------------------------------------------------------------
// TYPES
// ------------------------------------------------------------------------------------------------

/// A single range reading.
///
/// Units: inches
pub type Distance = u32;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A set of fixed rangefinders mounted on the robot.
pub trait RangeSensing {
    /// Measure the free distance seen by one sensor.
    ///
    /// This call blocks for the duration of the measurement. The reading is
    /// taken from the sensor face, mounting offsets are not included.
    fn measure_distance(&mut self, sensor: SensorId) -> Result<Distance, EqptError>;
}

/// Low level timing of ultrasonic echoes.
pub trait EchoTimer {
    /// Trigger `sensor` and time its echo pulse, in microseconds.
    ///
    /// Returns `None` if no echo came back.
    fn echo_us(&mut self, sensor: SensorId) -> Result<Option<u64>, EqptError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Range sensing on top of raw echo timing.
///
/// Missing echoes are reported as [`EqptError::NoEcho`] and readings beyond
/// the maximum range as [`EqptError::OutOfRange`].
pub struct EchoRanger<T> {
    timer: T,

    /// Units: inches
    max_range_in: Distance,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Mounting positions of the rangefinders.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum SensorId {
    Front,
    Back,
    Left,
    Right,
    /// 45 degrees to the left of straight ahead
    FrontLeft,
    /// 45 degrees to the right of straight ahead
    FrontRight,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<T> EchoRanger<T> {
    pub fn new(timer: T, max_range_in: Distance) -> Self {
        Self {
            timer,
            max_range_in,
        }
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }
}

impl<T: EchoTimer> RangeSensing for EchoRanger<T> {
    fn measure_distance(&mut self, sensor: SensorId) -> Result<Distance, EqptError> {
        let echo_us = self.timer
            .echo_us(sensor)?
            .ok_or(EqptError::NoEcho(sensor))?;

        let distance = echo_us_to_inches(echo_us);

        if distance > self.max_range_in {
            return Err(EqptError::OutOfRange(sensor, distance));
        }

        Ok(distance)
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Convert an ultrasonic echo pulse length into the distance to the target.
///
/// The echo covers the path out and back so the one way distance is half of
/// the total.
pub fn echo_us_to_inches(echo_us: u64) -> Distance {
    let inches = echo_us / ECHO_US_PER_IN / 2;
    inches.min(Distance::MAX as u64) as Distance
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    /// Echo times per sensor, sensors without one never hear an echo.
    #[derive(Default)]
    struct FixedEchoes(HashMap<SensorId, u64>);

    impl EchoTimer for FixedEchoes {
        fn echo_us(&mut self, sensor: SensorId) -> Result<Option<u64>, EqptError> {
            if sensor == SensorId::Back {
                return Err(EqptError::SensorFault(sensor, "trigger line stuck".into()));
            }

            Ok(self.0.get(&sensor).copied())
        }
    }

    #[test]
    fn test_echo_ranger() {
        let mut echoes = FixedEchoes::default();
        echoes.0.insert(SensorId::Front, 1480);
        echoes.0.insert(SensorId::FrontLeft, 301 * 2 * ECHO_US_PER_IN);
        echoes.0.insert(SensorId::FrontRight, u64::MAX);

        let mut ranger = EchoRanger::new(echoes, 300);

        assert_eq!(ranger.measure_distance(SensorId::Front), Ok(10));
        assert_eq!(
            ranger.measure_distance(SensorId::FrontLeft),
            Err(EqptError::OutOfRange(SensorId::FrontLeft, 301))
        );
        assert_eq!(
            ranger.measure_distance(SensorId::FrontRight),
            Err(EqptError::OutOfRange(SensorId::FrontRight, Distance::MAX))
        );
        assert_eq!(
            ranger.measure_distance(SensorId::Left),
            Err(EqptError::NoEcho(SensorId::Left))
        );
        assert!(matches!(
            ranger.measure_distance(SensorId::Back),
            Err(EqptError::SensorFault(SensorId::Back, _))
        ));
    }

    #[test]
    fn test_echo_us_to_inches() {
        assert_eq!(echo_us_to_inches(0), 0);
        assert_eq!(echo_us_to_inches(147), 0);
        assert_eq!(echo_us_to_inches(148), 1);
        assert_eq!(echo_us_to_inches(1480), 10);
        assert_eq!(echo_us_to_inches(1627), 10);
    }
}
