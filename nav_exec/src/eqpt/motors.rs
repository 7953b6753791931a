//! Drive motor interface
//!
//! The robot drives two continuous rotation servos commanded by pulse width.
//! A pulse of [`NEUTRAL_PULSE_US`] holds a servo still, pulses either side of
//! it spin the servo one way or the other.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{trace, warn};
use std::ops::{Deref, DerefMut};

use super::EqptError;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Pulse width at which a continuous servo stops.
///
/// Units: microseconds
pub const NEUTRAL_PULSE_US: u16 = 1500;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Differential drive actuators.
pub trait Actuation {
    /// Attach the servos so they respond to pulse commands.
    fn attach(&mut self) -> Result<(), EqptError>;

    /// Command the left and right servos, blocking for `duration_ms`.
    ///
    /// Commands are servo pulse widths in microseconds. The servos keep the
    /// last commanded pulse once this returns.
    fn drive(&mut self, left_us: u16, right_us: u16, duration_ms: u64) -> Result<(), EqptError>;

    /// Release the servos. Must always succeed.
    fn detach(&mut self);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Exclusive use of the drive servos.
///
/// The servos are attached when the lease is taken and detached when it is
/// dropped, whichever way the holder exits.
pub struct MotorLease<'a, A: Actuation> {
    motors: &'a mut A,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<'a, A: Actuation> MotorLease<'a, A> {
    /// Attach the motors and take the lease.
    pub fn acquire(motors: &'a mut A) -> Result<Self, EqptError> {
        if let Err(e) = motors.attach() {
            // A partial attach still needs releasing
            warn!("Failed to attach motors: {}", e);
            motors.detach();
            return Err(e);
        }

        trace!("Motors attached");

        Ok(Self { motors })
    }
}

impl<'a, A: Actuation> Deref for MotorLease<'a, A> {
    type Target = A;

    fn deref(&self) -> &Self::Target {
        self.motors
    }
}

impl<'a, A: Actuation> DerefMut for MotorLease<'a, A> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.motors
    }
}

impl<'a, A: Actuation> Drop for MotorLease<'a, A> {
    fn drop(&mut self) {
        self.motors.detach();
        trace!("Motors detached");
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim::{MotorEvent, RecordingMotors};

    #[test]
    fn test_lease_attaches_and_detaches() -> Result<(), EqptError> {
        let mut motors = RecordingMotors::default();

        {
            let mut lease = MotorLease::acquire(&mut motors)?;
            assert!(lease.is_attached());
            lease.drive(1600, 1600, 10)?;
        }

        assert!(!motors.is_attached());
        assert_eq!(
            motors.events(),
            &[
                MotorEvent::Attach,
                MotorEvent::Drive { left_us: 1600, right_us: 1600, duration_ms: 10 },
                MotorEvent::Detach,
            ]
        );

        Ok(())
    }

    #[test]
    fn test_failed_attach_detaches() {
        let mut motors = RecordingMotors::default()
            .fail_attach_with(EqptError::Actuator("no power".into()));

        assert!(MotorLease::acquire(&mut motors).is_err());
        assert_eq!(motors.events(), &[MotorEvent::Detach]);
    }

    #[test]
    fn test_early_return_detaches() {
        fn drive_then_fail(motors: &mut RecordingMotors) -> Result<(), EqptError> {
            let mut lease = MotorLease::acquire(motors)?;
            lease.drive(1700, 1400, 100)?;
            Err(EqptError::Actuator("bail out".into()))
        }

        let mut motors = RecordingMotors::default();

        assert!(drive_then_fail(&mut motors).is_err());
        assert_eq!(motors.events().last(), Some(&MotorEvent::Detach));
        assert!(!motors.is_attached());
    }
}
