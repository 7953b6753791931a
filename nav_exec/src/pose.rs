//! # Pose
//!
//! The robot's believed position and heading, expressed in the obstacle map
//! frame: origin at the back-left corner of the operating area, `+x` towards
//! the right wall, `+y` towards the front wall, units of inches.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::convert::TryFrom;
use std::fmt::{self, Display};
use std::ops::{Add, AddAssign, Neg};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A 2D integer coordinate in the map frame.
///
/// Units: inches
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// The believed pose of the robot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pose {
    /// Position of the robot's centre in the map frame.
    pub position: Point,

    /// The direction the front of the robot faces.
    pub heading: Heading,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// One of the four cardinal directions the front of the robot can face.
///
/// The raw codes (`0` to `3`) count left quarter turns from `Forward`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heading {
    /// Facing `+y`
    Forward,
    /// Facing `-x`
    Left,
    /// Facing `-y`
    Backward,
    /// Facing `+x`
    Right,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HeadingError {
    #[error("{0} is not a valid heading code, expected 0 to 3")]
    InvalidCode(u8),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Self) -> Self::Output {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Default for Heading {
    fn default() -> Self {
        Heading::Forward
    }
}

impl Heading {
    pub fn all() -> [Self; 4] {
        [Self::Forward, Self::Left, Self::Backward, Self::Right]
    }

    /// The raw code of this heading.
    pub fn code(self) -> u8 {
        match self {
            Heading::Forward => 0,
            Heading::Left => 1,
            Heading::Backward => 2,
            Heading::Right => 3,
        }
    }

    /// Rotate the heading by a number of quarter turns, positive to the left.
    pub fn rotated(self, quarter_turns: i32) -> Self {
        let code = (self.code() as i32 + quarter_turns).rem_euclid(4);

        match code {
            0 => Heading::Forward,
            1 => Heading::Left,
            2 => Heading::Backward,
            _ => Heading::Right,
        }
    }

    /// Rotate a robot frame offset `(forward, lateral)` into the map frame
    /// `(x, y)`. Lateral is positive to the robot's right.
    pub fn to_map_frame<T>(self, forward: T, lateral: T) -> (T, T)
    where
        T: Neg<Output = T>,
    {
        match self {
            Heading::Forward => (lateral, forward),
            Heading::Left => (-forward, lateral),
            Heading::Backward => (-lateral, -forward),
            Heading::Right => (forward, -lateral),
        }
    }

    /// Unit step in the map frame for one inch of travel along this heading.
    pub fn unit_step(self) -> Point {
        match self {
            Heading::Forward => Point::new(0, 1),
            Heading::Left => Point::new(-1, 0),
            Heading::Backward => Point::new(0, -1),
            Heading::Right => Point::new(1, 0),
        }
    }
}

impl TryFrom<u8> for Heading {
    type Error = HeadingError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Heading::Forward),
            1 => Ok(Heading::Left),
            2 => Ok(Heading::Backward),
            3 => Ok(Heading::Right),
            c => Err(HeadingError::InvalidCode(c)),
        }
    }
}

impl Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Heading::Forward => "forward",
            Heading::Left => "left",
            Heading::Backward => "backward",
            Heading::Right => "right",
        };
        f.write_str(s)
    }
}

impl Pose {
    pub fn new(position: Point, heading: Heading) -> Self {
        Self { position, heading }
    }
}

impl Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} facing {}", self.position, self.heading)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_initial_pose() {
        let pose = Pose::default();
        assert_eq!(pose.position, Point::new(0, 0));
        assert_eq!(pose.heading, Heading::Forward);
    }

    #[test]
    fn test_heading_codes() {
        for heading in Heading::all().iter() {
            assert_eq!(Heading::try_from(heading.code()), Ok(*heading));
        }

        assert_eq!(Heading::try_from(4), Err(HeadingError::InvalidCode(4)));
        assert_eq!(Heading::try_from(255), Err(HeadingError::InvalidCode(255)));
    }

    #[test]
    fn test_heading_rotation() {
        assert_eq!(Heading::Forward.rotated(1), Heading::Left);
        assert_eq!(Heading::Left.rotated(1), Heading::Backward);
        assert_eq!(Heading::Backward.rotated(1), Heading::Right);
        assert_eq!(Heading::Right.rotated(1), Heading::Forward);

        assert_eq!(Heading::Forward.rotated(-1), Heading::Right);
        assert_eq!(Heading::Forward.rotated(2), Heading::Backward);
        assert_eq!(Heading::Left.rotated(-6), Heading::Right);
        assert_eq!(Heading::Right.rotated(0), Heading::Right);
    }

    #[test]
    fn test_unit_steps_match_rotation() {
        // A left quarter turn rotates the step counter-clockwise
        for heading in Heading::all().iter() {
            let step = heading.unit_step();
            let left = heading.rotated(1).unit_step();
            assert_eq!(left, Point::new(-step.y, step.x));
        }
    }

    #[test]
    fn test_map_frame_matches_unit_step() {
        for heading in Heading::all().iter() {
            let step = heading.unit_step();
            assert_eq!(heading.to_map_frame(1, 0), (step.x, step.y));

            // Right of the robot is a right quarter turn away
            let right = heading.rotated(-1).unit_step();
            assert_eq!(heading.to_map_frame(0, 1), (right.x, right.y));
        }

        assert_eq!(Heading::Left.to_map_frame(2.0, 0.5), (-2.0, 0.5));
    }

    #[test]
    fn test_display() {
        let pose = Pose::new(Point::new(6, -8), Heading::Left);
        assert_eq!(pose.to_string(), "(6, -8) facing left");
    }
}
