//! Implementations for the NavCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace};
use serde::Serialize;

// Internal
use super::{
    calibration, kinematics, perception,
    CalibrationReport, NavCommand, NavCtrlError, NavCtrlInitError, Params,
};
use crate::{
    eqpt::{Actuation, RangeSensing},
    map::ObstacleMap,
    pose::{Point, Pose},
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Navigation control module state.
///
/// Owns the believed pose and the equipment it is estimated from. Nothing
/// else may change the pose, commands go through [`State::proc`] or the
/// individual operations below.
pub struct NavCtrl<R, A, M> {
    pub(crate) params: Params,

    pose: Pose,
    arch_pose: Archiver,

    sensors: R,
    motors: A,
    map: M,

    report: StatusReport,
}

/// Status report for NavCtrl processing.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StatusReport {
    /// The command which was executed.
    pub cmd: Option<NavCommand>,

    /// How long the motors were driven for.
    ///
    /// Units: milliseconds
    pub drive_duration_ms: Option<u64>,

    /// Obstacles registered into the map.
    pub obstacles: Vec<Point>,

    /// Outcome of a calibration, only set when it converged.
    pub calibration: Option<CalibrationReport>,
}

/// A single line of the pose archive.
#[derive(Serialize)]
struct PoseRecord {
    time_s: f64,
    x_in: i32,
    y_in: i32,
    heading: u8,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<R, A, M> State for NavCtrl<R, A, M>
where
    R: RangeSensing,
    A: Actuation,
    M: ObstacleMap,
{
    type InitData = String;
    type InitError = NavCtrlInitError;

    type InputData = NavCommand;
    type OutputData = Pose;
    type StatusReport = StatusReport;
    type ProcError = NavCtrlError;

    /// Initialise the NavCtrl module.
    ///
    /// Expected init data is the path to the parameter file, relative to the
    /// params directory.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        // Load the parameters
        let params: Params = params::load(&init_data)
            .map_err(NavCtrlInitError::ParamsLoad)?;
        params.validate().map_err(NavCtrlInitError::ParamsInvalid)?;
        self.params = params;

        info!("NavCtrl parameters loaded from {}", init_data);

        // Initialise the archiver
        self.arch_pose = Archiver::from_path(session, "nav_ctrl/pose.csv")
            .map_err(NavCtrlInitError::Archive)?;

        Ok(())
    }

    /// Execute a single navigation command.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Clear the status report
        self.report = StatusReport {
            cmd: Some(*input_data),
            ..Default::default()
        };

        match *input_data {
            NavCommand::Calibrate => {
                // Only a converged calibration produces a report, the error
                // carries which axes resolved
                self.report.calibration = Some(self.establish_starting_pose()?);
            },
            NavCommand::Move { distance_in } => {
                self.report.drive_duration_ms = Some(self.move_forward(distance_in)?);
            },
            NavCommand::Turn { angle_deg } => {
                self.report.drive_duration_ms = Some(self.turn(angle_deg)?);
            },
            NavCommand::Detect => {
                self.report.obstacles = self.detect_obstacles()?.to_vec();
            }
        }

        trace!("NavCtrl output: {}, {:?}", self.pose, self.report);

        Ok((self.pose, self.report.clone()))
    }
}

impl<R, A, M> Archived for NavCtrl<R, A, M> {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_pose.serialise(PoseRecord {
            time_s: session::get_elapsed_seconds(),
            x_in: self.pose.position.x,
            y_in: self.pose.position.y,
            heading: self.pose.heading.code(),
        })
    }
}

impl<R, A, M> NavCtrl<R, A, M>
where
    R: RangeSensing,
    A: Actuation,
    M: ObstacleMap,
{
    /// Create a new controller with the default parameters and the robot at
    /// the origin facing forward.
    pub fn new(sensors: R, motors: A, map: M) -> Self {
        Self {
            params: Params::default(),
            pose: Pose::default(),
            arch_pose: Archiver::default(),
            sensors,
            motors,
            map,
            report: StatusReport::default(),
        }
    }

    /// Create a new controller with the given parameters.
    pub fn with_params(params: Params, sensors: R, motors: A, map: M) -> Result<Self, NavCtrlError> {
        params.validate()?;

        Ok(Self {
            params,
            ..Self::new(sensors, motors, map)
        })
    }

    /// Resolve the absolute position from the walls of the map.
    pub fn establish_starting_pose(&mut self) -> Result<CalibrationReport, NavCtrlError> {
        let extent = self.map.extent();
        calibration::establish_starting_pose(
            &mut self.pose, &mut self.sensors, extent, &self.params
        )
    }

    /// Drive forward, returning the drive duration in milliseconds.
    pub fn move_forward(&mut self, distance_in: i32) -> Result<u64, NavCtrlError> {
        kinematics::move_forward(&mut self.pose, &mut self.motors, distance_in, &self.params)
    }

    /// Pivot, positive angles turn left. Returns the drive duration in
    /// milliseconds.
    pub fn turn(&mut self, angle_deg: i32) -> Result<u64, NavCtrlError> {
        kinematics::turn(&mut self.pose, &mut self.motors, angle_deg, &self.params)
    }

    /// Register the obstacles seen by the forward sensors.
    pub fn detect_obstacles(&mut self) -> Result<[Point; 3], NavCtrlError> {
        perception::detect_obstacles(&self.pose, &mut self.sensors, &mut self.map, &self.params)
    }
}

impl<R, A, M> NavCtrl<R, A, M> {
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Overwrite the believed pose, for example from an external fix.
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn sensors(&self) -> &R {
        &self.sensors
    }

    pub fn motors(&self) -> &A {
        &self.motors
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
