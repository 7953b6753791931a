//! # Navigation Executable Parameters
//!
//! This module provide parameters for the navigation executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

use nav_lib::{map::MapExtent, nav_ctrl::NavCommand, pose::Pose};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug)]
pub struct NavExecParams {

    /// Path to the NavCtrl parameter file, relative to the params directory
    pub nav_ctrl_params: String,

    /// Size of the simulated operating area
    pub arena_extent: MapExtent,

    /// Where the simulated robot really starts
    pub true_start_pose: Pose,

    /// If true the simulated servos block for as long as real ones would
    pub realtime: bool,

    /// Commands to execute, in order
    pub commands: Vec<NavCommand>
}
