//! # Navigation library.
//!
//! This library allows other crates in the workspace to access items defined inside the navigation
//! crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Equipment interfaces - range sensors and drive servos
pub mod eqpt;

/// Obstacle map - stores detections and the known size of the operating area
pub mod map;

/// Navigation control module - tracks the robot's pose and places detections on the map
pub mod nav_ctrl;

/// Pose of the robot in the map frame
pub mod pose;

/// Simulated equipment
pub mod sim;
