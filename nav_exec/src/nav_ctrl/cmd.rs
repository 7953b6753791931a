//! Commands passed into NavCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A navigation command to be executed by NavCtrl.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NavCommand {
    /// Resolve the absolute position from the walls of the operating area.
    Calibrate,

    /// Drive straight ahead.
    Move {
        /// Units: inches
        distance_in: i32
    },

    /// Pivot on the spot, positive angles turn left.
    Turn {
        /// Units: degrees
        angle_deg: i32
    },

    /// Register whatever the forward sensors can see into the map.
    Detect,
}
