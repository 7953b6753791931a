//! Control module interface
//!
//! Control modules such as NavCtrl are built in two steps. The module is first
//! constructed with its equipment, then `init` loads its parameters and opens
//! its archives inside the session. After that every call to `proc` executes
//! one input to completion, blocking for as long as the equipment takes.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// The state of a control module.
pub trait State {
    /// Data needed to initialise the module, usually a parameter file path.
    type InitData;
    /// Failure to initialise.
    type InitError;

    /// A single input to process, for example a command.
    type InputData;
    /// The module's primary output after processing one input.
    type OutputData;
    /// Details of what processing one input did.
    type StatusReport;
    /// Failure while processing an input.
    type ProcError;

    /// Load parameters and open archives for the given session.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Process one input.
    ///
    /// On failure the module stays usable, and the error says how far
    /// processing got.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
