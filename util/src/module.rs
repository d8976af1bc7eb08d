//! Task interfaces
//!
//! Each cooperative task in `romi_exec` shall implement all the items in this
//! module.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::fmt::Debug;

// ---------------------------------------------------------------------------
// TASK
// ---------------------------------------------------------------------------

/// A cooperative task, advanced by the scheduler one state machine step at a
/// time.
///
/// A task never blocks inside `step`. All waiting is done by remaining in the
/// same mode across steps and checking elapsed time.
pub trait Task {
    /// The modes of the task's state machine.
    ///
    /// The numeric code is used for transition tracing.
    type Mode: Copy + Debug + PartialEq + Into<u8>;

    /// An error which can occur during a step. Any error is fatal to the
    /// task.
    type StepError: std::error::Error + Send + Sync + 'static;

    /// Name of the task, for logs and the task table.
    fn name(&self) -> &str;

    /// Perform one step of the task.
    ///
    /// # Outputs
    /// - On success the mode the task is in after the step.
    /// - On error a `StepError` instance.
    fn step(&mut self) -> Result<Self::Mode, Self::StepError>;

    /// Put any actuator owned by the task into a safe state.
    ///
    /// Called once by the host before teardown, whatever mode the task is in.
    fn shutdown(&mut self) -> Result<(), Self::StepError> {
        Ok(())
    }
}
