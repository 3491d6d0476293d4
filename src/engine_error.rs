//! Errors of runtime commands.
//!
//! Every command that returns one of these has left the engine state unchanged. They are reported
//! to the caller, but the control loop only logs them: a bad command in one frame must never stop
//! the frame loop.

use std::fmt;

use crate::teach::ModeKind;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Index does not refer to a controllable joint (1..=`last`).
    JointIndexOutOfRange { index: usize, last: usize },
    NotANumber { what: &'static str },
    NotAllowedInMode { command: &'static str, mode: ModeKind },
    SnapshotLengthMismatch { expected: usize, found: usize },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            EngineError::JointIndexOutOfRange { index, last } =>
                write!(f, "Joint index {} is not a controllable joint (1..={})", index, last),
            EngineError::NotANumber { what } =>
                write!(f, "NaN is not accepted as {}", what),
            EngineError::NotAllowedInMode { command, mode } =>
                write!(f, "Command '{}' is not allowed in {} mode", command, mode),
            EngineError::SnapshotLengthMismatch { expected, found } =>
                write!(f, "Snapshot length mismatch: expected {}, found {}", expected, found),
        }
    }
}

impl std::error::Error for EngineError {}
