use thiserror::Error;

use crate::args::VnopId;
use crate::errno::Errno;

pub type VnopResult<T> = Result<T, VnopError>;

/// Result type of the engine-facing interface: a value or the engine's
/// own status.
pub type EngineResult<T> = Result<T, Errno>;

/// Broad classification of a failed vnop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Validation,
    State,
    Unsupported,
    /// Refused by the vnode class with a fixed status.
    Rejected,
    Engine,
}

/// Failure of a single vnop, as seen at the adapter boundary.
///
/// Errors are never converted from one variant into another; the host
/// status is derived once in [`VnopError::status`].
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum VnopError {
    /// Detected by the adapter before the engine was reached.
    #[error("{context}: {errno}")]
    Validation {
        errno: Errno,
        context: &'static str,
    },
    /// The owning instance refused entry because it is being torn down.
    #[error("filesystem instance is being torn down")]
    TearingDown,
    /// No table entry, or an unrecognized device-control command.
    #[error("{0:?} is not supported")]
    Unsupported(VnopId),
    /// A class table entry that rejects the operation with a fixed status.
    #[error("{op:?} rejected for this vnode class: {errno}")]
    Rejected { op: VnopId, errno: Errno },
    /// Status returned by the filesystem engine, passed through as is.
    #[error("engine error: {0}")]
    Engine(Errno),
}

impl VnopError {
    pub fn validation(errno: Errno, context: &'static str) -> Self {
        VnopError::Validation { errno, context }
    }

    pub fn status(&self) -> Errno {
        match self {
            VnopError::Validation { errno, .. } => *errno,
            VnopError::TearingDown => Errno::IO,
            VnopError::Unsupported(_) => Errno::NOTSUP,
            VnopError::Rejected { errno, .. } => *errno,
            VnopError::Engine(errno) => *errno,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            VnopError::Validation { .. } => ErrorCategory::Validation,
            VnopError::TearingDown => ErrorCategory::State,
            VnopError::Unsupported(_) => ErrorCategory::Unsupported,
            VnopError::Rejected { .. } => ErrorCategory::Rejected,
            VnopError::Engine(_) => ErrorCategory::Engine,
        }
    }
}

impl From<Errno> for VnopError {
    fn from(errno: Errno) -> Self {
        VnopError::Engine(errno)
    }
}

/// Collapse a vnop result into the integer the host expects.
pub fn host_status(result: &VnopResult<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => err.status().raw(),
    }
}
