//! Lifecycle error taxonomy.
//!
//! Errors stay rich inside the crate for logging and collapse to `bool` only
//! at the platform boundary.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Lifecycle call being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleOperation {
    Install,
    Cleanup,
}

impl LifecycleOperation {
    /// Stable name used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Cleanup => "cleanup",
        }
    }
}

impl Display for LifecycleOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons an install or cleanup call reports `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// Runtime address was null. Nothing was delegated.
    InvalidHandle,
    /// The extension routine returned `false`.
    DelegateFailed { operation: LifecycleOperation },
    /// The extension routine panicked; the unwind was stopped here.
    DelegatePanicked {
        operation: LifecycleOperation,
        message: String,
    },
    /// No extension has been registered for the platform entry points.
    ExtensionMissing,
}

impl LifecycleError {
    /// Short machine-readable reason for log lines.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidHandle => "invalid_handle",
            Self::DelegateFailed { .. } => "delegate_failed",
            Self::DelegatePanicked { .. } => "delegate_panicked",
            Self::ExtensionMissing => "extension_missing",
        }
    }
}

impl Display for LifecycleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHandle => write!(f, "runtime pointer is null"),
            Self::DelegateFailed { operation } => {
                write!(f, "extension {operation} routine reported failure")
            }
            Self::DelegatePanicked { operation, message } => {
                write!(f, "extension {operation} routine panicked: {message}")
            }
            Self::ExtensionMissing => write!(f, "no native extension registered"),
        }
    }
}

impl Error for LifecycleError {}
