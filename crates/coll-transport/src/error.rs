//! Status alphabet for the transport adapter and the engines.
//!
//! A flat, hand-rolled, zero-dependency enum — deliberately not a richly
//! structured/coded error type. The alphabet is fixed at four members;
//! there is no open-ended set of subsystems to register codes for, so a
//! bigger error-modeling crate would add an abstraction with nothing to
//! abstract over (see DESIGN.md).

use core::fmt;

/// The four-member status alphabet every transport call and every engine
/// call returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The call completed; output buffers are valid as documented.
    Success,
    /// A wait or submit exhausted its deadline. Receive buffers and
    /// process-global notification state are indeterminate; re-entering
    /// a collective after this is a programmer error.
    Timeout,
    /// A submit call's target queue has no room. Never returned past the
    /// queue-full backoff wrapper — internal to the transport/backoff
    /// boundary.
    QueueFull,
    /// Precondition violation, unsupported operation, or a fatal
    /// transport-reported error. The caller must treat the process as
    /// unable to participate in further collectives on overlapping
    /// resources.
    Error,
}

impl Status {
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success => write!(f, "success"),
            Status::Timeout => write!(f, "timeout"),
            Status::QueueFull => write!(f, "queue full"),
            Status::Error => write!(f, "error"),
        }
    }
}

impl std::error::Error for Status {}

/// Result alias over the transport/engine status alphabet.
pub type CollResult<T> = Result<T, Status>;
