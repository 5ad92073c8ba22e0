//! Timeout vocabulary for transport calls: `BLOCK`, `TEST`, or a
//! millisecond value.

/// How long a transport call is willing to wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Wait indefinitely.
    Block,
    /// Return immediately whether or not the condition is satisfied.
    Test,
    /// Wait up to this many milliseconds.
    Millis(u32),
}
