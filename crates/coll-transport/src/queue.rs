//! Submission queue identifier.

/// An ordered in-flight submission channel on the transport; capacity is
/// finite (hence queue-full backoff).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct QueueId(pub u32);
