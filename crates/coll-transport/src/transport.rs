//! The transport adapter contract consumed by the engines.
//!
//! This is deliberately narrow: remote write-with-notify, notify-only,
//! two flavors of wait-and-reset, and a queue flush. Everything the
//! engines do is built from these five operations plus local,
//! bounds-checked byte access to a rank's own registered segments.

use coll_core::SegRef;

use crate::error::Status;
use crate::queue::QueueId;
use crate::timeout::Timeout;

/// The one-sided transport adapter every engine is written against.
///
/// Implementors: a real RDMA-class backend (not part of this repo), or
/// the in-process reference implementation in `coll-sim`.
pub trait Transport: Send + Sync {
    /// Enqueue a one-sided remote write. Once the full payload is visible
    /// to the receiver, the receiver's `notif_id` slot in `dst.segment`
    /// is set to `notif_value`.
    #[allow(clippy::too_many_arguments)]
    fn write_notify(
        &self,
        src: SegRef,
        dst_rank: u32,
        dst: SegRef,
        nbytes: usize,
        notif_id: u32,
        notif_value: u32,
        queue: QueueId,
        timeout: Timeout,
    ) -> Status;

    /// Enqueue a notification-only message (no payload).
    fn notify(
        &self,
        dst_rank: u32,
        dst: SegRef,
        notif_id: u32,
        notif_value: u32,
        queue: QueueId,
        timeout: Timeout,
    ) -> Status;

    /// Block until `notif_id` in `seg` becomes non-zero, requiring the
    /// observed value equal `expected_value`; atomically reset it to 0.
    fn wait_one(&self, seg: SegRef, notif_id: u32, expected_value: u32, timeout: Timeout)
        -> Status;

    /// Block until any slot in `[id_start, id_start + id_range)` of
    /// `segment` becomes non-zero; return which id and its value, having
    /// atomically reset it. `segment`'s offset component is ignored —
    /// notification ids are segment-local, not offset-local.
    fn wait_any(
        &self,
        segment: SegRef,
        id_start: u32,
        id_range: u32,
        timeout: Timeout,
    ) -> Result<(u32, u32), Status>;

    /// Drain queued operations on `queue`.
    fn flush(&self, queue: QueueId) -> Status;

    /// Read `len` bytes starting at `seg` from this rank's own registered
    /// memory. Local-only; never crosses the wire.
    fn read_local(&self, seg: SegRef, len: usize) -> Vec<u8>;

    /// Write `data` into this rank's own registered memory at `seg`.
    /// Local-only; never crosses the wire.
    fn write_local(&self, seg: SegRef, data: &[u8]);
}
