//! Queue-full backoff.
//!
//! Every submit call (`write_notify`, `notify`) must be wrapped so that a
//! `QUEUE_FULL` return causes a `flush` of the target queue and an
//! immediate retry, indefinitely, until either `SUCCESS` or a genuine
//! error. This must never apply to `wait_*` calls — callers simply never
//! route a wait through this helper.

use crate::error::Status;
use crate::queue::QueueId;
use crate::transport::Transport;

/// Retry `submit` until it returns something other than `QueueFull`,
/// flushing `queue` between attempts. `submit` should be a single
/// `write_notify` or `notify` call (or equivalent).
pub fn submit_with_backoff<F>(transport: &dyn Transport, queue: QueueId, mut submit: F) -> Status
where
    F: FnMut() -> Status,
{
    loop {
        match submit() {
            Status::QueueFull => match transport.flush(queue) {
                Status::Success => continue,
                other => return other,
            },
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coll_core::{SegRef, SegmentId};
    use crate::timeout::Timeout;

    struct FlakyTransport {
        remaining_full: std::sync::atomic::AtomicU32,
    }

    impl Transport for FlakyTransport {
        fn write_notify(
            &self,
            _src: SegRef,
            _dst_rank: u32,
            _dst: SegRef,
            _nbytes: usize,
            _notif_id: u32,
            _notif_value: u32,
            _queue: QueueId,
            _timeout: Timeout,
        ) -> Status {
            use std::sync::atomic::Ordering;
            if self.remaining_full.load(Ordering::Relaxed) > 0 {
                self.remaining_full.fetch_sub(1, Ordering::Relaxed);
                Status::QueueFull
            } else {
                Status::Success
            }
        }

        fn notify(
            &self,
            _dst_rank: u32,
            _dst: SegRef,
            _notif_id: u32,
            _notif_value: u32,
            _queue: QueueId,
            _timeout: Timeout,
        ) -> Status {
            Status::Success
        }

        fn wait_one(&self, _: SegRef, _: u32, _: u32, _: Timeout) -> Status {
            Status::Success
        }

        fn wait_any(&self, _: SegRef, _: u32, _: u32, _: Timeout) -> Result<(u32, u32), Status> {
            Ok((0, 1))
        }

        fn flush(&self, _queue: QueueId) -> Status {
            Status::Success
        }

        fn read_local(&self, _seg: SegRef, len: usize) -> Vec<u8> {
            vec![0u8; len]
        }

        fn write_local(&self, _seg: SegRef, _data: &[u8]) {}
    }

    #[test]
    fn test_retries_until_success() {
        let t = FlakyTransport {
            remaining_full: std::sync::atomic::AtomicU32::new(3),
        };
        let seg = SegRef::new(SegmentId(0), 0);
        let status = submit_with_backoff(&t, QueueId(0), || {
            t.write_notify(seg, 1, seg, 8, 0, 1, QueueId(0), Timeout::Block)
        });
        assert_eq!(status, Status::Success);
    }
}
