//! Typed public entry points. One binding per collective × variant,
//! instantiated over `T ∈ {i32, u32, f32, f64}`; each thin wrapper
//! validates preconditions synchronously and then drives the
//! byte-level engine in `broadcast`/`reduce`/`allreduce`.

use coll_core::{Group, SegRef};
use coll_transport::{Element, QueueId, ReduceOp, Status, Timeout, Transport};

use crate::{allreduce, broadcast, reduce};

/// Checks the preconditions engines must report as `ERROR` rather than
/// attempt: non-zero element count, an in-range root, and (for weak
/// variants) a threshold in `(0, 1]`. Buffer-capacity sufficiency
/// (e.g. `tmp` sized for the variant) is the caller's responsibility —
/// this API has no way to learn a `SegRef`'s backing allocation size.
fn validate(n_elem: usize, threshold: Option<f64>, root: u32, n: u32) -> Status {
    if n_elem == 0 {
        return Status::Error;
    }
    if root >= n {
        return Status::Error;
    }
    if let Some(t) = threshold {
        if !(t > 0.0 && t <= 1.0) {
            return Status::Error;
        }
    }
    Status::Success
}

/// Binomial-tree broadcast. `threshold = None` is the strong
/// variant; `Some(t)` transfers only the leading `⌈t · n_elem⌉` elements.
#[allow(clippy::too_many_arguments)]
pub fn broadcast<T: Element>(
    transport: &dyn Transport,
    group: Group,
    buf: SegRef,
    n_elem: usize,
    threshold: Option<f64>,
    root: u32,
    queue: QueueId,
    timeout: Timeout,
) -> Status {
    let status = validate(n_elem, threshold, root, group.size());
    if !status.is_success() {
        return status;
    }
    broadcast::broadcast_tree(transport, group, buf, n_elem, T::SIZE, threshold, root, queue, timeout)
}

/// Flat, (n−1)-write broadcast.
#[allow(clippy::too_many_arguments)]
pub fn broadcast_flat<T: Element>(
    transport: &dyn Transport,
    group: Group,
    buf: SegRef,
    n_elem: usize,
    threshold: Option<f64>,
    root: u32,
    queue: QueueId,
    timeout: Timeout,
) -> Status {
    let status = validate(n_elem, threshold, root, group.size());
    if !status.is_success() {
        return status;
    }
    broadcast::broadcast_flat(transport, group, buf, n_elem, T::SIZE, threshold, root, queue, timeout)
}

/// Binomial-tree reduce to `root`.
#[allow(clippy::too_many_arguments)]
pub fn reduce<T: Element>(
    transport: &dyn Transport,
    group: Group,
    send: SegRef,
    recv: SegRef,
    tmp: SegRef,
    n_elem: usize,
    op: ReduceOp,
    threshold: Option<f64>,
    root: u32,
    queue: QueueId,
    timeout: Timeout,
) -> Status {
    let status = validate(n_elem, threshold, root, group.size());
    if !status.is_success() {
        return status;
    }
    reduce::reduce::<T>(transport, group, send, recv, tmp, n_elem, op, threshold, root, queue, timeout)
}

/// Pipelined ring all-reduce. Strong only; there is no weak
/// all-reduce variant (see `crate::allreduce`'s module doc).
pub fn all_reduce_ring<T: Element>(
    transport: &dyn Transport,
    group: Group,
    send: SegRef,
    recv: SegRef,
    tmp: SegRef,
    n_elem: usize,
    op: ReduceOp,
    queue: QueueId,
    timeout: Timeout,
) -> Status {
    let status = validate(n_elem, None, 0, group.size());
    if !status.is_success() {
        return status;
    }
    allreduce::all_reduce_ring::<T>(transport, group, send, recv, tmp, n_elem, op, queue, timeout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_zero_elements_is_error() {
        assert_eq!(validate(0, None, 0, 4), Status::Error);
    }

    #[test]
    fn test_validate_root_out_of_range_is_error() {
        assert_eq!(validate(8, None, 4, 4), Status::Error);
    }

    #[test]
    fn test_validate_threshold_out_of_range_is_error() {
        assert_eq!(validate(8, Some(0.0), 0, 4), Status::Error);
        assert_eq!(validate(8, Some(1.5), 0, 4), Status::Error);
    }

    #[test]
    fn test_validate_threshold_one_is_ok() {
        assert_eq!(validate(8, Some(1.0), 0, 4), Status::Success);
    }

    #[test]
    fn test_validate_ok() {
        assert_eq!(validate(8, None, 2, 4), Status::Success);
    }
}
