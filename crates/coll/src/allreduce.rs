//! Ring all-reduce: pipelined scatter-reduce followed by all-gather.
//! Strong variant only — a "weak" all-reduce isn't meaningful the way
//! it is for broadcast or reduce, since every rank needs every chunk
//! fully combined by the end regardless of how much was requested.

use coll_core::notif::ring;
use coll_core::{Group, SegRef};
use coll_transport::backoff::submit_with_backoff;
use coll_transport::element::{decode, encode};
use coll_transport::{Element, QueueId, ReduceOp, Status, Timeout, Transport};

/// `(start, len)` in elements for each of `n` chunks partitioning
/// `element_count`. The first `element_count % n` chunks get one extra
/// element; this keeps every rank within one element of an even share
/// regardless of divisibility.
fn partition(element_count: usize, n: usize) -> Vec<(usize, usize)> {
    let base = element_count / n;
    let rem = element_count % n;
    let mut out = Vec::with_capacity(n);
    let mut start = 0;
    for k in 0..n {
        let len = if k < rem { base + 1 } else { base };
        out.push((start, len));
        start += len;
    }
    out
}

#[allow(clippy::too_many_arguments)]
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
    let n = group.size();
    if n == 1 {
        // Caller's receive buffer must already reflect the identity; a
        // single-rank all-reduce touches no buffer.
        return Status::Success;
    }
    let r = group.rank().as_u32();
    let chunks = partition(n_elem, n as usize);

    let init = transport.read_local(send, n_elem * T::SIZE);
    transport.write_local(recv, &init);

    let send_to = (r + 1) % n;
    let recv_from = (r + n - 1) % n;

    // Phase A: scatter-reduce. At step i, rank r sends the chunk at index
    // (r - i) mod n and folds the chunk it receives, index (r - i - 1) mod
    // n, into its own copy via `op`.
    for i in 0..(n - 1) {
        let send_idx = mod_sub(r, i, n);
        let recv_idx = mod_sub(r, i + 1, n);
        let status = ring_step::<T>(
            transport,
            recv,
            tmp,
            queue,
            timeout,
            r,
            send_to,
            recv_from,
            i,
            n,
            chunks[send_idx as usize],
            chunks[recv_idx as usize],
            Some(op),
        );
        if !status.is_success() {
            return status;
        }
    }

    // Phase B: all-gather. Each step just forwards an already-fully-reduced
    // chunk one hop further around the ring, overwriting instead of
    // folding.
    for k in 0..(n - 1) {
        let send_idx = mod_add(mod_sub(r, k, n), 1, n);
        let recv_idx = mod_sub(r, k, n);
        let status = ring_step::<T>(
            transport,
            recv,
            tmp,
            queue,
            timeout,
            r,
            send_to,
            recv_from,
            k,
            n,
            chunks[send_idx as usize],
            chunks[recv_idx as usize],
            None,
        );
        if !status.is_success() {
            return status;
        }
    }

    Status::Success
}

fn mod_sub(a: u32, b: u32, n: u32) -> u32 {
    (a + n * (b / n + 1) - b) % n
}

fn mod_add(a: u32, b: u32, n: u32) -> u32 {
    (a + b) % n
}

/// One pipelined step: exchange a chunk with both ring neighbors, then
/// either reduce the inbound chunk into `recv` (`op = Some`, scatter-
/// reduce) or overwrite `recv`'s chunk with it (`op = None`, all-gather).
/// Every rank plays sender (to `send_to`) and receiver (from `recv_from`)
/// in the same step; the ready/data/ack round fired in both directions
/// keeps every rank's `tmp` region single-buffered without races.
#[allow(clippy::too_many_arguments)]
fn ring_step<T: Element>(
    transport: &dyn Transport,
    recv: SegRef,
    tmp: SegRef,
    queue: QueueId,
    timeout: Timeout,
    r: u32,
    send_to: u32,
    recv_from: u32,
    i: u32,
    n: u32,
    send_chunk: (usize, usize),
    recv_chunk: (usize, usize),
    op: Option<ReduceOp>,
) -> Status {
    // Tell recv_from our tmp buffer is free for its incoming write.
    let status = submit_with_backoff(transport, queue, || {
        transport.notify(recv_from, tmp, ring::ready_id(r, i), ring::ready_value(r), queue, timeout)
    });
    if !status.is_success() {
        return status;
    }

    // Wait for send_to to tell us its tmp buffer is free before writing.
    let status = transport.wait_one(tmp, ring::ready_id(send_to, i), ring::ready_value(send_to), timeout);
    if !status.is_success() {
        return status;
    }

    let (send_start, send_len) = send_chunk;
    let send_bytes = send_len * T::SIZE;
    let src = recv.byte_offset(send_start as u64 * T::SIZE as u64);
    let status = submit_with_backoff(transport, queue, || {
        transport.write_notify(
            src,
            send_to,
            tmp,
            send_bytes,
            ring::data_id(r, send_to, i, n),
            ring::data_value(i, r),
            queue,
            timeout,
        )
    });
    if !status.is_success() {
        return status;
    }

    // Wait for recv_from's chunk to land in our own tmp.
    let status = transport.wait_one(tmp, ring::data_id(recv_from, r, i, n), ring::data_value(i, recv_from), timeout);
    if !status.is_success() {
        return status;
    }

    let (recv_start, recv_len) = recv_chunk;
    let recv_bytes = recv_len * T::SIZE;
    let incoming_raw = transport.read_local(tmp, recv_bytes);
    let dst = recv.byte_offset(recv_start as u64 * T::SIZE as u64);

    match op {
        Some(op) => {
            let incoming: Vec<T> = decode(&incoming_raw, recv_len);
            let mut acc: Vec<T> = decode(&transport.read_local(dst, recv_bytes), recv_len);
            coll_transport::reducer::reduce_op(op, recv_len, &incoming, &mut acc);
            transport.write_local(dst, &encode(&acc));
        }
        None => {
            transport.write_local(dst, &incoming_raw);
        }
    }

    // Confirm receipt to recv_from, then wait for send_to's matching ack.
    let status = submit_with_backoff(transport, queue, || {
        transport.notify(recv_from, tmp, ring::ack_id(i, recv_from), ring::ack_value(r), queue, timeout)
    });
    if !status.is_success() {
        return status;
    }
    transport.wait_one(tmp, ring::ack_id(i, r), ring::ack_value(send_to), timeout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_even() {
        let p = partition(8, 4);
        assert_eq!(p, vec![(0, 2), (2, 2), (4, 2), (6, 2)]);
    }

    #[test]
    fn test_partition_uneven() {
        let p = partition(10, 3);
        assert_eq!(p, vec![(0, 4), (4, 3), (7, 3)]);
        assert_eq!(p.last().unwrap().0 + p.last().unwrap().1, 10);
    }

    #[test]
    fn test_partition_single_rank() {
        let p = partition(5, 1);
        assert_eq!(p, vec![(0, 5)]);
    }

    #[test]
    fn test_mod_sub_wraps() {
        assert_eq!(mod_sub(0, 1, 4), 3);
        assert_eq!(mod_sub(2, 5, 4), 1);
        assert_eq!(mod_add(3, 1, 4), 0);
    }
}
