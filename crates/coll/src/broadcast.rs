//! Broadcast engine: the flat (n-1 write) and binomial-tree variants, each
//! with a strong and a weakly-consistent (threshold-prefix) flavor.

use coll_core::notif::{bcast_tree, flat};
use coll_core::{Group, SegRef, Topology};
use coll_transport::backoff::submit_with_backoff;
use coll_transport::{QueueId, Status, Timeout, Transport};

fn effective_len(n_elem: usize, threshold: Option<f64>) -> usize {
    match threshold {
        Some(t) => coll_core::threshold::prefix_len(t, n_elem),
        None => n_elem,
    }
}

/// Flat (n-1 write) broadcast from `root`. `elem_size` is the element
/// type's byte width; the engine itself is type-agnostic and moves raw
/// bytes, keeping a generic byte-moving core separate from the thin
/// typed wrappers in `crate::api`.
pub fn broadcast_flat(
    transport: &dyn Transport,
    group: Group,
    buf: SegRef,
    n_elem: usize,
    elem_size: usize,
    threshold: Option<f64>,
    root: u32,
    queue: QueueId,
    timeout: Timeout,
) -> Status {
    let n = group.size();
    let r = group.rank().as_u32();
    if n == 1 {
        return Status::Success;
    }
    let nbytes = effective_len(n_elem, threshold) * elem_size;

    if r == root {
        for dst in 0..n {
            if dst == root {
                continue;
            }
            let status = submit_with_backoff(transport, queue, || {
                transport.write_notify(
                    buf,
                    dst,
                    buf,
                    nbytes,
                    flat::data_id(dst),
                    flat::data_value(dst),
                    queue,
                    timeout,
                )
            });
            if !status.is_success() {
                return status;
            }
        }
        for dst in 0..n {
            if dst == root {
                continue;
            }
            let status = transport.wait_one(buf, flat::ack_id(n, dst), flat::ack_value(dst), timeout);
            if !status.is_success() {
                return status;
            }
        }
        Status::Success
    } else {
        let status = transport.wait_one(buf, flat::data_id(r), flat::data_value(r), timeout);
        if !status.is_success() {
            return status;
        }
        submit_with_backoff(transport, queue, || {
            transport.notify(root, buf, flat::ack_id(n, r), flat::ack_value(r), queue, timeout)
        })
    }
}

/// Binomial-tree broadcast from `root` (distance-doubling
/// round protocol). This is a self-contained per-step state machine
/// operating on logical ranks (`r XOR root`); it does not go through
/// `Topology::parent`/`children` (those compute a *different* spanning
/// tree, the lowest-set-bit one used by `reduce`). Every rank runs the
/// same loop; which role (sender/receiver/neither) it plays at each step
/// falls out of its own logical rank.
#[allow(clippy::too_many_arguments)]
pub fn broadcast_tree(
    transport: &dyn Transport,
    group: Group,
    buf: SegRef,
    n_elem: usize,
    elem_size: usize,
    threshold: Option<f64>,
    root: u32,
    queue: QueueId,
    timeout: Timeout,
) -> Status {
    let n = group.size();
    if n == 1 {
        return Status::Success;
    }
    let nbytes = effective_len(n_elem, threshold) * elem_size;
    let topo = Topology::for_root(n, root);
    let lr = topo.logical(group.rank().as_u32());
    let depth = topo.depth();

    for i in 0..depth {
        let dist = 1u32 << i;
        let is_sender = lr < dist && lr + dist < n;
        let is_receiver = lr >= dist && lr < (dist << 1);

        if is_receiver {
            let parent_lr = lr - dist;
            let parent_real = topo.real(parent_lr);
            let status = submit_with_backoff(transport, queue, || {
                transport.notify(
                    parent_real,
                    buf,
                    bcast_tree::ready_id(lr),
                    bcast_tree::ready_value(lr),
                    queue,
                    timeout,
                )
            });
            if !status.is_success() {
                return status;
            }
            let status = transport.wait_one(
                buf,
                bcast_tree::data_id(parent_lr, lr, n),
                bcast_tree::data_value(parent_lr),
                timeout,
            );
            if !status.is_success() {
                return status;
            }
            if i == depth - 1 {
                let status = submit_with_backoff(transport, queue, || {
                    transport.notify(
                        parent_real,
                        buf,
                        bcast_tree::final_ack_id(lr, parent_lr, n),
                        bcast_tree::final_ack_value(lr),
                        queue,
                        timeout,
                    )
                });
                if !status.is_success() {
                    return status;
                }
            }
        }

        if is_sender {
            let dst_lr = lr + dist;
            let dst_real = topo.real(dst_lr);
            let status = transport.wait_one(
                buf,
                bcast_tree::sender_waits_ready_id(dst_lr),
                bcast_tree::sender_waits_ready_value(dst_lr),
                timeout,
            );
            if !status.is_success() {
                return status;
            }
            let status = submit_with_backoff(transport, queue, || {
                transport.write_notify(
                    buf,
                    dst_real,
                    buf,
                    nbytes,
                    bcast_tree::write_id(lr, dst_lr, n),
                    bcast_tree::write_value(lr),
                    queue,
                    timeout,
                )
            });
            if !status.is_success() {
                return status;
            }
            if i == depth - 1 {
                let status = transport.wait_one(
                    buf,
                    bcast_tree::final_ack_id(dst_lr, lr, n),
                    bcast_tree::final_ack_value(dst_lr),
                    timeout,
                );
                if !status.is_success() {
                    return status;
                }
            }
        }
    }

    Status::Success
}
