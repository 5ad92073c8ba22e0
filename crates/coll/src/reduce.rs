//! Binomial-tree reduce to `root`. Leaves reduce directly out
//! of the caller's send buffer; internal nodes merge their children into
//! `recv` (legal scratch space for non-root ranks too, since a
//! non-root's receive buffer contents are explicitly unspecified) before
//! contributing upward.

use coll_core::notif::reduce_tree;
use coll_core::threshold::prefix_len;
use coll_core::{Group, SegRef, Topology};
use coll_transport::backoff::submit_with_backoff;
use coll_transport::element::{decode, encode};
use coll_transport::{Element, QueueId, ReduceOp, Status, Timeout, Transport};

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
    let n = group.size();
    let r = group.rank().as_u32();
    let n_eff = threshold.map_or(n_elem, |t| prefix_len(t, n_elem));
    let nbytes = n_eff * T::SIZE;

    if n == 1 {
        let bytes = transport.read_local(send, nbytes);
        transport.write_local(recv, &bytes);
        return Status::Success;
    }

    let topo = Topology::for_root(n, root);
    let children = topo.children(r);

    if !children.is_empty() {
        let init = transport.read_local(send, nbytes);
        transport.write_local(recv, &init);

        let id_start = *children.iter().min().unwrap();
        let id_end = *children.iter().max().unwrap();
        let id_range = id_end - id_start + 1;

        let mut remaining = children.clone();
        remaining.sort_unstable_by(|a, b| b.cmp(a));

        for child in remaining {
            let status = submit_with_backoff(transport, queue, || {
                transport.notify(
                    child,
                    tmp,
                    reduce_tree::internal_ready_id(child, r, n),
                    reduce_tree::internal_ready_value(child, r, n),
                    queue,
                    timeout,
                )
            });
            if !status.is_success() {
                return status;
            }

            let (arrived_from, _value) = match transport.wait_any(tmp, id_start, id_range, timeout) {
                Ok(v) => v,
                Err(status) => return status,
            };

            let incoming: Vec<T> = decode(&transport.read_local(tmp, nbytes), n_eff);
            let mut acc: Vec<T> = decode(&transport.read_local(recv, nbytes), n_eff);
            coll_transport::reducer::reduce_op(op, n_eff, &incoming, &mut acc);
            transport.write_local(recv, &encode(&acc));

            let status = submit_with_backoff(transport, queue, || {
                transport.notify(
                    arrived_from,
                    tmp,
                    reduce_tree::internal_ack_id(r),
                    reduce_tree::internal_ack_value(r),
                    queue,
                    timeout,
                )
            });
            if !status.is_success() {
                return status;
            }
        }
    }

    if r == root {
        return Status::Success;
    }

    let parent = topo.parent(r).expect("non-root rank always has a parent");
    let status = transport.wait_one(
        tmp,
        reduce_tree::leaf_ready_id(r, parent, n),
        reduce_tree::leaf_ready_value(r, parent, n),
        timeout,
    );
    if !status.is_success() {
        return status;
    }

    let src = if children.is_empty() { send } else { recv };
    let status = submit_with_backoff(transport, queue, || {
        transport.write_notify(
            src,
            parent,
            tmp,
            nbytes,
            reduce_tree::leaf_write_id(r),
            reduce_tree::leaf_write_value(parent),
            queue,
            timeout,
        )
    });
    if !status.is_success() {
        return status;
    }

    transport.wait_one(
        tmp,
        reduce_tree::leaf_ack_id(parent),
        reduce_tree::leaf_ack_value(parent),
        timeout,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use coll_core::SegmentId;
    use coll_sim::Cluster;

    fn segs() -> (SegRef, SegRef, SegRef) {
        (
            SegRef::new(SegmentId(0), 0),
            SegRef::new(SegmentId(1), 0),
            SegRef::new(SegmentId(2), 0),
        )
    }

    #[test]
    fn test_reduce_sum_n4_root0() {
        let cluster = Cluster::new(4);
        let (send, recv, tmp) = segs();
        let results = cluster.run(move |rank, transport| {
            let group = Group::new(rank, 4);
            transport.write_local(send, &encode(&[rank as i32; 4]));
            let status = reduce::<i32>(
                &transport, group, send, recv, tmp, 4, ReduceOp::Sum, None, 0, QueueId(0), Timeout::Block,
            );
            assert!(status.is_success());
            (rank, decode::<i32>(&transport.read_local(recv, 16), 4))
        });
        let (root_rank, root_recv) = results.into_iter().find(|(r, _)| *r == 0).unwrap();
        let _ = root_rank;
        assert_eq!(root_recv, vec![6, 6, 6, 6]);
    }

    #[test]
    fn test_reduce_weak_threshold_half_n4() {
        let cluster = Cluster::new(4);
        let (send, recv, tmp) = segs();
        let results = cluster.run(move |rank, transport| {
            let group = Group::new(rank, 4);
            let values: Vec<i32> = (0..8).map(|i| i as i32 + rank as i32 + 1).collect();
            transport.write_local(send, &encode(&values));
            transport.write_local(recv, &encode(&[0i32; 8]));
            let status = reduce::<i32>(
                &transport,
                group,
                send,
                recv,
                tmp,
                8,
                ReduceOp::Sum,
                Some(0.5),
                0,
                QueueId(0),
                Timeout::Block,
            );
            assert!(status.is_success());
            (rank, decode::<i32>(&transport.read_local(recv, 32), 8))
        });
        let (_, root_recv) = results.into_iter().find(|(r, _)| *r == 0).unwrap();
        assert_eq!(root_recv, vec![10, 14, 18, 22, 0, 0, 0, 0]);
    }

    #[test]
    fn test_reduce_singleton_group() {
        let cluster = Cluster::new(1);
        let (send, recv, tmp) = segs();
        let results = cluster.run(move |rank, transport| {
            let group = Group::new(rank, 1);
            transport.write_local(send, &encode(&[7i32, 8, 9]));
            let status = reduce::<i32>(
                &transport, group, send, recv, tmp, 3, ReduceOp::Sum, None, 0, QueueId(0), Timeout::Block,
            );
            assert!(status.is_success());
            decode::<i32>(&transport.read_local(recv, 12), 3)
        });
        assert_eq!(results[0], vec![7, 8, 9]);
    }

    #[test]
    fn test_reduce_send_buffer_unmodified() {
        let cluster = Cluster::new(4);
        let (send, recv, tmp) = segs();
        let results = cluster.run(move |rank, transport| {
            let group = Group::new(rank, 4);
            let before = encode(&[rank as i32; 4]);
            transport.write_local(send, &before);
            let status = reduce::<i32>(
                &transport, group, send, recv, tmp, 4, ReduceOp::Sum, None, 0, QueueId(0), Timeout::Block,
            );
            assert!(status.is_success());
            transport.read_local(send, 16)
        });
        for (rank, after) in results.into_iter().enumerate() {
            assert_eq!(after, encode(&[rank as i32; 4]));
        }
    }
}
