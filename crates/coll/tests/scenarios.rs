//! End-to-end scenario and boundary-condition tests, run against
//! `coll-sim`'s in-process `Transport`. One test per concrete worked
//! example plus the boundary cases called out alongside them: the n=1
//! degenerate case, non-divisible element counts, threshold=1.0 strong
//! equivalence, a tiny threshold, and a zero element count.

use coll_core::{Group, SegRef, SegmentId};
use coll_sim::Cluster;
use coll_transport::element::{decode, encode};
use coll_transport::{QueueId, ReduceOp, Status, Timeout};

const SEND: SegRef = SegRef::new(SegmentId(0), 0);
const RECV: SegRef = SegRef::new(SegmentId(1), 0);
const TMP: SegRef = SegRef::new(SegmentId(2), 0);

#[test]
fn scenario_ring_allreduce_sum_n4_nelem8() {
    let n: u32 = 4;
    let n_elem = 8;
    let cluster = Cluster::new(n);
    let results = cluster.run(move |rank, transport| {
        let group = Group::new(rank, n);
        let values: Vec<i32> = (0..n_elem as i32).map(|i| i + rank as i32 + 1).collect();
        transport.write_local(SEND, &encode(&values));
        let status = coll::all_reduce_ring::<i32>(
            &transport, group, SEND, RECV, TMP, n_elem, ReduceOp::Sum, QueueId(0), Timeout::Block,
        );
        (status, decode::<i32>(&transport.read_local(RECV, n_elem * 4), n_elem))
    });
    let expected: Vec<i32> = (0..n_elem as i32).map(|i| 4 * i + 10).collect();
    for (status, recv) in results {
        assert_eq!(status, Status::Success);
        assert_eq!(recv, expected);
    }
}

#[test]
fn scenario_binomial_broadcast_n4_nelem8_root0() {
    let n: u32 = 4;
    let n_elem = 8;
    let root = 0;
    let cluster = Cluster::new(n);
    let results = cluster.run(move |rank, transport| {
        let group = Group::new(rank, n);
        let initial: Vec<i32> = if rank == root {
            (0..n_elem as i32).map(|i| i + 1).collect()
        } else {
            vec![0; n_elem]
        };
        transport.write_local(SEND, &encode(&initial));
        let status = coll::broadcast::<i32>(&transport, group, SEND, n_elem, None, root, QueueId(0), Timeout::Block);
        (status, decode::<i32>(&transport.read_local(SEND, n_elem * 4), n_elem))
    });
    let expected: Vec<i32> = (0..n_elem as i32).map(|i| i + 1).collect();
    for (status, buf) in results {
        assert_eq!(status, Status::Success);
        assert_eq!(buf, expected);
    }
}

#[test]
fn scenario_binomial_reduce_sum_n4_nelem4_root0() {
    let n: u32 = 4;
    let n_elem = 4;
    let root = 0;
    let cluster = Cluster::new(n);
    let results = cluster.run(move |rank, transport| {
        let group = Group::new(rank, n);
        let before = encode(&vec![rank as i32; n_elem]);
        transport.write_local(SEND, &before);
        let status = coll::reduce::<i32>(
            &transport, group, SEND, RECV, TMP, n_elem, ReduceOp::Sum, None, root, QueueId(0), Timeout::Block,
        );
        assert_eq!(transport.read_local(SEND, n_elem * 4), before, "send buffer must be unmodified");
        (rank, status, decode::<i32>(&transport.read_local(RECV, n_elem * 4), n_elem))
    });
    let (_, status, recv) = results.into_iter().find(|(r, ..)| *r == root).unwrap();
    assert_eq!(status, Status::Success);
    assert_eq!(recv, vec![6; n_elem]);
}

#[test]
fn scenario_weak_binomial_reduce_sum_n4_nelem8_threshold_half() {
    let n: u32 = 4;
    let n_elem = 8;
    let root = 0;
    let cluster = Cluster::new(n);
    let results = cluster.run(move |rank, transport| {
        let group = Group::new(rank, n);
        let values: Vec<i32> = (0..n_elem as i32).map(|i| i + rank as i32 + 1).collect();
        transport.write_local(SEND, &encode(&values));
        transport.write_local(RECV, &encode(&vec![0i32; n_elem]));
        let status = coll::reduce::<i32>(
            &transport, group, SEND, RECV, TMP, n_elem, ReduceOp::Sum, Some(0.5), root, QueueId(0), Timeout::Block,
        );
        (rank, status, decode::<i32>(&transport.read_local(RECV, n_elem * 4), n_elem))
    });
    let (_, status, recv) = results.into_iter().find(|(r, ..)| *r == root).unwrap();
    assert_eq!(status, Status::Success);
    let mut expected: Vec<i32> = (0..4).map(|i| 4 * i + 10).collect();
    expected.extend(vec![0; 4]);
    assert_eq!(recv, expected);
}

#[test]
fn scenario_flat_broadcast_weak_n3_nelem10_threshold_0_3_root1() {
    let n: u32 = 3;
    let n_elem = 10;
    let root = 1;
    let cluster = Cluster::new(n);
    let results = cluster.run(move |rank, transport| {
        let group = Group::new(rank, n);
        let initial: Vec<i32> = if rank == root {
            (0..n_elem as i32).map(|i| 100 + i).collect()
        } else {
            vec![0; n_elem]
        };
        transport.write_local(SEND, &encode(&initial));
        let status = coll::broadcast_flat::<i32>(
            &transport, group, SEND, n_elem, Some(0.3), root, QueueId(0), Timeout::Block,
        );
        (status, decode::<i32>(&transport.read_local(SEND, n_elem * 4), n_elem))
    });
    let mut expected: Vec<i32> = (0..3).map(|i| 100 + i).collect();
    expected.extend(vec![0; 7]);
    for (status, buf) in results {
        assert_eq!(status, Status::Success);
        assert_eq!(buf, expected);
    }
}

#[test]
fn scenario_ring_allreduce_max_i32_n3_nelem5() {
    let n: u32 = 3;
    let n_elem = 5;
    let cluster = Cluster::new(n);
    let results = cluster.run(move |rank, transport| {
        let group = Group::new(rank, n);
        let values: Vec<i32> = (0..n_elem as i32).map(|i| 10 * rank as i32 + i).collect();
        transport.write_local(SEND, &encode(&values));
        let status = coll::all_reduce_ring::<i32>(
            &transport, group, SEND, RECV, TMP, n_elem, ReduceOp::Max, QueueId(0), Timeout::Block,
        );
        (status, decode::<i32>(&transport.read_local(RECV, n_elem * 4), n_elem))
    });
    let expected: Vec<i32> = (0..n_elem as i32).map(|i| 20 + i).collect();
    for (status, recv) in results {
        assert_eq!(status, Status::Success);
        assert_eq!(recv, expected);
    }
}

#[test]
fn boundary_n1_every_collective_is_noop_success() {
    let cluster = Cluster::new(1);
    let n_elem = 4;
    let results = cluster.run(move |rank, transport| {
        let group = Group::new(rank, 1);
        let original = encode(&[1i32, 2, 3, 4]);
        transport.write_local(SEND, &original);
        transport.write_local(RECV, &original);

        let s1 = coll::broadcast::<i32>(&transport, group, SEND, n_elem, None, 0, QueueId(0), Timeout::Block);
        let s2 = coll::reduce::<i32>(
            &transport, group, SEND, RECV, TMP, n_elem, ReduceOp::Sum, None, 0, QueueId(0), Timeout::Block,
        );
        let s3 = coll::all_reduce_ring::<i32>(
            &transport, group, SEND, RECV, TMP, n_elem, ReduceOp::Sum, QueueId(0), Timeout::Block,
        );
        (s1, s2, s3, transport.read_local(RECV, 16))
    });
    let (s1, s2, s3, recv) = &results[0];
    assert_eq!(*s1, Status::Success);
    assert_eq!(*s2, Status::Success);
    assert_eq!(*s3, Status::Success);
    assert_eq!(*recv, encode(&[1i32, 2, 3, 4]));
}

#[test]
fn boundary_ring_allreduce_element_count_not_divisible_by_n() {
    let n: u32 = 3;
    let n_elem = 10;
    let cluster = Cluster::new(n);
    let results = cluster.run(move |rank, transport| {
        let group = Group::new(rank, n);
        let values: Vec<i32> = (0..n_elem as i32).map(|i| i + rank as i32).collect();
        transport.write_local(SEND, &encode(&values));
        let status = coll::all_reduce_ring::<i32>(
            &transport, group, SEND, RECV, TMP, n_elem, ReduceOp::Sum, QueueId(0), Timeout::Block,
        );
        (status, decode::<i32>(&transport.read_local(RECV, n_elem * 4), n_elem))
    });
    let expected: Vec<i32> = (0..n_elem as i32).map(|i| 3 * i + 3).collect();
    for (status, recv) in results {
        assert_eq!(status, Status::Success);
        assert_eq!(recv, expected);
    }
}

#[test]
fn boundary_threshold_one_matches_strong_variant() {
    let n: u32 = 4;
    let n_elem = 6;
    let root = 0;
    let cluster = Cluster::new(n);
    let strong = cluster.run(move |rank, transport| {
        let group = Group::new(rank, n);
        let initial: Vec<i32> = if rank == root { (0..n_elem as i32).collect() } else { vec![0; n_elem] };
        transport.write_local(SEND, &encode(&initial));
        coll::broadcast::<i32>(&transport, group, SEND, n_elem, None, root, QueueId(0), Timeout::Block);
        decode::<i32>(&transport.read_local(SEND, n_elem * 4), n_elem)
    });
    let weak = cluster.run(move |rank, transport| {
        let group = Group::new(rank, n);
        let initial: Vec<i32> = if rank == root { (0..n_elem as i32).collect() } else { vec![0; n_elem] };
        transport.write_local(SEND, &encode(&initial));
        coll::broadcast::<i32>(&transport, group, SEND, n_elem, Some(1.0), root, QueueId(0), Timeout::Block);
        decode::<i32>(&transport.read_local(SEND, n_elem * 4), n_elem)
    });
    assert_eq!(strong, weak);
}

#[test]
fn boundary_tiny_threshold_touches_exactly_one_element() {
    let n: u32 = 4;
    let n_elem = 8;
    let root = 0;
    let cluster = Cluster::new(n);
    let results = cluster.run(move |rank, transport| {
        let group = Group::new(rank, n);
        let initial: Vec<i32> = if rank == root {
            (0..n_elem as i32).map(|i| i + 1).collect()
        } else {
            vec![0; n_elem]
        };
        transport.write_local(SEND, &encode(&initial));
        let status = coll::broadcast::<i32>(&transport, group, SEND, n_elem, Some(0.001), root, QueueId(0), Timeout::Block);
        (status, decode::<i32>(&transport.read_local(SEND, n_elem * 4), n_elem))
    });
    for (status, buf) in results {
        assert_eq!(status, Status::Success);
        assert_eq!(buf[0], 1);
        assert_eq!(&buf[1..], &[0; 7]);
    }
}

#[test]
fn boundary_zero_element_count_is_error() {
    let cluster = Cluster::new(2);
    let results = cluster.run(move |rank, transport| {
        let group = Group::new(rank, 2);
        coll::broadcast::<i32>(&transport, group, SEND, 0, None, 0, QueueId(0), Timeout::Block)
    });
    for status in results {
        assert_eq!(status, Status::Error);
    }
}
