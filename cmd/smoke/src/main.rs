//! End-to-end smoke test: runs each of the six concrete scenarios from the
//! design docs' worked examples and checks every rank's receive buffer
//! against the closed-form expected value. Exits non-zero on any failure.

use coll_core::{Group, SegRef, SegmentId};
use coll_sim::Cluster;
use coll_transport::element::{decode, encode};
use coll_transport::{QueueId, ReduceOp, Status, Timeout};

const SEND: SegRef = SegRef::new(SegmentId(0), 0);
const RECV: SegRef = SegRef::new(SegmentId(1), 0);
const TMP: SegRef = SegRef::new(SegmentId(2), 0);

fn main() {
    let mut failures = 0;

    failures += run("ring all-reduce SUM n=4 n_elem=8", scenario_ring_allreduce_sum);
    failures += run("binomial broadcast n=4 n_elem=8 root=0", scenario_broadcast_tree);
    failures += run("binomial reduce SUM n=4 n_elem=4 root=0", scenario_reduce_sum);
    failures += run("weak binomial reduce SUM n=4 n_elem=8 threshold=0.5", scenario_reduce_weak);
    failures += run("flat broadcast weak n=3 n_elem=10 threshold=0.3 root=1", scenario_broadcast_flat_weak);
    failures += run("ring all-reduce MAX n=3 n_elem=5", scenario_ring_allreduce_max);

    if failures > 0 {
        eprintln!("{} scenario(s) failed", failures);
        std::process::exit(1);
    }
    println!("all scenarios passed");
}

fn run(name: &str, scenario: fn() -> bool) -> u32 {
    if scenario() {
        println!("ok   - {}", name);
        0
    } else {
        println!("FAIL - {}", name);
        1
    }
}

fn scenario_ring_allreduce_sum() -> bool {
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
    results.iter().all(|(status, recv)| status.is_success() && *recv == expected)
}

fn scenario_broadcast_tree() -> bool {
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
    results.iter().all(|(status, buf)| status.is_success() && *buf == expected)
}

fn scenario_reduce_sum() -> bool {
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
        let send_after = transport.read_local(SEND, n_elem * 4);
        (rank, status, decode::<i32>(&transport.read_local(RECV, n_elem * 4), n_elem), send_after == before)
    });
    let unchanged = results.iter().all(|(_, _, _, unchanged)| *unchanged);
    let (_, status, recv, _) = results.into_iter().find(|(r, ..)| *r == root).unwrap();
    unchanged && status.is_success() && recv == vec![6; n_elem]
}

fn scenario_reduce_weak() -> bool {
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
    let mut expected: Vec<i32> = (0..4).map(|i| 4 * i + 10).collect();
    expected.extend(vec![0; 4]);
    status.is_success() && recv == expected
}

fn scenario_broadcast_flat_weak() -> bool {
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
    results.iter().all(|(status, buf)| {
        let _ = Status::Success;
        status.is_success() && *buf == expected
    })
}

fn scenario_ring_allreduce_max() -> bool {
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
    results.iter().all(|(status, recv)| status.is_success() && *recv == expected)
}
