//! Binomial-tree broadcast benchmark.
//! `<element_count> <iteration_count> [check]`; prints
//! `<n_elem> <median_s> <mean_s> <95%-ci-half-width>` from rank 0.

use std::time::Instant;

use coll_core::{Group, SegRef, SegmentId};
use coll_sim::Cluster;
use coll_transport::element::{decode, encode};
use coll_transport::{QueueId, Status, Timeout};

const ROOT: u32 = 0;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("usage: bench-bcast <element_count> <iteration_count> [check]");
        std::process::exit(1);
    }
    let n_elem: usize = match args[1].parse() {
        Ok(v) if v > 0 => v,
        _ => {
            eprintln!("element_count must be a positive integer");
            std::process::exit(1);
        }
    };
    let iterations: usize = match args[2].parse() {
        Ok(v) if v > 0 => v,
        _ => {
            eprintln!("iteration_count must be a positive integer");
            std::process::exit(1);
        }
    };
    let check = args.get(3).map(|s| s == "check").unwrap_or(false);

    let n: u32 = coll_core::env::env_get("COLL_BENCH_RANKS", 4);
    let buf = SegRef::new(SegmentId(0), 0);
    let cluster = Cluster::new(n);

    let results = cluster.run(move |rank, transport| {
        let group = Group::new(rank, n);
        let mut samples = Vec::with_capacity(iterations);
        let mut status = Status::Success;
        for _ in 0..iterations {
            let initial: Vec<i32> = if rank == ROOT {
                (0..n_elem as i32).map(|i| i + 1).collect()
            } else {
                vec![0; n_elem]
            };
            transport.write_local(buf, &encode(&initial));

            let start = Instant::now();
            status = coll::broadcast::<i32>(&transport, group, buf, n_elem, None, ROOT, QueueId(0), Timeout::Block);
            samples.push(start.elapsed().as_secs_f64());
            if !status.is_success() {
                break;
            }
        }
        let final_buf: Vec<i32> = decode(&transport.read_local(buf, n_elem * 4), n_elem);
        (rank, samples, status, final_buf)
    });

    let (_, samples, status, buf_root) = results.into_iter().find(|(r, ..)| *r == ROOT).unwrap();
    if !status.is_success() {
        eprintln!("broadcast failed: {}", status);
        std::process::exit(1);
    }

    if check {
        let expected: Vec<i32> = (0..n_elem as i32).map(|i| i + 1).collect();
        if buf_root != expected {
            eprintln!("check failed: receive buffer does not match the expected broadcast value");
            std::process::exit(1);
        }
    }

    let (median, mean, ci95) = stats(&samples);
    println!("{}\t{:.9}\t{:.9}\t{:.9}", n_elem, median, mean, ci95);
}

/// `(median, mean, 95%-confidence half-width)` over wall-clock samples in
/// seconds, using the normal approximation (`1.96 * stddev / sqrt(n)`).
fn stats(samples: &[f64]) -> (f64, f64, f64) {
    let n = samples.len();
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let variance = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0).max(1.0);
    let half_width = 1.96 * variance.sqrt() / (n as f64).sqrt();
    (median, mean, half_width)
}
