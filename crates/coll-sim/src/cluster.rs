//! `Cluster` — spins up `n` simulated ranks sharing one `SimTransport`
//! registry, each driven by its own OS thread. Each participant is a
//! single-threaded cooperative agent, realized literally here since
//! there is no green-thread runtime in this workspace.

use std::sync::Arc;

use crate::config::SimConfig;
use crate::transport::{build_registry, Registry, SimTransport};

pub struct Cluster {
    registry: Arc<Registry>,
    n: u32,
}

impl Cluster {
    pub fn new(n: u32) -> Self {
        Self::with_config(n, SimConfig::from_env())
    }

    pub fn with_config(n: u32, config: SimConfig) -> Self {
        assert!(n > 0, "cluster size must be positive");
        Cluster {
            registry: build_registry(n, config),
            n,
        }
    }

    pub fn size(&self) -> u32 {
        self.n
    }

    /// A `Transport` handle for one rank, sharing this cluster's state.
    pub fn transport(&self, rank: u32) -> SimTransport {
        assert!(rank < self.n, "rank {} out of range for n={}", rank, self.n);
        SimTransport::new(self.registry.clone(), rank)
    }

    /// Run `body` once per rank on its own OS thread, collecting each
    /// rank's return value in rank order. `body` must be `Sync` since all
    /// threads borrow it concurrently.
    pub fn run<F, R>(&self, body: F) -> Vec<R>
    where
        F: Fn(u32, SimTransport) -> R + Sync,
        R: Send,
    {
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..self.n)
                .map(|rank| {
                    let transport = self.transport(rank);
                    let body = &body;
                    scope.spawn(move || body(rank, transport))
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("rank thread panicked"))
                .collect()
        })
    }
}
