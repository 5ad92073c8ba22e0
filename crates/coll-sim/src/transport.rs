//! `SimTransport` — the in-process reference `Transport` implementation.
//!
//! Every simulated rank holds its own registered segments and its own
//! notification slots; `write_notify` crosses from the caller's rank into
//! the destination rank's state the way a real one-sided write would
//! cross the wire. Waiting is condvar-based, the same fallback-parking
//! approach `gvthread-runtime::parking::fallback` uses for its blocking
//! wait path.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use coll_core::SegRef;
use coll_transport::{CollResult, QueueId, Status, Timeout, Transport};

use crate::config::SimConfig;

#[derive(Default)]
struct RankState {
    segments: Mutex<HashMap<u32, Vec<u8>>>,
    notifs: Mutex<HashMap<(u32, u32), u32>>,
    notif_cv: Condvar,
    queue_used: Mutex<HashMap<u32, u32>>,
}

impl RankState {
    fn ensure_len(buf: &mut Vec<u8>, min_len: usize) {
        if buf.len() < min_len {
            buf.resize(min_len, 0);
        }
    }

    fn read(&self, seg: SegRef, len: usize) -> Vec<u8> {
        let mut segs = self.segments.lock().unwrap();
        let buf = segs.entry(seg.segment.0).or_default();
        let end = seg.offset as usize + len;
        Self::ensure_len(buf, end);
        buf[seg.offset as usize..end].to_vec()
    }

    fn write(&self, seg: SegRef, data: &[u8]) {
        let mut segs = self.segments.lock().unwrap();
        let buf = segs.entry(seg.segment.0).or_default();
        let end = seg.offset as usize + data.len();
        Self::ensure_len(buf, end);
        buf[seg.offset as usize..end].copy_from_slice(data);
    }

    fn set_notif(&self, segment: u32, notif_id: u32, value: u32) {
        let mut notifs = self.notifs.lock().unwrap();
        notifs.insert((segment, notif_id), value);
        self.notif_cv.notify_all();
    }

    fn take_one(&self, segment: u32, notif_id: u32, expected_value: u32, timeout: Timeout) -> Status {
        let mut notifs = self.notifs.lock().unwrap();
        let deadline = deadline_for(timeout);
        loop {
            if let Some(&v) = notifs.get(&(segment, notif_id)) {
                notifs.remove(&(segment, notif_id));
                return if v == expected_value {
                    Status::Success
                } else {
                    Status::Error
                };
            }
            match wait_step(&self.notif_cv, notifs, timeout, deadline) {
                Ok(g) => notifs = g,
                Err(status) => return status,
            }
        }
    }

    fn take_any(&self, segment: u32, id_start: u32, id_range: u32, timeout: Timeout) -> Result<(u32, u32), Status> {
        let mut notifs = self.notifs.lock().unwrap();
        let deadline = deadline_for(timeout);
        loop {
            let found = notifs
                .keys()
                .find(|&&(seg, id)| seg == segment && id >= id_start && id < id_start + id_range)
                .copied();
            if let Some(key) = found {
                let value = notifs.remove(&key).unwrap();
                return Ok((key.1, value));
            }
            match wait_step(&self.notif_cv, notifs, timeout, deadline) {
                Ok(g) => notifs = g,
                Err(status) => return Err(status),
            }
        }
    }
}

fn deadline_for(timeout: Timeout) -> Option<Instant> {
    match timeout {
        Timeout::Millis(ms) => Some(Instant::now() + Duration::from_millis(ms as u64)),
        Timeout::Block | Timeout::Test => None,
    }
}

/// Advance one step of a condvar wait loop, returning the re-acquired
/// guard on success or the `Status`/error to return on timeout/test-miss.
fn wait_step<'a>(
    cv: &'a Condvar,
    guard: std::sync::MutexGuard<'a, HashMap<(u32, u32), u32>>,
    timeout: Timeout,
    deadline: Option<Instant>,
) -> Result<std::sync::MutexGuard<'a, HashMap<(u32, u32), u32>>, Status> {
    match timeout {
        Timeout::Test => Err(Status::Timeout),
        Timeout::Block => Ok(cv.wait(guard).unwrap()),
        Timeout::Millis(_) => {
            let remaining = deadline
                .unwrap()
                .saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Status::Timeout);
            }
            let (g, result) = cv.wait_timeout(guard, remaining).unwrap();
            if result.timed_out() {
                Err(Status::Timeout)
            } else {
                Ok(g)
            }
        }
    }
}

pub(crate) struct Registry {
    ranks: Vec<RankState>,
    config: SimConfig,
}

/// A handle to one simulated rank's view of a shared, in-process cluster.
///
/// Cheap to clone-by-construction (it is just an `Arc` and a rank index);
/// every engine call goes through this as `&dyn Transport`.
#[derive(Clone)]
pub struct SimTransport {
    registry: Arc<Registry>,
    rank: u32,
}

impl SimTransport {
    pub(crate) fn new(registry: Arc<Registry>, rank: u32) -> Self {
        SimTransport { registry, rank }
    }

    fn state(&self, rank: u32) -> &RankState {
        &self.registry.ranks[rank as usize]
    }

    fn own(&self) -> &RankState {
        self.state(self.rank)
    }

    /// Consume one slot of simulated queue capacity; `false` means the
    /// caller must treat this as `QUEUE_FULL`.
    fn try_reserve(&self, queue: QueueId) -> bool {
        let mut used = self.own().queue_used.lock().unwrap();
        let slot = used.entry(queue.0).or_insert(0);
        if *slot >= self.registry.config.queue_capacity {
            false
        } else {
            *slot += 1;
            true
        }
    }

    fn latency(&self) {
        if self.registry.config.latency_us > 0 {
            std::thread::sleep(Duration::from_micros(self.registry.config.latency_us));
        }
    }
}

impl Transport for SimTransport {
    fn write_notify(
        &self,
        src: SegRef,
        dst_rank: u32,
        dst: SegRef,
        nbytes: usize,
        notif_id: u32,
        notif_value: u32,
        queue: QueueId,
        _timeout: Timeout,
    ) -> Status {
        if !self.try_reserve(queue) {
            return Status::QueueFull;
        }
        let payload = self.own().read(src, nbytes);
        self.latency();
        self.state(dst_rank).write(dst, &payload);
        self.state(dst_rank).set_notif(dst.segment.0, notif_id, notif_value);
        Status::Success
    }

    fn notify(
        &self,
        dst_rank: u32,
        dst: SegRef,
        notif_id: u32,
        notif_value: u32,
        queue: QueueId,
        _timeout: Timeout,
    ) -> Status {
        if !self.try_reserve(queue) {
            return Status::QueueFull;
        }
        self.state(dst_rank).set_notif(dst.segment.0, notif_id, notif_value);
        Status::Success
    }

    fn wait_one(
        &self,
        seg: SegRef,
        notif_id: u32,
        expected_value: u32,
        timeout: Timeout,
    ) -> Status {
        self.own().take_one(seg.segment.0, notif_id, expected_value, timeout)
    }

    fn wait_any(
        &self,
        segment: SegRef,
        id_start: u32,
        id_range: u32,
        timeout: Timeout,
    ) -> CollResult<(u32, u32)> {
        self.own().take_any(segment.segment.0, id_start, id_range, timeout)
    }

    fn flush(&self, queue: QueueId) -> Status {
        let mut used = self.own().queue_used.lock().unwrap();
        used.insert(queue.0, 0);
        Status::Success
    }

    fn read_local(&self, seg: SegRef, len: usize) -> Vec<u8> {
        self.own().read(seg, len)
    }

    fn write_local(&self, seg: SegRef, data: &[u8]) {
        self.own().write(seg, data);
    }
}

pub(crate) fn build_registry(n: u32, config: SimConfig) -> Arc<Registry> {
    let mut ranks = Vec::with_capacity(n as usize);
    for _ in 0..n {
        ranks.push(RankState::default());
    }
    Arc::new(Registry { ranks, config })
}
