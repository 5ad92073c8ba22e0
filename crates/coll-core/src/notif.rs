//! Notification-id formulas.
//!
//! Each protocol phase gets an injective mapping from (logical event) to a
//! 32-bit notification id within a segment's id space, so concurrently
//! in-flight traffic from distinct senders/steps never collides. These
//! are pure functions — no I/O, no transport calls — kept in one place
//! rather than re-derived inline at every call site.
//!
//! `value` fields below are always `+1`-offset from the "obvious" integer,
//! because notification slot value `0` means "unset": engines must never
//! legitimately write 0 as a notification value.

/// Flat broadcast.
pub mod flat {
    /// Data notification id for a receiver at index `k` (its own position
    /// among non-root ranks, `k = rank` if root is excluded by the caller).
    pub fn data_id(k: u32) -> u32 {
        k
    }

    /// Value carried by the data notification.
    pub fn data_value(k: u32) -> u32 {
        k + 1
    }

    /// Ack notification id for non-root `k`, observed by the root.
    pub fn ack_id(n: u32, k: u32) -> u32 {
        n + k + 1
    }

    pub fn ack_value(k: u32) -> u32 {
        k + 1
    }
}

/// Binomial-tree broadcast.
pub mod bcast_tree {
    /// Ready notification a receiver `r` sends to its parent.
    pub fn ready_id(r: u32) -> u32 {
        r
    }

    pub fn ready_value(r: u32) -> u32 {
        r
    }

    /// Data notification id observed by receiver `r` from `parent`, in a
    /// group of size `n`. `ID = parent * n + r`.
    pub fn data_id(parent: u32, r: u32, n: u32) -> u32 {
        parent * n + r
    }

    pub fn data_value(parent: u32) -> u32 {
        parent + 1
    }

    /// Id a sender `r` waits on for destination `dst`'s readiness.
    pub fn sender_waits_ready_id(dst: u32) -> u32 {
        dst
    }

    pub fn sender_waits_ready_value(dst: u32) -> u32 {
        dst
    }

    /// Notification id used by sender `r` writing to destination `dst`,
    /// `ID = r * n + dst`.
    pub fn write_id(r: u32, dst: u32, n: u32) -> u32 {
        r * n + dst
    }

    pub fn write_value(r: u32) -> u32 {
        r + 1
    }

    /// Final-step quiescence ack: a receiver that just got data notifies
    /// its parent, `ID = r * n + parent`.
    pub fn final_ack_id(r: u32, parent: u32, n: u32) -> u32 {
        r * n + parent
    }

    pub fn final_ack_value(r: u32) -> u32 {
        r
    }
}

/// Binomial-tree reduce.
pub mod reduce_tree {
    /// A leaf's ready-from-parent wait id: `ID = r * n + parent`.
    pub fn leaf_ready_id(r: u32, parent: u32, n: u32) -> u32 {
        r * n + parent
    }

    /// The expected ready value is the same integer as the id,
    /// `value = r * n + parent`.
    pub fn leaf_ready_value(r: u32, parent: u32, n: u32) -> u32 {
        leaf_ready_id(r, parent, n)
    }

    /// A leaf's data-write id at the parent: `ID = r` (the leaf's own
    /// rank), value `= parent + 1`.
    pub fn leaf_write_id(r: u32) -> u32 {
        r
    }

    pub fn leaf_write_value(parent: u32) -> u32 {
        parent + 1
    }

    /// A leaf's ack-wait id: `ID = parent + 1`, same value.
    pub fn leaf_ack_id(parent: u32) -> u32 {
        parent + 1
    }

    pub fn leaf_ack_value(parent: u32) -> u32 {
        parent + 1
    }

    /// An internal node's ready-to-child id: `ID = child * n + r`, value
    /// equal to the id.
    pub fn internal_ready_id(child: u32, r: u32, n: u32) -> u32 {
        child * n + r
    }

    pub fn internal_ready_value(child: u32, r: u32, n: u32) -> u32 {
        internal_ready_id(child, r, n)
    }

    /// An internal node's ack-to-child id: `ID = r + 1`, same value.
    pub fn internal_ack_id(r: u32) -> u32 {
        r + 1
    }

    pub fn internal_ack_value(r: u32) -> u32 {
        r + 1
    }
}

/// Ring all-reduce.
pub mod ring {
    /// Phase pacing "ready to receive" id: `ID = r + i`, value `= r + 1`.
    pub fn ready_id(r: u32, i: u32) -> u32 {
        r + i
    }

    pub fn ready_value(r: u32) -> u32 {
        r + 1
    }

    /// Data write id: `ID = r * n + send_to + i`, value `= i + r + 1`.
    pub fn data_id(r: u32, send_to: u32, i: u32, n: u32) -> u32 {
        r * n + send_to + i
    }

    pub fn data_value(i: u32, r: u32) -> u32 {
        i + r + 1
    }

    /// Ack id sent back to `recv_from`: `ID = i + recv_from + 1`, value
    /// `= r + 1`.
    pub fn ack_id(i: u32, recv_from: u32) -> u32 {
        i + recv_from + 1
    }

    pub fn ack_value(r: u32) -> u32 {
        r + 1
    }
}
