//! # coll-core — core types for the collective library
//!
//! Platform-agnostic building blocks shared by `coll-transport`, `coll-sim`
//! and `coll`: rank/group identity, segment references, binomial-tree
//! topology, weak-variant threshold arithmetic, notification-id formulas,
//! environment helpers, and diagnostic logging.
//!
//! This crate does not know what a `Transport` is — see `coll-transport`
//! for the adapter contract these types are addressed against.

pub mod diag;
pub mod env;
pub mod group;
pub mod notif;
pub mod segment;
pub mod threshold;
pub mod topology;

pub use group::{Group, Rank};
pub use segment::{SegRef, SegmentId};
pub use topology::Topology;
