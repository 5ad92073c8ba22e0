//! # coll — collective communication over a one-sided transport
//!
//! Broadcast, reduce, and ring all-reduce, each built from the
//! `coll_transport::Transport` contract. `api` is the public, typed
//! surface; `broadcast`, `reduce`, and `allreduce` hold the byte-level
//! engines it drives.

mod allreduce;
mod broadcast;
mod reduce;

pub mod api;

pub use api::{all_reduce_ring, broadcast, broadcast_flat, reduce};
