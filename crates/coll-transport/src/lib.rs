//! # coll-transport — the adapter contract, status vocabulary, and local
//! reducer
//!
//! `Transport` is the only thing the collective engines in `coll` depend
//! on for I/O. This crate also defines the status alphabet (`Status`),
//! the element-type set (`Element`, `ReduceOp`), the local reducer, and
//! the mandatory queue-full backoff wrapper.

pub mod backoff;
pub mod element;
pub mod error;
pub mod queue;
pub mod reducer;
pub mod timeout;
pub mod transport;

pub use element::{Element, ReduceOp};
pub use error::{CollResult, Status};
pub use queue::QueueId;
pub use timeout::Timeout;
pub use transport::Transport;
