//! Shared building blocks: tracing setup, the operation log capability and
//! small wire types used by more than one crate.

pub mod types;
pub mod utils;
pub mod oplog;

pub use oplog::{LogLevel, OperationLog};
