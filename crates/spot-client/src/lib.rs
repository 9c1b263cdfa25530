//! Spot Client: upload runners and facts to a collector
//!
//! The collector is an HTTP service that stores runner definitions keyed by
//! uid and the facts produced by executing them.

pub mod collector;
pub mod error;

pub use collector::CollectorClient;
pub use error::{ClientError, Result};
