//! Runtime for single-pass key/value jobs that speak the Hadoop Streaming
//! line protocol: `key\tvalue\n` records on stdin/stdout, counters and status
//! as `reporter:` lines on stderr.

pub mod api;
pub mod config;
pub mod core;
pub mod framework;

#[cfg(test)]
mod tests;

pub use crate::api::map::Mapper;
pub use crate::api::record::{Parsable, Record, Renderable};
pub use crate::api::reduce::{Reducer, Values};
pub use crate::core::context::{Context, Counters};
pub use crate::core::engine::{Engine, RunSummary};
pub use crate::core::harness::{HarnessRun, StreamTestHarness, TestOutput};
pub use crate::core::registry::{JobRegistry, Mode};
pub use crate::framework::errors::{FerrumStreamError, Result};
