//! Shared plumbing for the Leader crates.
//!
//! At the moment this is only [`observability`]: every binary and
//! integration test installs its `tracing` subscriber through
//! [`observability::init_logging`], so log events emitted by the library
//! crates (`leader-http`, `leader-commands`) land in one place.
//!
//! ```no_run
//! use leader_common::observability::{init_logging, LogConfig};
//!
//! let path = init_logging(LogConfig::default())?;
//! tracing::info!(log_file = %path.display(), "ready");
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod observability;
