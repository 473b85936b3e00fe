// SPDX-License-Identifier: MIT
//! High-throughput concurrent append-only log writer.
//!
//! Many producer threads feed one background writer through bounded queues;
//! the writer batches framed records and appends them to a single file,
//! rotating it by size and/or calendar day without losing records. Producers
//! never touch the file: their only blocking point is the queue send when
//! the writer falls behind (back-pressure instead of drops).
//!
//! ```no_run
//! use acacia::Logger;
//!
//! let logger = Logger::start("app.log", "/var/log/myapp", "INFO")?;
//! logger.set_rotation(100, 5);
//!
//! acacia::log_info!(logger, "listener started");
//! acacia::log_error!(logger, "request {} failed", 17);
//!
//! logger.sync();
//! logger.close();
//! # Ok::<(), acacia::StartError>(())
//! ```

mod logger;
#[macro_use]
mod macros;
mod pool;
mod record;
mod rotate;
mod severity;
pub mod timestamp;
mod writer;

pub use logger::{
    Builder, Logger, StartError, Statistics, DEFAULT_BATCH_CAPACITY, DEFAULT_FLUSH_INTERVAL,
    DEFAULT_QUEUE_CAPACITY, MIN_QUEUE_CAPACITY,
};
pub use pool::{BufferPool, BufferSize, PooledBuf};
pub use record::Payload;
pub use severity::Severity;

/// Re-exported so `log_fields!` callers can build values without importing
/// serde_json themselves.
pub use serde_json::Value;

/// Crate version, written into the start banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Diagnostic side channel for internal failures (rename errors, reopen
/// errors, bad formats). Never panics, never reaches the log file.
pub(crate) fn internal(args: std::fmt::Arguments<'_>) {
    eprintln!("Acacia Internal: {args}");
}
