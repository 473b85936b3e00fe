// SPDX-License-Identifier: MIT
//! The public logger: producer API, configuration, sync barrier, shutdown.
//!
//! A [`Logger`] is a handle over shared state (`Inner`) plus the sending
//! ends of the transport queues. All file mutation happens on the single
//! writer thread; producers only gate on severity, frame (on the formatted
//! path), and enqueue.

use crate::pool::{BufferPool, PooledBuf};
use crate::record::{self, Event, EventBody, Payload};
use crate::severity::Severity;
use crate::timestamp::{self, TimeCache};
use crate::writer::{Control, Writer};
use arc_swap::ArcSwapOption;
use chrono::Local;
use crossbeam_channel::{bounded, Sender};
use serde_json::Value;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Default capacity of each transport queue, in records.
pub const DEFAULT_QUEUE_CAPACITY: usize = 500_000;
/// Smallest accepted queue capacity.
pub const MIN_QUEUE_CAPACITY: usize = 1_000;
/// Default batch buffer capacity, in bytes.
pub const DEFAULT_BATCH_CAPACITY: usize = 64 * 1024;
/// Default periodic flush interval.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(100);

const CONTROL_QUEUE_CAPACITY: usize = 64;
const SYNC_ENQUEUE_TIMEOUT: Duration = Duration::from_secs(2);
const SYNC_ACK_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors surfaced by the constructor; nothing else in the API fails.
#[derive(Debug, thiserror::Error)]
pub enum StartError {
    #[error("log file name is empty")]
    EmptyName,
    #[error("directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),
    #[error("failed to open {}: {}", .0.display(), .1)]
    Open(PathBuf, #[source] io::Error),
    #[error("failed to spawn {0} thread: {1}")]
    Spawn(&'static str, #[source] io::Error),
}

/// Size/daily rotation settings, read by the writer at each flush.
#[derive(Debug, Clone)]
pub(crate) struct RotationPolicy {
    /// Cap in bytes; 0 disables size rotation.
    pub max_size: u64,
    /// Retained numbered backups per stem.
    pub max_backups: usize,
    pub daily: bool,
    /// `%Y-%m-%d` of the day the active file belongs to.
    pub last_day: String,
    /// One dated rotation is due regardless of the calendar.
    pub force_daily: bool,
}

pub(crate) struct Counters {
    pub write_calls: AtomicU64,
    pub rotations: AtomicU64,
}

/// State shared between producer handles, the writer, and the clock.
pub(crate) struct Inner {
    /// Full path of the active file.
    pub path: PathBuf,
    pub level: AtomicU8,
    pub structured: AtomicBool,
    pub closed: AtomicBool,
    pub rotation: Mutex<RotationPolicy>,
    /// Active file handle; empty while a reopen is outstanding.
    pub file: ArcSwapOption<File>,
    pub time: TimeCache,
    pub pool: Arc<BufferPool>,
    pub enqueue_seq: AtomicU64,
    pub dequeue_seq: AtomicU64,
    /// Producers past the `closed` check but not yet done with their send.
    /// `close` waits for this to reach zero before stopping the writer.
    pub in_flight: AtomicU64,
    pub counters: Counters,
    pub clock_stop: AtomicBool,
}

impl Inner {
    #[inline]
    pub fn structured(&self) -> bool {
        self.structured.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn min_level(&self) -> Severity {
        Severity::from_u8(self.level.load(Ordering::Relaxed)).unwrap_or(Severity::Info)
    }
}

/// Counter snapshot returned by [`Logger::statistics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statistics {
    /// Records accepted past the severity gate.
    pub enqueued: u64,
    /// Records the writer has consumed into a batch.
    pub dequeued: u64,
    /// Records still in flight (`enqueued - dequeued`).
    pub pending: u64,
    /// Write syscalls issued against the active file.
    pub write_calls: u64,
    /// Completed rotations, dated and numbered.
    pub rotations: u64,
}

struct Tasks {
    writer: JoinHandle<()>,
    clock: JoinHandle<()>,
}

/// Holds one in-flight admission; released once the producer's send is done.
struct AdmitGuard<'a>(&'a Inner);

impl Drop for AdmitGuard<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Configuration for [`Logger::start`]; invalid values silently keep the
/// default, mirroring the option behavior of the constructor's origins.
pub struct Builder {
    name: String,
    directory: PathBuf,
    level: String,
    queue_capacity: usize,
    batch_capacity: usize,
    flush_interval: Duration,
}

impl Builder {
    /// Minimum severity as a level name; unknown names fall back to Info
    /// with a diagnostic.
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Per-queue capacity in records (minimum 1000).
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        if capacity >= MIN_QUEUE_CAPACITY {
            self.queue_capacity = capacity;
        }
        self
    }

    /// Batch buffer capacity in bytes (must exceed 1024).
    pub fn batch_capacity(mut self, capacity: usize) -> Self {
        if capacity > 1024 {
            self.batch_capacity = capacity;
        }
        self
    }

    /// Periodic flush interval (must be non-zero).
    pub fn flush_interval(mut self, interval: Duration) -> Self {
        if !interval.is_zero() {
            self.flush_interval = interval;
        }
        self
    }

    /// Open the file, spawn the writer and clock, return the live logger.
    pub fn start(self) -> Result<Logger, StartError> {
        Logger::start_with(self)
    }
}

/// Concurrent append-only file logger with batching and rotation.
pub struct Logger {
    inner: Arc<Inner>,
    event_tx: Sender<Event>,
    raw_tx: Sender<PooledBuf>,
    ctrl_tx: Sender<Control>,
    stats: AtomicBool,
    tasks: Mutex<Option<Tasks>>,
}

impl Logger {
    /// Start with defaults: `Logger::start("app.log", "/var/log", "INFO")`.
    pub fn start(
        name: impl Into<String>,
        directory: impl Into<PathBuf>,
        level: impl Into<String>,
    ) -> Result<Logger, StartError> {
        Logger::builder(name, directory).level(level).start()
    }

    /// Builder with tunable queue capacity, batch capacity, and flush interval.
    pub fn builder(name: impl Into<String>, directory: impl Into<PathBuf>) -> Builder {
        Builder {
            name: name.into(),
            directory: directory.into(),
            level: "INFO".to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            batch_capacity: DEFAULT_BATCH_CAPACITY,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }

    fn start_with(builder: Builder) -> Result<Logger, StartError> {
        if builder.name.is_empty() {
            return Err(StartError::EmptyName);
        }
        if !builder.directory.is_dir() {
            return Err(StartError::MissingDirectory(builder.directory));
        }
        let level = Severity::parse(&builder.level).unwrap_or_else(|| {
            crate::internal(format_args!(
                "unknown log level {:?}, falling back to INFO",
                builder.level
            ));
            Severity::Info
        });

        let path = builder.directory.join(&builder.name);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| StartError::Open(path.clone(), err))?;
        let mut current_size = file.metadata().map(|m| m.len()).unwrap_or(0);

        let banner = format!(
            "=== Acacia Logger v{} started at {} ===\n",
            crate::VERSION,
            Local::now().to_rfc3339()
        );
        if (&file).write_all(banner.as_bytes()).is_ok() {
            current_size += banner.len() as u64;
        }

        let inner = Arc::new(Inner {
            path,
            level: AtomicU8::new(level.as_u8()),
            structured: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            rotation: Mutex::new(RotationPolicy {
                max_size: 0,
                max_backups: 0,
                daily: false,
                last_day: timestamp::today(),
                force_daily: false,
            }),
            file: ArcSwapOption::new(Some(Arc::new(file))),
            time: TimeCache::new(timestamp::SPECIAL),
            pool: BufferPool::shared(),
            enqueue_seq: AtomicU64::new(0),
            dequeue_seq: AtomicU64::new(0),
            in_flight: AtomicU64::new(0),
            counters: Counters {
                write_calls: AtomicU64::new(0),
                rotations: AtomicU64::new(0),
            },
            clock_stop: AtomicBool::new(false),
        });

        let (event_tx, event_rx) = bounded(builder.queue_capacity);
        let (raw_tx, raw_rx) = bounded(builder.queue_capacity);
        let (ctrl_tx, ctrl_rx) = bounded(CONTROL_QUEUE_CAPACITY);

        let writer = Writer::new(
            Arc::clone(&inner),
            event_rx,
            raw_rx,
            ctrl_rx,
            builder.batch_capacity,
            builder.flush_interval,
            current_size,
        );
        let writer = thread::Builder::new()
            .name("acacia-writer".to_string())
            .spawn(move || writer.run())
            .map_err(|err| StartError::Spawn("writer", err))?;

        let clock_inner = Arc::clone(&inner);
        let clock = thread::Builder::new()
            .name("acacia-clock".to_string())
            .spawn(move || {
                while !clock_inner.clock_stop.load(Ordering::Relaxed) {
                    thread::sleep(timestamp::REFRESH_INTERVAL);
                    clock_inner.time.refresh();
                }
            })
            .map_err(|err| StartError::Spawn("clock", err))?;

        Ok(Logger {
            inner,
            event_tx,
            raw_tx,
            ctrl_tx,
            stats: AtomicBool::new(false),
            tasks: Mutex::new(Some(Tasks { writer, clock })),
        })
    }

    /// Whether a record at `severity` would currently be accepted.
    #[inline]
    pub fn enabled(&self, severity: Severity) -> bool {
        !self.inner.closed.load(Ordering::SeqCst) && severity >= self.inner.min_level()
    }

    /// Admit a record past the severity and shutdown gates.
    ///
    /// The in-flight count is raised before `closed` is read and held until
    /// the guard drops after the send, so either an admitted producer is
    /// visible to a concurrent `close` (which then waits for it) or the
    /// producer sees `closed` and backs out. Checking the flag first would
    /// leave a window in which `close` tears the writer down under a record
    /// that already passed admission.
    fn admit(&self, severity: Severity) -> Option<AdmitGuard<'_>> {
        if severity < self.inner.min_level() {
            return None;
        }
        self.inner.in_flight.fetch_add(1, Ordering::SeqCst);
        if self.inner.closed.load(Ordering::SeqCst) {
            self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);
            return None;
        }
        Some(AdmitGuard(&self.inner))
    }

    /// Log a payload at an explicit severity.
    ///
    /// The record is framed on the calling thread into a pooled buffer and
    /// enqueued; the send blocks when the queue is full (back-pressure, no
    /// drops). See [`Logger::log_args`] for the zero-allocation literal path.
    pub fn log<'a>(&self, severity: Severity, payload: impl Into<Payload<'a>>) {
        let Some(_admit) = self.admit(severity) else {
            return;
        };
        let payload = payload.into();
        let ts = self.inner.time.stamp();
        let mut line = self.inner.pool.acquire(estimate_len(&ts, &payload));
        let structured = self.inner.structured();
        match payload {
            Payload::Text(body) => {
                if structured {
                    record::frame_json_msg(&mut line, ts.as_str(), severity, body.as_bytes());
                } else {
                    record::frame_text(&mut line, ts.as_str(), severity, body.as_bytes());
                }
            }
            Payload::Bytes(body) => {
                if structured {
                    record::frame_json_msg(&mut line, ts.as_str(), severity, body);
                } else {
                    record::frame_text(&mut line, ts.as_str(), severity, body);
                }
            }
            Payload::Fields(fields) => {
                if structured {
                    record::frame_json_fields(&mut line, ts.as_str(), severity, fields);
                } else {
                    record::frame_text_kv(&mut line, ts.as_str(), severity, fields);
                }
            }
        }
        self.send_raw(line);
    }

    /// Log pre-built format arguments.
    ///
    /// A literal with no placeholders (`format_args!("listening")`) carries
    /// a `&'static str` and is enqueued as a bare event with no allocation
    /// and no producer-side formatting; anything else renders into a pooled
    /// buffer. The `log_*!` macros route here.
    pub fn log_args(&self, severity: Severity, args: fmt::Arguments<'_>) {
        let Some(_admit) = self.admit(severity) else {
            return;
        };
        if let Some(body) = args.as_str() {
            self.send_event(Event {
                severity,
                body: EventBody::Text(body),
            });
            return;
        }
        let ts = self.inner.time.stamp();
        if self.inner.structured() {
            let mut rendered = self.inner.pool.acquire(128);
            let _ = rendered.write_fmt(args);
            let mut line = self.inner.pool.acquire(ts.len() + rendered.len() + 48);
            record::frame_json_msg(&mut line, ts.as_str(), severity, &rendered);
            self.send_raw(line);
        } else {
            let mut line = self.inner.pool.acquire(ts.len() + 64);
            record::frame_args(&mut line, ts.as_str(), severity, args);
            self.send_raw(line);
        }
    }

    /// Log a pre-encoded message body with zero producer-side work beyond
    /// the enqueue. The writer frames it with the cached timestamp.
    pub fn log_bytes(&self, severity: Severity, body: &'static [u8]) {
        let Some(_admit) = self.admit(severity) else {
            return;
        };
        self.send_event(Event {
            severity,
            body: EventBody::Bytes(body),
        });
    }

    /// Log a static string on the zero-allocation fast path.
    pub fn log_static(&self, severity: Severity, body: &'static str) {
        let Some(_admit) = self.admit(severity) else {
            return;
        };
        self.send_event(Event {
            severity,
            body: EventBody::Text(body),
        });
    }

    /// Log a key/value record; a JSON object in structured mode.
    pub fn log_fields(&self, severity: Severity, fields: &[(&str, Value)]) {
        self.log(severity, Payload::Fields(fields));
    }

    #[inline]
    pub fn debug<'a>(&self, payload: impl Into<Payload<'a>>) {
        self.log(Severity::Debug, payload);
    }

    #[inline]
    pub fn info<'a>(&self, payload: impl Into<Payload<'a>>) {
        self.log(Severity::Info, payload);
    }

    #[inline]
    pub fn warn<'a>(&self, payload: impl Into<Payload<'a>>) {
        self.log(Severity::Warn, payload);
    }

    #[inline]
    pub fn error<'a>(&self, payload: impl Into<Payload<'a>>) {
        self.log(Severity::Error, payload);
    }

    #[inline]
    pub fn critical<'a>(&self, payload: impl Into<Payload<'a>>) {
        self.log(Severity::Critical, payload);
    }

    /// Switch single-line JSON framing on or off.
    pub fn set_structured(&self, enabled: bool) {
        self.inner.structured.store(enabled, Ordering::Relaxed);
    }

    /// Install a strftime timestamp pattern; invalid patterns are rejected
    /// with a diagnostic and the previous pattern stays active.
    pub fn set_timestamp_format(&self, format: &str) {
        if !self.inner.time.set_format(format) {
            crate::internal(format_args!("invalid timestamp format {format:?}"));
        }
    }

    /// Configure size rotation: cap in MB and retained backup count.
    /// A zero cap disables size rotation; `backups` is clamped to at least 1.
    pub fn set_rotation(&self, size_mb: u64, backups: usize) {
        let mut rotation = self.inner.rotation.lock().unwrap();
        if size_mb == 0 {
            rotation.max_size = 0;
            rotation.max_backups = 0;
            return;
        }
        rotation.max_size = size_mb * 1024 * 1024;
        rotation.max_backups = backups.max(1);
    }

    /// Switch daily rotation on or off. Turning it on schedules a dated
    /// rotation at the next flush so today's file name appears immediately.
    pub fn set_daily_rotation(&self, enabled: bool) {
        let mut rotation = self.inner.rotation.lock().unwrap();
        rotation.daily = enabled;
        if enabled {
            rotation.last_day = timestamp::today();
            rotation.force_daily = true;
        }
    }

    /// Change the minimum severity.
    pub fn set_level(&self, level: Severity) {
        self.inner.level.store(level.as_u8(), Ordering::Relaxed);
    }

    /// Whether the logger is still accepting records.
    pub fn status(&self) -> bool {
        !self.inner.closed.load(Ordering::SeqCst)
    }

    /// Always 0: producers block instead of dropping. Kept for callers of
    /// older versions that counted discarded records.
    pub fn dropped(&self) -> u64 {
        0
    }

    /// Print a counter summary on close.
    pub fn set_statistics(&self, enabled: bool) {
        self.stats.store(enabled, Ordering::Relaxed);
    }

    /// Snapshot of the internal counters.
    pub fn statistics(&self) -> Statistics {
        let enqueued = self.inner.enqueue_seq.load(Ordering::SeqCst);
        let dequeued = self.inner.dequeue_seq.load(Ordering::SeqCst);
        Statistics {
            enqueued,
            dequeued,
            pending: enqueued.saturating_sub(dequeued),
            write_calls: self.inner.counters.write_calls.load(Ordering::Relaxed),
            rotations: self.inner.counters.rotations.load(Ordering::Relaxed),
        }
    }

    /// Wait until every record enqueued before this call is written, then
    /// fsync the active file.
    ///
    /// This is a barrier, not a pause: producers keep enqueueing, and their
    /// newer records are not covered. Each stage is bounded by a watchdog
    /// (2 s to hand the request to the writer, 5 s for the ack); on timeout
    /// the call returns while the writer still completes the work.
    pub fn sync(&self) {
        if self.inner.closed.load(Ordering::SeqCst) {
            return;
        }
        let target = self.inner.enqueue_seq.load(Ordering::SeqCst);
        let (ack_tx, ack_rx) = bounded::<()>(1);
        let request = Control::Barrier {
            target,
            ack: ack_tx,
        };
        if self.ctrl_tx.send_timeout(request, SYNC_ENQUEUE_TIMEOUT).is_err() {
            return;
        }
        let _ = ack_rx.recv_timeout(SYNC_ACK_TIMEOUT);
        if let Some(file) = self.inner.file.load_full() {
            let _ = file.sync_all();
        }
    }

    /// Stop accepting records, drain everything, fsync, and close the file.
    /// Idempotent; a second call returns immediately.
    pub fn close(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        // Producers admitted before the flag flipped may still be framing or
        // parked in their send; the writer keeps draining until they finish.
        while self.inner.in_flight.load(Ordering::SeqCst) > 0 {
            thread::sleep(Duration::from_millis(1));
        }
        let _ = self.ctrl_tx.send(Control::Shutdown);
        let tasks = self.tasks.lock().unwrap().take();
        if let Some(tasks) = tasks {
            let _ = tasks.writer.join();
            self.inner.clock_stop.store(true, Ordering::Relaxed);
            let _ = tasks.clock.join();
        }
        if let Some(file) = self.inner.file.load_full() {
            let _ = file.sync_all();
        }
        if self.stats.load(Ordering::Relaxed) {
            let stats = self.statistics();
            println!("====== LOGGER STATISTICS ======");
            println!("File: {}", self.inner.path.display());
            println!("Enqueued: {}", stats.enqueued);
            println!("Dequeued: {}", stats.dequeued);
            println!("Write Calls: {}", stats.write_calls);
            println!("Rotations: {}", stats.rotations);
        }
        self.inner.file.store(None);
    }

    fn send_event(&self, event: Event) {
        self.inner.enqueue_seq.fetch_add(1, Ordering::SeqCst);
        let _ = self.event_tx.send(event);
    }

    fn send_raw(&self, line: PooledBuf) {
        self.inner.enqueue_seq.fetch_add(1, Ordering::SeqCst);
        let _ = self.raw_tx.send(line);
    }

    #[cfg(test)]
    pub(crate) fn inner(&self) -> &Inner {
        &self.inner
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.close();
    }
}

/// Byte-sink adaptation: arbitrary bytes become one Info record each, with
/// exactly one trailing newline. Never errors and always reports the full
/// length consumed, so standard-library writers can target a logger.
impl io::Write for &Logger {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.log(Severity::Info, Payload::Bytes(buf));
        Ok(buf.len())
    }

    // The default write_fmt issues one write() per formatted fragment,
    // which would split a single write! into several records.
    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        self.log_args(Severity::Info, args);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Write for Logger {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut this = &*self;
        this.write(buf)
    }

    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        self.log_args(Severity::Info, args);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn estimate_len(ts: &str, payload: &Payload<'_>) -> usize {
    let body = match payload {
        Payload::Text(s) => s.len(),
        Payload::Bytes(b) => b.len(),
        Payload::Fields(fields) => fields.iter().map(|(key, _)| key.len() + 32).sum(),
    };
    ts.len() + body + 32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn read_log(dir: &tempfile::TempDir, name: &str) -> String {
        fs::read_to_string(dir.path().join(name)).unwrap()
    }

    #[test]
    fn test_start_empty_name() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Logger::start("", dir.path(), "INFO"),
            Err(StartError::EmptyName)
        ));
    }

    #[test]
    fn test_start_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no_such_dir");
        assert!(matches!(
            Logger::start("x.log", missing, "INFO"),
            Err(StartError::MissingDirectory(_))
        ));
    }

    #[test]
    fn test_start_unknown_level_falls_back_to_info() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::start("lvl.log", dir.path(), "LOUD").unwrap();
        logger.debug("quiet");
        logger.info("heard");
        logger.close();

        let content = read_log(&dir, "lvl.log");
        assert!(!content.contains("quiet"));
        assert!(content.contains("heard"));
    }

    #[test]
    fn test_banner_written_at_start() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::start("banner.log", dir.path(), "INFO").unwrap();
        logger.close();

        let content = read_log(&dir, "banner.log");
        assert!(content.starts_with("=== Acacia Logger v"));
    }

    #[test]
    fn test_invalid_queue_settings_keep_defaults() {
        let builder = Logger::builder("q.log", "/tmp")
            .queue_capacity(10)
            .batch_capacity(100)
            .flush_interval(Duration::ZERO);
        assert_eq!(builder.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(builder.batch_capacity, DEFAULT_BATCH_CAPACITY);
        assert_eq!(builder.flush_interval, DEFAULT_FLUSH_INTERVAL);
    }

    #[test]
    fn test_daily_rotation_with_forced_day() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::start("daily.log", dir.path(), "INFO").unwrap();

        logger.set_daily_rotation(true);
        logger.info("first message");
        logger.sync();

        let today = timestamp::today();
        let dated_today = dir.path().join(format!("daily-{today}.log"));
        assert!(dated_today.exists(), "missing dated file for today");

        // Pretend the active file belongs to an old day.
        logger.inner().rotation.lock().unwrap().last_day = "2000-01-01".to_string();

        logger.info("second message");
        logger.sync();

        assert!(dir.path().join("daily-2000-01-01.log").exists());
        let active = read_log(&dir, "daily.log");
        assert!(active.contains("second message"));
        logger.close();
    }

    #[test]
    fn test_sequences_match_after_sync() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::start("seq.log", dir.path(), "DEBUG").unwrap();
        for i in 0..100 {
            crate::log_info!(logger, "record {}", i);
        }
        logger.sync();

        let stats = logger.statistics();
        assert_eq!(stats.enqueued, 100);
        assert_eq!(stats.dequeued, 100);
        assert_eq!(stats.pending, 0);
        logger.close();
    }

    #[test]
    fn test_filtered_records_do_not_bump_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::start("gate.log", dir.path(), "ERROR").unwrap();
        logger.info("filtered");
        logger.debug("filtered");
        logger.error("kept");
        logger.sync();

        assert_eq!(logger.statistics().enqueued, 1);
        logger.close();
    }

    #[test]
    fn test_dropped_is_always_zero() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::start("drop.log", dir.path(), "INFO").unwrap();
        for _ in 0..100 {
            logger.info("x");
        }
        assert_eq!(logger.dropped(), 0);
        logger.close();
    }

    #[test]
    fn test_status_flips_on_close() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::start("status.log", dir.path(), "INFO").unwrap();
        assert!(logger.status());
        logger.close();
        assert!(!logger.status());
        // second close is a no-op
        logger.close();
    }
}
