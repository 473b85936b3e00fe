// SPDX-License-Identifier: MIT
// Writer task - drains the queues, batches bytes, owns all file state

use crate::logger::{Inner, RotationPolicy};
use crate::pool::PooledBuf;
use crate::record::{self, Event};
use crate::{rotate, timestamp};
use crossbeam_channel::{select, tick, Receiver, Sender};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

/// Control-queue messages handled between batches.
pub(crate) enum Control {
    /// Drain and flush until `dequeue_seq` reaches `target`, then ack.
    Barrier { target: u64, ack: Sender<()> },
    /// Drain everything, flush, and exit the writer loop.
    Shutdown,
}

/// Burst-drain limits, scaled by how far the producers are ahead.
fn drain_limit(pending: usize) -> usize {
    if pending > 10_000 {
        4096
    } else if pending > 1_000 {
        1024
    } else {
        256
    }
}

/// First whole-line prefix of `buf` no longer than `budget` bytes.
fn line_prefix_within(buf: &[u8], budget: usize) -> usize {
    let window = budget.min(buf.len());
    buf[..window]
        .iter()
        .rposition(|&b| b == b'\n')
        .map(|pos| pos + 1)
        .unwrap_or(0)
}

/// Length of the first line in `buf`, including its newline.
fn line_len(buf: &[u8]) -> usize {
    buf.iter()
        .position(|&b| b == b'\n')
        .map(|pos| pos + 1)
        .unwrap_or(buf.len())
}

pub(crate) struct Writer {
    inner: Arc<Inner>,
    event_rx: Receiver<Event>,
    raw_rx: Receiver<PooledBuf>,
    ctrl_rx: Receiver<Control>,
    batch: Vec<u8>,
    scratch: Vec<u8>,
    batch_capacity: usize,
    flush_interval: Duration,
    current_size: u64,
}

impl Writer {
    pub fn new(
        inner: Arc<Inner>,
        event_rx: Receiver<Event>,
        raw_rx: Receiver<PooledBuf>,
        ctrl_rx: Receiver<Control>,
        batch_capacity: usize,
        flush_interval: Duration,
        current_size: u64,
    ) -> Writer {
        Writer {
            inner,
            event_rx,
            raw_rx,
            ctrl_rx,
            batch: Vec::with_capacity(batch_capacity),
            scratch: Vec::with_capacity(batch_capacity),
            batch_capacity,
            flush_interval,
            current_size,
        }
    }

    /// Main loop; returns after a shutdown control message.
    pub fn run(mut self) {
        let event_rx = self.event_rx.clone();
        let raw_rx = self.raw_rx.clone();
        let ctrl_rx = self.ctrl_rx.clone();
        let ticker = tick(self.flush_interval);

        loop {
            select! {
                recv(event_rx) -> msg => match msg {
                    Ok(event) => {
                        self.consume_event(event);
                        self.drain();
                        self.maybe_flush();
                    }
                    Err(_) => {
                        self.shutdown();
                        return;
                    }
                },
                recv(raw_rx) -> msg => match msg {
                    Ok(line) => {
                        self.consume_raw(line);
                        self.drain();
                        self.maybe_flush();
                    }
                    Err(_) => {
                        self.shutdown();
                        return;
                    }
                },
                recv(ctrl_rx) -> msg => match msg {
                    Ok(Control::Barrier { target, ack }) => self.barrier(target, ack),
                    Ok(Control::Shutdown) | Err(_) => {
                        self.shutdown();
                        return;
                    }
                },
                recv(ticker) -> _ => self.flush(),
            }
        }
    }

    /// Frame a fast-path event straight into the batch buffer.
    fn consume_event(&mut self, event: Event) {
        let ts = self.inner.time.stamp();
        if self.inner.structured() {
            record::frame_json_msg(&mut self.batch, ts.as_str(), event.severity, event.body.as_bytes());
        } else {
            record::frame_text(&mut self.batch, ts.as_str(), event.severity, event.body.as_bytes());
        }
        self.inner.dequeue_seq.fetch_add(1, Ordering::SeqCst);
    }

    /// Append a pre-framed line and return its buffer to the pool.
    fn consume_raw(&mut self, line: PooledBuf) {
        self.batch.extend_from_slice(&line);
        self.inner.dequeue_seq.fetch_add(1, Ordering::SeqCst);
    }

    /// Opportunistically empty the queues, events first, up to the burst limit.
    fn drain(&mut self) {
        let pending = self.event_rx.len() + self.raw_rx.len();
        let limit = drain_limit(pending);
        let mut taken = 0;
        while taken < limit {
            if let Ok(event) = self.event_rx.try_recv() {
                self.consume_event(event);
                taken += 1;
                continue;
            }
            match self.raw_rx.try_recv() {
                Ok(line) => {
                    self.consume_raw(line);
                    taken += 1;
                }
                Err(_) => break,
            }
        }
    }

    /// Empty both queues completely (barrier and shutdown paths).
    fn drain_all(&mut self) {
        loop {
            if let Ok(event) = self.event_rx.try_recv() {
                self.consume_event(event);
                continue;
            }
            match self.raw_rx.try_recv() {
                Ok(line) => self.consume_raw(line),
                Err(_) => break,
            }
        }
    }

    fn maybe_flush(&mut self) {
        let threshold = if self.flush_interval > Duration::from_millis(100) {
            self.batch_capacity / 2
        } else {
            self.batch_capacity * 2 / 3
        };
        if self.batch.len() >= threshold {
            self.flush();
        }
    }

    /// One drain-and-write cycle: take the batch, run rotation, write.
    fn flush(&mut self) {
        // Bytes already in the scratch are residue of an earlier short write
        // and must stay in front of this cycle's batch.
        let residual = self.scratch.len();
        if residual == 0 {
            std::mem::swap(&mut self.batch, &mut self.scratch);
        } else if !self.batch.is_empty() {
            self.scratch.extend_from_slice(&self.batch);
            self.batch.clear();
        }

        let policy = self.inner.rotation.lock().unwrap().clone();

        if policy.daily {
            let today = timestamp::today();
            if policy.force_daily || today != policy.last_day {
                if !self.day_rotate(&policy, residual, &today) {
                    return;
                }
            }
        }

        if policy.max_size == 0 {
            self.write_plain();
        } else {
            self.write_segmented(policy.max_size, policy.daily, policy.max_backups);
        }
    }

    /// Perform a dated rotation; false means the old file is wedged and the
    /// whole flush is retried on the next cycle.
    fn day_rotate(&mut self, policy: &RotationPolicy, residual: usize, today: &str) -> bool {
        // Short-write residue was framed for the old day's file; land it
        // there before the rename.
        if residual > 0 && self.write_prefix(residual) < residual {
            return false;
        }

        // Toggling daily rotation on forces a rotation, but renaming an
        // empty active file would only churn inodes.
        if !(policy.force_daily && self.current_size == 0) {
            if !rotate::rotate_by_date(&self.inner, &policy.last_day, policy.max_backups) {
                // The content never moved. Leave last_day and the force flag
                // alone so the next flush retries the same rotation.
                return false;
            }
            self.current_size = 0;
        }

        let mut rotation = self.inner.rotation.lock().unwrap();
        rotation.last_day = today.to_string();
        rotation.force_daily = false;
        true
    }

    /// Write the whole scratch in one block (rotation disabled).
    fn write_plain(&mut self) {
        let len = self.scratch.len();
        if len > 0 {
            self.write_prefix(len);
        }
    }

    /// Write the scratch in newline-bounded segments so no file exceeds the
    /// size cap, rotating between segments.
    fn write_segmented(&mut self, max_size: u64, daily: bool, max_backups: usize) {
        while !self.scratch.is_empty() {
            let budget = max_size.saturating_sub(self.current_size) as usize;
            let chunk = line_prefix_within(&self.scratch, budget);
            if chunk > 0 {
                if self.write_prefix(chunk) < chunk {
                    return;
                }
                continue;
            }

            if self.current_size == 0 {
                // A single record larger than the cap: write it whole into
                // the empty file, then rotate it away.
                let line = line_len(&self.scratch);
                if self.write_prefix(line) < line {
                    return;
                }
            }
            if !rotate::rotate_by_size(&self.inner, daily, max_backups) {
                // Active file could not be renamed away; keep its size
                // accounting and retry on the next flush.
                return;
            }
            self.current_size = 0;
            if self.inner.file.load().is_none() {
                return;
            }
        }
    }

    /// Issue one write of `scratch[..len]`.
    ///
    /// Whatever the kernel reports written is dropped from the scratch and
    /// added to `current_size`; a short write leaves the tail for the next
    /// flush cycle, already framed.
    fn write_prefix(&mut self, len: usize) -> usize {
        let Some(file) = self.ensure_file() else {
            return 0;
        };
        loop {
            match (&*file).write(&self.scratch[..len]) {
                Ok(written) => {
                    self.inner.counters.write_calls.fetch_add(1, Ordering::Relaxed);
                    self.current_size += written as u64;
                    self.scratch.drain(..written);
                    if written < len {
                        crate::internal(format_args!(
                            "short write to {}: {written} of {len} bytes",
                            self.inner.path.display()
                        ));
                    }
                    return written;
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    crate::internal(format_args!(
                        "write to {} failed: {err}",
                        self.inner.path.display()
                    ));
                    return 0;
                }
            }
        }
    }

    /// Current file handle, re-opening the active path if the slot is empty
    /// after an earlier rotation failure.
    fn ensure_file(&mut self) -> Option<Arc<File>> {
        if let Some(file) = self.inner.file.load_full() {
            return Some(file);
        }
        match OpenOptions::new().create(true).append(true).open(&self.inner.path) {
            Ok(file) => {
                self.current_size = file.metadata().map(|m| m.len()).unwrap_or(0);
                let file = Arc::new(file);
                self.inner.file.store(Some(Arc::clone(&file)));
                Some(file)
            }
            Err(err) => {
                crate::internal(format_args!(
                    "open {} failed: {err}",
                    self.inner.path.display()
                ));
                None
            }
        }
    }

    /// Satisfy a sync barrier: everything enqueued before `target` must be
    /// consumed and flushed before the ack. Producers that bumped the
    /// sequence but have not finished their send yet are waited out.
    fn barrier(&mut self, target: u64, ack: Sender<()>) {
        let event_rx = self.event_rx.clone();
        let raw_rx = self.raw_rx.clone();
        loop {
            self.drain_all();
            self.flush();
            if self.inner.dequeue_seq.load(Ordering::SeqCst) >= target {
                let _ = ack.send(());
                return;
            }
            // A disconnected queue can deliver nothing further; waiting on
            // it would spin forever.
            select! {
                recv(event_rx) -> msg => match msg {
                    Ok(event) => self.consume_event(event),
                    Err(_) => return,
                },
                recv(raw_rx) -> msg => match msg {
                    Ok(line) => self.consume_raw(line),
                    Err(_) => return,
                },
                default(Duration::from_millis(1)) => {}
            }
        }
    }

    /// Final drain: consume every accepted record, then flush.
    ///
    /// A producer that passed the severity gate may still be parked inside
    /// its send, so the queues are drained until the dequeue sequence has
    /// caught up with the enqueue sequence, not merely until they look empty.
    fn shutdown(&mut self) {
        let event_rx = self.event_rx.clone();
        let raw_rx = self.raw_rx.clone();
        loop {
            self.drain_all();
            let enqueued = self.inner.enqueue_seq.load(Ordering::SeqCst);
            if self.inner.dequeue_seq.load(Ordering::SeqCst) >= enqueued {
                break;
            }
            select! {
                recv(event_rx) -> msg => match msg {
                    Ok(event) => self.consume_event(event),
                    Err(_) => break,
                },
                recv(raw_rx) -> msg => match msg {
                    Ok(line) => self.consume_raw(line),
                    Err(_) => break,
                },
                default(Duration::from_millis(1)) => {}
            }
        }
        self.flush();
    }
}
