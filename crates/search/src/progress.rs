//! Sweep progress accounting and reporting.

use std::time::{Duration, Instant};

/// Snapshot handed to a [`ProgressSink`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    pub completed: usize,
    pub total: usize,
    pub percent: f64,
    pub elapsed: Duration,
    pub remaining: Duration,
}

/// Receives progress updates from worker threads.
pub trait ProgressSink: Send + Sync {
    fn report(&self, update: &ProgressUpdate);
}

/// Logs each update at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&self, update: &ProgressUpdate) {
        tracing::info!(
            completed = update.completed,
            total = update.total,
            elapsed_s = update.elapsed.as_secs_f64(),
            remaining_s = update.remaining.as_secs_f64(),
            "sweep {:.0}% complete",
            update.percent
        );
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _update: &ProgressUpdate) {}
}

/// Tracks completed work and decides when an update is worth emitting.
///
/// Percent never decreases, the remaining-time estimate never increases, and
/// an update is produced at most once per whole percent plus once at the end.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    started: Instant,
    total: usize,
    completed: usize,
    last_reported_percent: Option<u64>,
    last_remaining: Option<Duration>,
    finished_reported: bool,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self::starting_at(total, Instant::now())
    }

    pub fn starting_at(total: usize, started: Instant) -> Self {
        Self {
            started,
            total,
            completed: 0,
            last_reported_percent: None,
            last_remaining: None,
            finished_reported: false,
        }
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            100.0 * self.completed as f64 / self.total as f64
        }
    }

    pub fn advance(&mut self, count: usize) -> Option<ProgressUpdate> {
        self.advance_at(count, Instant::now())
    }

    /// Record `count` more finished evaluations as of `now`.
    pub fn advance_at(&mut self, count: usize, now: Instant) -> Option<ProgressUpdate> {
        self.completed = self.completed.saturating_add(count).min(self.total);
        let elapsed = now.saturating_duration_since(self.started);

        let estimate = if self.completed == 0 {
            None
        } else {
            let left = (self.total - self.completed) as f64;
            let seconds = elapsed.as_secs_f64() * left / self.completed as f64;
            Some(Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX))
        };
        let remaining = match (estimate, self.last_remaining) {
            (Some(fresh), Some(previous)) => fresh.min(previous),
            (Some(fresh), None) => fresh,
            (None, Some(previous)) => previous,
            (None, None) => Duration::ZERO,
        };
        if estimate.is_some() {
            self.last_remaining = Some(remaining);
        }

        let percent = self.percent();
        let whole = percent.floor() as u64;
        let finished = self.completed == self.total;
        let due = match self.last_reported_percent {
            None => true,
            Some(last) => whole > last,
        };
        if !(due || (finished && !self.finished_reported)) {
            return None;
        }

        self.last_reported_percent = Some(whole);
        self.finished_reported |= finished;
        Some(ProgressUpdate {
            completed: self.completed,
            total: self.total,
            percent,
            elapsed,
            remaining,
        })
    }
}
