//! Cooperative fixed-period task loop.
//!
//! Tasks are registered in priority order before the loop starts. Each poll
//! visits them in that order and runs a task at most once if the current
//! time has reached its deadline. The deadline then moves forward by exactly
//! one period (`deadline += period`), never to `now + period`, so the long
//! run rate is exact. A late loop therefore catches up one run per poll.
//!
//! There is no preemption, no overrun detection and no fault isolation: the
//! first task error stops the loop. Every task's `shutdown()` still runs
//! afterwards so outputs end up safe.

use crate::error::ControlError;
use motorlab_common::time::{Clock, Ticks};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};

/// Unit of periodic work.
pub trait Task {
    /// Name for logs and statistics.
    fn name(&self) -> &'static str;

    /// One invocation. `now` is the time the poll started.
    fn run(&mut self, now: Ticks) -> Result<(), ControlError>;

    /// Drive outputs to a safe state. Called once when the loop ends.
    fn shutdown(&mut self) -> Result<(), ControlError> {
        Ok(())
    }
}

/// Per-task run statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    /// Completed runs.
    pub runs: u64,
    /// Deadline served by the last run.
    pub last_deadline: Option<Ticks>,
}

/// A task with its period and deadline.
pub struct ScheduledTask {
    period_us: u32,
    next_deadline: Ticks,
    task: Box<dyn Task>,
    stats: TaskStats,
}

impl ScheduledTask {
    /// Task name.
    pub fn name(&self) -> &'static str {
        self.task.name()
    }

    /// Period [µs].
    pub fn period_us(&self) -> u32 {
        self.period_us
    }

    /// Next deadline.
    pub fn next_deadline(&self) -> Ticks {
        self.next_deadline
    }

    /// Run statistics.
    pub fn stats(&self) -> TaskStats {
        self.stats
    }
}

/// The task loop.
pub struct Scheduler {
    start: Ticks,
    tasks: Vec<ScheduledTask>,
}

impl Scheduler {
    /// Create a scheduler whose first deadlines count from `start`.
    pub fn new(start: Ticks) -> Self {
        Self {
            start,
            tasks: Vec::new(),
        }
    }

    /// Register a task. Registration order is priority order.
    ///
    /// # Errors
    /// `ControlError::InvalidPeriod` if `period_us` is zero or exceeds the
    /// half range of the time base.
    pub fn add(&mut self, period_us: u32, task: Box<dyn Task>) -> Result<(), ControlError> {
        if period_us == 0 || period_us > i32::MAX as u32 {
            return Err(ControlError::InvalidPeriod {
                task: task.name(),
                period_us,
            });
        }
        debug!(task = task.name(), period_us, "Task registered");
        self.tasks.push(ScheduledTask {
            period_us,
            next_deadline: self.start.wrapping_add(period_us),
            task,
            stats: TaskStats::default(),
        });
        Ok(())
    }

    /// Registered tasks in priority order.
    pub fn tasks(&self) -> &[ScheduledTask] {
        &self.tasks
    }

    /// Run every due task once, in priority order.
    ///
    /// Returns the number of tasks that ran.
    ///
    /// # Errors
    /// The first task error. Tasks after the failing one are not visited.
    pub fn poll(&mut self, now: Ticks) -> Result<usize, ControlError> {
        let mut ran = 0;
        for entry in &mut self.tasks {
            if !now.has_reached(entry.next_deadline) {
                continue;
            }
            if let Err(e) = entry.task.run(now) {
                error!(task = entry.task.name(), "Task failed: {e}");
                return Err(e);
            }
            entry.stats.runs += 1;
            entry.stats.last_deadline = Some(entry.next_deadline);
            entry.next_deadline = entry.next_deadline.wrapping_add(entry.period_us);
            ran += 1;
        }
        Ok(ran)
    }

    /// Earliest pending deadline as seen from `now`.
    pub fn next_deadline(&self, now: Ticks) -> Option<Ticks> {
        self.tasks
            .iter()
            .map(|entry| entry.next_deadline)
            .min_by_key(|deadline| deadline.diff(now))
    }

    /// Poll until `running` clears or a task fails, then shut every task down.
    ///
    /// Before each poll the loop waits on `clock` for the earliest deadline.
    ///
    /// # Errors
    /// The task error that stopped the loop, otherwise the first shutdown error.
    pub fn run(&mut self, clock: &dyn Clock, running: &AtomicBool) -> Result<(), ControlError> {
        info!(tasks = self.tasks.len(), "Scheduler loop started");

        let mut outcome = Ok(());
        while running.load(Ordering::SeqCst) {
            if let Some(next) = self.next_deadline(clock.now()) {
                clock.wait_until(next);
            }
            if let Err(e) = self.poll(clock.now()) {
                outcome = Err(e);
                break;
            }
        }

        info!("Scheduler loop stopped, shutting tasks down");
        let shutdown = self.shutdown();
        outcome.and(shutdown)
    }

    /// Call `shutdown()` on every task, in priority order.
    ///
    /// # Errors
    /// The first shutdown error; later tasks are still shut down.
    pub fn shutdown(&mut self) -> Result<(), ControlError> {
        let mut first = Ok(());
        for entry in &mut self.tasks {
            if let Err(e) = entry.task.shutdown() {
                warn!(task = entry.task.name(), "Shutdown failed: {e}");
                if first.is_ok() {
                    first = Err(e);
                }
            }
        }
        first
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
