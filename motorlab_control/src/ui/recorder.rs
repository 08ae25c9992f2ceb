//! Fixed-capacity data capture.
//!
//! Storage is allocated with the recorder, so sampling never allocates.
//! Samples past capacity are counted and dropped.

use motorlab_common::consts::RECORDER_CAPACITY;
use motorlab_common::time::Ticks;

/// What a capture records besides time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// Position and velocity (`g` command).
    PositionVelocity,
    /// Duty and velocity (step response after gain entry).
    DutyVelocity,
}

impl Capture {
    /// CSV header line.
    pub const fn header(self) -> &'static str {
        match self {
            Self::PositionVelocity => "Time (s), Position (rad), Velocity (rad/s)",
            Self::DutyVelocity => "Time (s), Duty (%), Velocity (rad/s)",
        }
    }
}

/// One captured row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Milliseconds since the capture started.
    pub elapsed_ms: u32,
    /// First channel.
    pub a: f64,
    /// Second channel.
    pub b: f64,
}

#[derive(Debug, Clone, Copy)]
struct Session {
    capture: Capture,
    start: Ticks,
    duration_us: u32,
}

/// Sample buffer for one motor.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    samples: heapless::Vec<Sample, RECORDER_CAPACITY>,
    session: Option<Session>,
    dropped: usize,
}

impl Recorder {
    /// Idle recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a capture, discarding anything recorded before.
    pub fn start(&mut self, now: Ticks, duration_us: u32, capture: Capture) {
        self.samples.clear();
        self.dropped = 0;
        self.session = Some(Session {
            capture,
            start: now,
            duration_us,
        });
    }

    /// True between `start` and `stop`.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Kind of the running capture.
    pub fn capture(&self) -> Option<Capture> {
        self.session.map(|s| s.capture)
    }

    /// True once the capture duration has elapsed.
    pub fn is_finished(&self, now: Ticks) -> bool {
        self.session
            .is_some_and(|s| now.has_reached(s.start.wrapping_add(s.duration_us)))
    }

    /// Append a row. Returns `false` if idle or full.
    pub fn sample(&mut self, now: Ticks, a: f64, b: f64) -> bool {
        let Some(session) = self.session else {
            return false;
        };
        let elapsed_ms = (now.diff(session.start).max(0) / 1_000) as u32;
        if self.samples.push(Sample { elapsed_ms, a, b }).is_err() {
            self.dropped += 1;
            return false;
        }
        true
    }

    /// End the capture. Samples stay readable until the next `start`.
    pub fn stop(&mut self) -> Option<Capture> {
        self.session.take().map(|s| s.capture)
    }

    /// Captured rows.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Rows lost to a full buffer.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// CSV body rows (no header): `time_s, a, b`.
    pub fn csv_rows(&self) -> impl Iterator<Item = String> + '_ {
        self.samples.iter().map(|s| {
            format!(
                "{:.3}, {:.4}, {:.4}",
                s.elapsed_ms as f64 / 1_000.0,
                s.a,
                s.b
            )
        })
    }
}
