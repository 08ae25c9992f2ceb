//! User task: single-key command interface.
//!
//! Lowercase commands address motor 1, uppercase motor 2. The task is a
//! small state machine advanced only from inside its own `run()`:
//!
//! ```text
//!   Init ──menu──► WaitForKey ──m/M──► EnterSetpoint ──CR──┐
//!    ▲                 │  ▲                                 │
//!    │                 │  └─────────────────────────────────┘
//!    │                 └──1/2──► PromptGains (Kp→Ki→Kd→step) ──CR──► WaitForKey
//!    └──────────────── Esc (from any state)
//! ```

use crate::control::pid::PidGains;
use crate::error::ControlError;
use crate::scheduler::Task;
use crate::shares::MotorShare;
use crate::ui::entry::{EntryEvent, NumericEntry};
use crate::ui::recorder::{Capture, Recorder};
use crate::ui::terminal::Terminal;
use motorlab_common::consts::{CAPTURE_DURATION_US, MAX_MOTORS, STEP_CAPTURE_DURATION_US};
use motorlab_common::hal::types::MotorId;
use motorlab_common::time::Ticks;
use tracing::{debug, info, trace, warn};

/// Escape key: redisplay the menu and abandon any entry in progress.
pub const KEY_ESCAPE: u8 = 0x1B;

const MENU: &[&str] = &[
    "_____________ MOTORLAB COMMANDS _____________",
    "z / Z   Zero the encoder position",
    "p / P   Print the position",
    "d / D   Print the velocity",
    "m / M   Enter a velocity setpoint",
    "g / G   Capture position and velocity for 30 s",
    "s / S   Stop a capture early",
    "c / C   Clear a bridge fault",
    "1 / 2   Enter gains and a velocity step for motor 1 / 2,",
    "        then capture duty and velocity for 10 s",
    "lowercase commands: motor 1",
    "UPPERCASE COMMANDS: MOTOR 2",
    "Esc     Redisplay this menu",
    "_____________________________________________",
];

/// Which value a gain prompt is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GainField {
    /// Proportional gain.
    Kp,
    /// Integral gain.
    Ki,
    /// Derivative gain.
    Kd,
    /// Velocity step applied once all gains are in.
    StepVelocity,
}

impl GainField {
    fn prompt(self) -> &'static str {
        match self {
            Self::Kp => "Kp [%/(rad/s)]",
            Self::Ki => "Ki [%/rad]",
            Self::Kd => "Kd [%/(rad/s^2)]",
            Self::StepVelocity => "Step velocity [rad/s]",
        }
    }

    fn next(self) -> Option<Self> {
        match self {
            Self::Kp => Some(Self::Ki),
            Self::Ki => Some(Self::Kd),
            Self::Kd => Some(Self::StepVelocity),
            Self::StepVelocity => None,
        }
    }
}

/// UI state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiState {
    /// Print the menu on the next run.
    Init,
    /// Waiting for a command key.
    WaitForKey,
    /// Typing a velocity setpoint.
    EnterSetpoint(MotorId),
    /// Typing gains and step velocity.
    PromptGains {
        /// Motor being tuned.
        motor: MotorId,
        /// Value being typed.
        field: GainField,
        /// Values collected so far.
        gains: PidGains,
    },
}

/// Operator interface task.
pub struct UserTask {
    terminal: Box<dyn Terminal>,
    shares: Vec<MotorShare>,
    recorders: [Recorder; MAX_MOTORS],
    stop_requested: [bool; MAX_MOTORS],
    seen_fault: [bool; MAX_MOTORS],
    entry: NumericEntry,
    state: UiState,
    /// The command that opened an entry may still have its line feed queued.
    swallow_line_feed: bool,
}

impl UserTask {
    /// Create the task over the shares of every motor on the board.
    pub fn new(terminal: Box<dyn Terminal>, shares: Vec<MotorShare>) -> Self {
        Self {
            terminal,
            shares,
            recorders: std::array::from_fn(|_| Recorder::new()),
            stop_requested: [false; MAX_MOTORS],
            seen_fault: [false; MAX_MOTORS],
            entry: NumericEntry::new(),
            state: UiState::Init,
            swallow_line_feed: false,
        }
    }

    /// Current state.
    pub fn state(&self) -> UiState {
        self.state
    }

    /// Capture buffer of a motor.
    pub fn recorder(&self, motor: MotorId) -> &Recorder {
        &self.recorders[motor.index()]
    }

    fn say(&mut self, line: &str) -> Result<(), ControlError> {
        self.terminal.write_line(line)
    }

    fn share(&self, motor: MotorId) -> Option<MotorShare> {
        self.shares.get(motor.index()).cloned()
    }

    fn show_menu(&mut self) -> Result<(), ControlError> {
        for line in MENU {
            self.terminal.write_line(line)?;
        }
        Ok(())
    }

    fn command(&mut self, now: Ticks, key: u8) -> Result<(), ControlError> {
        match key {
            b'1' => return self.begin_gain_prompt(MotorId::One),
            b'2' => return self.begin_gain_prompt(MotorId::Two),
            _ => {}
        }

        let (motor, cmd) = if key.is_ascii_uppercase() {
            (MotorId::Two, key.to_ascii_lowercase())
        } else {
            (MotorId::One, key)
        };
        if !matches!(cmd, b'z' | b'p' | b'd' | b'm' | b'g' | b's' | b'c') {
            trace!(key, "Ignored key");
            return Ok(());
        }
        let Some(share) = self.share(motor) else {
            return self.say(&format!("{motor} is not available"));
        };
        let n = motor.number();
        let idx = motor.index();

        match cmd {
            b'z' => {
                share.zero_request.write(true);
                self.say(&format!("Zeroing motor {n} position"))
            }
            b'p' => self.say(&format!(
                "Motor {n} position (rad): {:.4}",
                share.position.read()
            )),
            b'd' => self.say(&format!(
                "Motor {n} velocity (rad/s): {:.4}",
                share.velocity.read()
            )),
            b'm' => {
                self.entry.clear();
                self.swallow_line_feed = true;
                self.state = UiState::EnterSetpoint(motor);
                self.say(&format!("Enter velocity setpoint for motor {n} [rad/s]:"))
            }
            b'g' => {
                if self.recorders[idx].is_active() {
                    return self.say(&format!("Motor {n} capture already running"));
                }
                self.recorders[idx].start(now, CAPTURE_DURATION_US, Capture::PositionVelocity);
                self.stop_requested[idx] = false;
                info!(motor = %motor, "Position/velocity capture started");
                self.say(&format!("Collecting motor {n} data for 30 s..."))
            }
            b's' => {
                if self.recorders[idx].is_active() {
                    self.stop_requested[idx] = true;
                    Ok(())
                } else {
                    self.say(&format!("No capture running on motor {n}"))
                }
            }
            b'c' => {
                share.clear_fault_request.write(true);
                self.say(&format!("Clearing fault on motor {n}"))
            }
            _ => Ok(()),
        }
    }

    fn begin_gain_prompt(&mut self, motor: MotorId) -> Result<(), ControlError> {
        if self.share(motor).is_none() {
            return self.say(&format!("{motor} is not available"));
        }
        self.entry.clear();
        self.swallow_line_feed = true;
        self.state = UiState::PromptGains {
            motor,
            field: GainField::Kp,
            gains: PidGains::ZERO,
        };
        self.say(&format!("Tuning motor {}", motor.number()))?;
        self.say(&format!("{}:", GainField::Kp.prompt()))
    }

    fn setpoint_key(&mut self, motor: MotorId, key: u8) -> Result<(), ControlError> {
        match self.entry.feed(key) {
            EntryEvent::Ignored => Ok(()),
            EntryEvent::Edited => {
                let line = format!("Setpoint [rad/s]: {}", self.entry.text());
                self.say(&line)
            }
            EntryEvent::Committed(value) => {
                if let Some(share) = self.share(motor) {
                    share.reference_velocity.write(value);
                }
                self.state = UiState::WaitForKey;
                debug!(motor = %motor, value, "Setpoint entered");
                self.say(&format!(
                    "Motor {} setpoint: {value} rad/s",
                    motor.number()
                ))
            }
        }
    }

    fn gain_key(
        &mut self,
        now: Ticks,
        motor: MotorId,
        field: GainField,
        mut gains: PidGains,
        key: u8,
    ) -> Result<(), ControlError> {
        let value = match self.entry.feed(key) {
            EntryEvent::Ignored => return Ok(()),
            EntryEvent::Edited => {
                let line = format!("{}: {}", field.prompt(), self.entry.text());
                return self.say(&line);
            }
            EntryEvent::Committed(value) => value,
        };

        match field {
            GainField::Kp => gains.kp = value,
            GainField::Ki => gains.ki = value,
            GainField::Kd => gains.kd = value,
            GainField::StepVelocity => return self.start_step(now, motor, gains, value),
        }
        if let Some(next) = field.next() {
            self.state = UiState::PromptGains {
                motor,
                field: next,
                gains,
            };
            self.say(&format!("{}:", next.prompt()))?;
        }
        Ok(())
    }

    fn start_step(
        &mut self,
        now: Ticks,
        motor: MotorId,
        gains: PidGains,
        velocity: f64,
    ) -> Result<(), ControlError> {
        self.state = UiState::WaitForKey;
        let Some(share) = self.share(motor) else {
            return Ok(());
        };
        share.gains.write(gains);
        share.reference_velocity.write(velocity);

        let idx = motor.index();
        self.recorders[idx].start(now, STEP_CAPTURE_DURATION_US, Capture::DutyVelocity);
        self.stop_requested[idx] = false;
        info!(motor = %motor, ?gains, velocity, "Step response capture started");
        self.say(&format!(
            "Stepping motor {} to {velocity} rad/s, collecting data for 10 s...",
            motor.number()
        ))
    }

    fn report_faults(&mut self) -> Result<(), ControlError> {
        for idx in 0..self.shares.len() {
            let fault = self.shares[idx].fault.read();
            if fault && !self.seen_fault[idx] {
                let key = if idx == 0 { 'c' } else { 'C' };
                let line = format!("Fault detected on motor {}. Press {key} to clear.", idx + 1);
                self.say(&line)?;
            }
            self.seen_fault[idx] = fault;
        }
        Ok(())
    }

    fn service_captures(&mut self, now: Ticks) -> Result<(), ControlError> {
        for idx in 0..self.shares.len() {
            let Some(capture) = self.recorders[idx].capture() else {
                continue;
            };
            let stop = std::mem::take(&mut self.stop_requested[idx]);
            if stop || self.recorders[idx].is_finished(now) {
                self.finish_capture(idx)?;
                continue;
            }

            let share = &self.shares[idx];
            let a = match capture {
                Capture::PositionVelocity => share.position.read(),
                Capture::DutyVelocity => share.duty.read(),
            };
            let b = share.velocity.read();
            self.recorders[idx].sample(now, a, b);
        }
        Ok(())
    }

    fn finish_capture(&mut self, idx: usize) -> Result<(), ControlError> {
        let Some(capture) = self.recorders[idx].stop() else {
            return Ok(());
        };
        let dropped = self.recorders[idx].dropped();
        if dropped > 0 {
            warn!(motor = idx + 1, dropped, "Capture buffer overflowed");
        }

        self.terminal.write_line(capture.header())?;
        for row in self.recorders[idx].csv_rows() {
            self.terminal.write_line(&row)?;
        }

        for share in &self.shares {
            share.idle();
        }
        info!(
            motor = idx + 1,
            samples = self.recorders[idx].samples().len(),
            "Capture finished, motors idled"
        );
        self.say("Capture complete")
    }
}

impl Task for UserTask {
    fn name(&self) -> &'static str {
        "user"
    }

    fn run(&mut self, now: Ticks) -> Result<(), ControlError> {
        if self.state == UiState::Init {
            self.show_menu()?;
            self.state = UiState::WaitForKey;
            return Ok(());
        }

        if let Some(key) = self.terminal.read_key()? {
            let swallow = std::mem::take(&mut self.swallow_line_feed);
            if swallow && key == b'\n' {
                trace!("Dropped line feed after command");
            } else if key == KEY_ESCAPE {
                self.entry.clear();
                self.state = UiState::Init;
            } else {
                match self.state {
                    UiState::Init | UiState::WaitForKey => self.command(now, key)?,
                    UiState::EnterSetpoint(motor) => self.setpoint_key(motor, key)?,
                    UiState::PromptGains {
                        motor,
                        field,
                        gains,
                    } => self.gain_key(now, motor, field, gains, key)?,
                }
            }
        }

        self.report_faults()?;
        self.service_captures(now)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
