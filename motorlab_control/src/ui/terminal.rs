//! Operator terminal.
//!
//! The UI task never blocks: [`Terminal::read_key`] returns `None` when no
//! key is waiting.

use crate::error::ControlError;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use tracing::{debug, warn};

/// Byte-oriented serial-style console.
pub trait Terminal {
    /// Next pending key, if any.
    fn read_key(&mut self) -> Result<Option<u8>, ControlError>;

    /// Print one line.
    fn write_line(&mut self, line: &str) -> Result<(), ControlError>;
}

/// Process stdin/stdout.
///
/// A background thread blocks on stdin and forwards bytes over a channel.
/// Keys are handed out one per `read_key` call. The terminal stays in
/// its normal line mode, so keys arrive after Enter.
pub struct StdioTerminal {
    keys: Receiver<u8>,
    out: io::Stdout,
    input_closed: bool,
}

impl StdioTerminal {
    /// Spawn the stdin reader.
    ///
    /// # Errors
    /// `ControlError::Terminal` if the reader thread cannot be spawned.
    pub fn spawn() -> Result<Self, ControlError> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("stdin-reader".to_string())
            .spawn(move || {
                for byte in io::stdin().lock().bytes() {
                    match byte {
                        Ok(b) => {
                            if tx.send(b).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("stdin read failed: {e}");
                            break;
                        }
                    }
                }
                debug!("stdin reader finished");
            })?;
        Ok(Self {
            keys: rx,
            out: io::stdout(),
            input_closed: false,
        })
    }
}

impl Terminal for StdioTerminal {
    fn read_key(&mut self) -> Result<Option<u8>, ControlError> {
        match self.keys.try_recv() {
            Ok(b) => Ok(Some(b)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                if !self.input_closed {
                    warn!("stdin closed, no further operator input");
                    self.input_closed = true;
                }
                Ok(None)
            }
        }
    }

    fn write_line(&mut self, line: &str) -> Result<(), ControlError> {
        let mut out = self.out.lock();
        writeln!(out, "{line}")?;
        out.flush()?;
        Ok(())
    }
}

/// In-memory terminal for tests and scripted sessions.
///
/// Clones share the key queue and the transcript, so a test can keep one
/// handle while the UI task owns another.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTerminal {
    keys: Rc<RefCell<VecDeque<u8>>>,
    lines: Rc<RefCell<Vec<String>>>,
}

impl ScriptedTerminal {
    /// Empty terminal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue keys for the UI to read.
    pub fn type_keys(&self, keys: &[u8]) {
        self.keys.borrow_mut().extend(keys.iter().copied());
    }

    /// Keys not yet read.
    pub fn pending_keys(&self) -> usize {
        self.keys.borrow().len()
    }

    /// Everything written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// True if any written line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|l| l.contains(needle))
    }

    /// Forget the transcript.
    pub fn clear_output(&self) {
        self.lines.borrow_mut().clear();
    }
}

impl Terminal for ScriptedTerminal {
    fn read_key(&mut self) -> Result<Option<u8>, ControlError> {
        Ok(self.keys.borrow_mut().pop_front())
    }

    fn write_line(&mut self, line: &str) -> Result<(), ControlError> {
        self.lines.borrow_mut().push(line.to_string());
        Ok(())
    }
}
