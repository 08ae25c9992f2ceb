//! Keystroke-driven numeric entry.
//!
//! The operator types a number one key at a time; the UI echoes the buffer
//! after every edit and acts on the committed value. Parsing is separate
//! from terminal I/O so the editing rules can be tested on their own.

use motorlab_common::consts::ENTRY_CAPACITY;

/// ASCII DEL, sent by most terminals for Backspace.
pub const KEY_DELETE: u8 = 0x7F;
/// ASCII BS.
pub const KEY_BACKSPACE: u8 = 0x08;

/// Classified keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKey {
    /// `'0'..='9'`.
    Digit(char),
    /// DEL or BS.
    Backspace,
    /// `'.'`.
    DecimalPoint,
    /// `'-'`.
    Minus,
    /// CR or LF.
    Terminator,
    /// Anything else.
    Other,
}

impl EntryKey {
    /// Classify a raw terminal byte.
    pub fn classify(byte: u8) -> Self {
        match byte {
            b'0'..=b'9' => Self::Digit(byte as char),
            KEY_DELETE | KEY_BACKSPACE => Self::Backspace,
            b'.' => Self::DecimalPoint,
            b'-' => Self::Minus,
            b'\r' | b'\n' => Self::Terminator,
            _ => Self::Other,
        }
    }
}

/// Result of feeding one key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryEvent {
    /// Buffer changed; echo it.
    Edited,
    /// Key had no effect.
    Ignored,
    /// Entry finished with this value; the buffer is empty again.
    Committed(f64),
}

/// Numeric entry buffer.
#[derive(Debug, Clone, Default)]
pub struct NumericEntry {
    buffer: heapless::String<ENTRY_CAPACITY>,
}

impl NumericEntry {
    /// Empty entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Text typed so far.
    pub fn text(&self) -> &str {
        self.buffer.as_str()
    }

    /// Discard the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Apply one raw key.
    pub fn feed(&mut self, byte: u8) -> EntryEvent {
        match EntryKey::classify(byte) {
            EntryKey::Digit(c) => self.push(c),
            EntryKey::Backspace => match self.buffer.pop() {
                Some(_) => EntryEvent::Edited,
                None => EntryEvent::Ignored,
            },
            EntryKey::DecimalPoint if !self.buffer.contains('.') => self.push('.'),
            EntryKey::Minus if !self.buffer.starts_with('-') => self.negate(),
            EntryKey::Terminator => EntryEvent::Committed(self.commit()),
            EntryKey::DecimalPoint | EntryKey::Minus | EntryKey::Other => EntryEvent::Ignored,
        }
    }

    fn push(&mut self, c: char) -> EntryEvent {
        if self.buffer.push(c).is_ok() {
            EntryEvent::Edited
        } else {
            EntryEvent::Ignored
        }
    }

    fn negate(&mut self) -> EntryEvent {
        let mut signed = heapless::String::<ENTRY_CAPACITY>::new();
        if signed.push('-').is_err() || signed.push_str(&self.buffer).is_err() {
            return EntryEvent::Ignored;
        }
        self.buffer = signed;
        EntryEvent::Edited
    }

    fn commit(&mut self) -> f64 {
        let value = match self.buffer.as_str() {
            "" | "." | "-" | "-." => 0.0,
            text => text.parse().unwrap_or(0.0),
        };
        self.buffer.clear();
        value
    }
}
