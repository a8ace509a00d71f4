//! Background keyboard listener.
//!
//! A listener thread pulls keys from a [`KeySource`] and publishes the most
//! recent one into a [`KeyCell`]. The game loop takes the cell once per tick.
//! Sources are read with a bounded timeout so the thread can notice a stop
//! request between keys; [`InputListener::stop_listening`] joins the thread.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, info, warn};

/// How long a source may block before the listener rechecks its stop flag.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Wait for each follow-up byte of an escape sequence.
const ESCAPE_TIMEOUT: Duration = Duration::from_millis(5);

const ESC: u8 = 0x1b;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Char(char),
    Ctrl(char),
    /// A lone escape byte or a sequence cut short.
    Esc,
    Other,
}

impl Key {
    /// Decodes one raw key sequence as read from a terminal in raw mode.
    pub fn from_bytes(bytes: &[u8]) -> Key {
        match bytes {
            [ESC, b'[', b'A'] => Key::Up,
            [ESC, b'[', b'B'] => Key::Down,
            [ESC, b'[', b'C'] => Key::Right,
            [ESC, b'[', b'D'] => Key::Left,
            [ESC, ..] => Key::Esc,
            [b @ 0x01..=0x1a] => Key::Ctrl((b'a' + b - 1) as char),
            [b] if b.is_ascii_graphic() || *b == b' ' => Key::Char(*b as char),
            _ => Key::Other,
        }
    }

    pub fn is_quit(self) -> bool {
        matches!(self, Key::Char('q') | Key::Ctrl('c'))
    }
}

impl From<KeyEvent> for Key {
    fn from(ev: KeyEvent) -> Key {
        match ev.code {
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Esc => Key::Esc,
            KeyCode::Char(c) if ev.modifiers.contains(KeyModifiers::CONTROL) => {
                Key::Ctrl(c.to_ascii_lowercase())
            }
            KeyCode::Char(c) => Key::Char(c),
            _ => Key::Other,
        }
    }
}

/// Single-slot cell holding the latest key. The listener overwrites, the
/// game loop takes.
#[derive(Debug, Default)]
pub struct KeyCell {
    slot: Mutex<Option<Key>>,
}

impl KeyCell {
    pub fn publish(&self, key: Key) {
        *self.lock() = Some(key);
    }

    pub fn get(&self) -> Option<Key> {
        *self.lock()
    }

    pub fn take(&self) -> Option<Key> {
        self.lock().take()
    }

    pub fn clear(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> MutexGuard<'_, Option<Key>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Produces keys for the listener thread.
pub trait KeySource: Send + 'static {
    /// Waits at most `timeout` for a key; `Ok(None)` when none arrived.
    fn next_key(&mut self, timeout: Duration) -> io::Result<Option<Key>>;
}

/// Raw byte input with a bounded wait.
pub trait ByteSource: Send + 'static {
    fn read_byte(&mut self, timeout: Duration) -> io::Result<Option<u8>>;
}

impl ByteSource for Receiver<u8> {
    fn read_byte(&mut self, timeout: Duration) -> io::Result<Option<u8>> {
        match self.recv_timeout(timeout) {
            Ok(b) => Ok(Some(b)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "byte source disconnected"))
            }
        }
    }
}

/// Assembles keys from raw bytes. After an escape byte, up to two more bytes
/// are read with a short timeout; a missing follow-up leaves the sequence
/// short and it decodes as [`Key::Esc`].
pub struct RawKeys<B> {
    bytes: B,
}

impl<B: ByteSource> RawKeys<B> {
    pub fn new(bytes: B) -> Self {
        RawKeys { bytes }
    }
}

impl<B: ByteSource> KeySource for RawKeys<B> {
    fn next_key(&mut self, timeout: Duration) -> io::Result<Option<Key>> {
        let first = match self.bytes.read_byte(timeout)? {
            Some(b) => b,
            None => return Ok(None),
        };

        let mut seq = vec![first];
        if first == ESC {
            for _ in 0..2 {
                match self.bytes.read_byte(ESCAPE_TIMEOUT) {
                    Ok(Some(b)) => seq.push(b),
                    _ => break,
                }
            }
        }

        Ok(Some(Key::from_bytes(&seq)))
    }
}

/// Key presses from the terminal through crossterm, which does its own
/// escape-sequence parsing.
#[derive(Debug, Default)]
pub struct TerminalKeys;

impl TerminalKeys {
    pub fn new() -> Self {
        TerminalKeys
    }
}

impl KeySource for TerminalKeys {
    fn next_key(&mut self, timeout: Duration) -> io::Result<Option<Key>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(ev) if ev.kind == KeyEventKind::Press => Ok(Some(Key::from(ev))),
            _ => Ok(None),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ListenerState {
    Idle,
    Listening,
    Stopped,
}

pub struct InputListener {
    state: ListenerState,
    cell: Arc<KeyCell>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl InputListener {
    pub fn new() -> Self {
        InputListener {
            state: ListenerState::Idle,
            cell: Arc::new(KeyCell::default()),
            stop: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    pub fn start_listening<S: KeySource>(&mut self, mut source: S) -> io::Result<()> {
        if self.state != ListenerState::Idle {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("cannot start a listener in state {:?}", self.state),
            ));
        }

        let cell = Arc::clone(&self.cell);
        let stop = Arc::clone(&self.stop);
        let handle = thread::Builder::new().name("input".into()).spawn(move || {
            while !stop.load(Ordering::Acquire) {
                match source.next_key(POLL_INTERVAL) {
                    Ok(Some(key)) => {
                        debug!("key {:?}", key);
                        cell.publish(key);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!("input listener stopped reading: {}", e);
                        break;
                    }
                }
            }
        })?;

        self.handle = Some(handle);
        self.state = ListenerState::Listening;
        info!("input listener started");
        Ok(())
    }

    /// Signals the thread and blocks until it has exited. Safe to call more
    /// than once.
    pub fn stop_listening(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("input listener panicked");
            }
            info!("input listener stopped");
        }
        self.state = ListenerState::Stopped;
    }

    pub fn key(&self) -> Option<Key> {
        self.cell.get()
    }

    pub fn take_key(&self) -> Option<Key> {
        self.cell.take()
    }

    pub fn clear_key(&self) {
        self.cell.clear();
    }
}

impl Default for InputListener {
    fn default() -> Self {
        InputListener::new()
    }
}

impl Drop for InputListener {
    fn drop(&mut self) {
        self.stop_listening();
    }
}
