//! Line-oriented input source.
//!
//! Reads one event per line from any reader (stdin for the headless binary,
//! an in-memory buffer in tests):
//!
//! ```text
//! # comment
//! focus editor.exe
//! down 0xA2        # VK_LCONTROL
//! down 32          # VK_SPACE, decimal
//! up 0x20
//! up 0xA2
//! ```
//!
//! Malformed lines are logged and skipped. The channel closes at end of input.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use thiserror::Error;
use tracing::{debug, warn};

use super::{CaptureError, InputSource, RawInputEvent};

/// Why a replay line could not be turned into an event.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplayError {
    #[error("unknown directive {0:?} (expected down, up or focus)")]
    UnknownDirective(String),
    #[error("missing argument for {0}")]
    MissingArgument(&'static str),
    #[error("invalid virtual-key code {0:?}")]
    InvalidKeyCode(String),
}

/// Parses one replay line. Blank lines and comments yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<RawInputEvent>, ReplayError> {
    let line = line.split('#').next().unwrap_or_default().trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (directive, argument) = match line.split_once(char::is_whitespace) {
        Some((d, a)) => (d, a.trim()),
        None => (line, ""),
    };

    match directive {
        "down" => Ok(Some(RawInputEvent::key_down(parse_vk(argument, "down")?))),
        "up" => Ok(Some(RawInputEvent::key_up(parse_vk(argument, "up")?))),
        "focus" if argument.is_empty() => Err(ReplayError::MissingArgument("focus")),
        "focus" => Ok(Some(RawInputEvent::ForegroundChanged {
            app_id: argument.to_string(),
        })),
        other => Err(ReplayError::UnknownDirective(other.to_string())),
    }
}

fn parse_vk(argument: &str, directive: &'static str) -> Result<u8, ReplayError> {
    if argument.is_empty() {
        return Err(ReplayError::MissingArgument(directive));
    }
    let parsed = match argument
        .strip_prefix("0x")
        .or_else(|| argument.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => argument.parse::<u8>(),
    };
    parsed.map_err(|_| ReplayError::InvalidKeyCode(argument.to_string()))
}

/// [`InputSource`] that replays a text script on a background thread.
pub struct ReplayInputSource {
    reader: Mutex<Option<Box<dyn BufRead + Send>>>,
    stopped: Arc<AtomicBool>,
}

impl ReplayInputSource {
    pub fn new(reader: impl BufRead + Send + 'static) -> Self {
        Self {
            reader: Mutex::new(Some(Box::new(reader))),
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replays standard input.
    pub fn stdin() -> Self {
        Self::new(std::io::BufReader::new(std::io::stdin()))
    }
}

impl InputSource for ReplayInputSource {
    fn start(&self) -> Result<mpsc::Receiver<RawInputEvent>, CaptureError> {
        let reader = self
            .reader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(CaptureError::AlreadyStarted)?;
        let (tx, rx) = mpsc::channel();
        let stopped = Arc::clone(&self.stopped);

        thread::Builder::new()
            .name("kbswitch-replay".to_string())
            .spawn(move || {
                for (number, line) in reader.lines().enumerate() {
                    if stopped.load(Ordering::SeqCst) {
                        break;
                    }
                    let line = match line {
                        Ok(line) => line,
                        Err(error) => {
                            warn!(%error, "replay input ended with a read error");
                            break;
                        }
                    };
                    match parse_line(&line) {
                        Ok(Some(event)) => {
                            if tx.send(event).is_err() {
                                break;
                            }
                        }
                        Ok(None) => {}
                        Err(error) => warn!(line = number + 1, %error, "skipping replay line"),
                    }
                }
                debug!("replay input finished");
            })
            .map_err(|e| CaptureError::ReaderStartFailed(e.to_string()))?;

        Ok(rx)
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}
