//! Thread-safe in-memory writer for handler output.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

/// Byte buffer shared between a handler and the test inspecting it.
///
/// The inner buffer is private so tests can't bypass the `Write`
/// implementation.
#[derive(Clone, Default)]
pub struct SharedBuf {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuf {
    /// The contents decoded as UTF-8, replacing invalid sequences.
    pub fn contents_string(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
