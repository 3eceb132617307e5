//! Turning local keystrokes into outgoing messages.
//!
//! [`Assembler::Chunked`] forwards whatever one read of local input produced.
//! [`Assembler::Line`] edits a line one character at a time, echoing locally,
//! and only releases it once the user hits enter.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::config::InputMode;

/// DEL, what most terminals send for backspace.
pub const ERASE: u8 = 127;

/// Back up, blank the cell, back up again.
pub const RUBOUT: &[u8] = b"\x08 \x08";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("line is full ({capacity} bytes)")]
pub struct LineFull {
    pub capacity: usize,
}

/// A byte buffer that refuses to grow past a fixed capacity.
#[derive(Debug)]
pub struct LineBuffer {
    buf: BytesMut,
    capacity: usize,
}

impl LineBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, byte: u8) -> Result<(), LineFull> {
        if self.buf.len() >= self.capacity {
            return Err(LineFull {
                capacity: self.capacity,
            });
        }
        self.buf.put_u8(byte);
        Ok(())
    }

    /// Remove the last byte. Popping an empty buffer leaves it empty.
    pub fn pop(&mut self) -> Option<u8> {
        let last = *self.buf.last()?;
        self.buf.truncate(self.buf.len() - 1);
        Some(last)
    }

    /// Copy the contents out with a trailing NUL and empty the buffer.
    pub fn take_message(&mut self) -> Bytes {
        let mut message = BytesMut::with_capacity(self.buf.len() + 1);
        message.extend_from_slice(&self.buf);
        message.put_u8(0);
        self.buf.clear();
        message.freeze()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Character-at-a-time line editing with manual echo.
#[derive(Debug)]
pub struct LineEditor {
    line: LineBuffer,
    overflowed: bool,
}

impl LineEditor {
    pub fn new(capacity: usize) -> Self {
        Self {
            line: LineBuffer::with_capacity(capacity),
            overflowed: false,
        }
    }

    /// Feed one character. Whatever should appear on the local display is
    /// appended to `echo`; a finished line comes back as a message.
    ///
    /// Characters that do not fit are dropped without echo, so the display
    /// always matches what will be sent.
    pub fn feed(&mut self, byte: u8, echo: &mut BytesMut) -> Option<Bytes> {
        match byte {
            ERASE => {
                self.line.pop();
                echo.extend_from_slice(RUBOUT);
                None
            }
            b'\n' => {
                echo.put_u8(b'\n');
                self.overflowed = false;
                Some(self.line.take_message())
            }
            _ => {
                match self.line.push(byte) {
                    Ok(()) => echo.put_u8(byte),
                    Err(full) if !self.overflowed => {
                        self.overflowed = true;
                        log::warn!("{full}, dropping input until end of line");
                    }
                    Err(_) => {}
                }
                None
            }
        }
    }

    /// The line typed so far.
    pub fn pending(&self) -> &[u8] {
        self.line.as_bytes()
    }
}

#[derive(Debug)]
pub enum Assembler {
    Chunked,
    Line(LineEditor),
}

impl Assembler {
    pub fn new(mode: InputMode, line_capacity: usize) -> Self {
        match mode {
            InputMode::Chunked => Self::Chunked,
            InputMode::Line => Self::Line(LineEditor::new(line_capacity)),
        }
    }

    /// Consume one read worth of local input.
    pub fn ingest(&mut self, chunk: &[u8], echo: &mut BytesMut, outgoing: &mut Vec<Bytes>) {
        match self {
            Self::Chunked => outgoing.push(Bytes::copy_from_slice(chunk)),
            Self::Line(editor) => {
                for &byte in chunk {
                    if let Some(message) = editor.feed(byte, echo) {
                        outgoing.push(message);
                    }
                }
            }
        }
    }

    pub fn pending(&self) -> &[u8] {
        match self {
            Self::Chunked => &[],
            Self::Line(editor) => editor.pending(),
        }
    }
}
