//! Pattern buffer with tail-only prompt search.
//!
//! Only the last `search_depth` bytes are searched for the prompt. A full
//! `show bgp evpn routes` can run to megabytes, the prompt is always at the
//! end.

use std::fmt;
use std::ops::Range;

use bytes::BytesMut;
use regex::bytes::Regex;

use crate::error::ChannelError;

/// Keeps printable output and line control characters, drops escape
/// sequences.
struct Printable<'a> {
    out: &'a mut BytesMut,
}

impl vte::Perform for Printable<'_> {
    fn print(&mut self, c: char) {
        let mut utf8 = [0u8; 4];
        self.out
            .extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
    }

    fn execute(&mut self, byte: u8) {
        if matches!(byte, b'\n' | b'\r' | b'\t') {
            self.out.extend_from_slice(&[byte]);
        }
    }
}

/// Buffer for accumulating channel output and searching it for prompts.
///
/// ANSI escape sequences are stripped on the way in. The parser keeps its
/// state between calls, so a sequence split across two reads is still
/// removed.
pub struct PatternBuffer {
    /// The accumulated, cleaned output.
    buffer: BytesMut,

    /// Escape sequence parser.
    parser: vte::Parser,

    /// How many bytes from the end to search for patterns.
    search_depth: usize,

    /// Cleared when a read gives up before the prompt. The device may still
    /// be printing that command's output.
    in_sync: bool,
}

impl PatternBuffer {
    /// Create a new pattern buffer with the specified search depth.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            parser: vte::Parser::new(),
            search_depth,
            in_sync: true,
        }
    }

    /// Extend the buffer with new data, stripping ANSI escape codes.
    pub fn extend(&mut self, data: &[u8]) {
        let mut printable = Printable {
            out: &mut self.buffer,
        };
        self.parser.advance(&mut printable, data);
    }

    /// Search only the tail of the buffer for the pattern.
    ///
    /// The returned range is relative to the start of the whole buffer.
    pub fn search_tail(&self, pattern: &Regex) -> Option<Range<usize>> {
        let start = self.buffer.len().saturating_sub(self.search_depth);
        pattern
            .find(&self.buffer[start..])
            .map(|m| (start + m.start())..(start + m.end()))
    }

    /// Remove and return everything up to the end of the first tail match.
    ///
    /// Output after the match stays buffered.
    pub fn take_through(&mut self, pattern: &Regex) -> Option<Vec<u8>> {
        let found = self.search_tail(pattern)?;
        Some(self.buffer.split_to(found.end).to_vec())
    }

    /// Take ownership of the buffer contents and reset.
    pub fn take(&mut self) -> Vec<u8> {
        self.buffer.split().to_vec()
    }

    /// Record that a read gave up waiting for the prompt.
    pub fn mark_out_of_sync(&mut self) {
        self.in_sync = false;
    }

    pub fn is_in_sync(&self) -> bool {
        self.in_sync
    }

    /// Drop leftovers of the previous command before a new one is sent.
    ///
    /// Fails once the buffer is out of sync: whatever arrives next may
    /// still belong to the command that timed out.
    pub fn prepare_for_command(&mut self) -> Result<(), ChannelError> {
        if !self.in_sync {
            return Err(ChannelError::OutOfSync);
        }
        self.buffer.clear();
        Ok(())
    }

    /// Get a reference to the buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the current buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl fmt::Debug for PatternBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternBuffer")
            .field("len", &self.buffer.len())
            .field("search_depth", &self.search_depth)
            .field("in_sync", &self.in_sync)
            .finish()
    }
}
