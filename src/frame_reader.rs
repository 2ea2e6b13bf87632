//! Frame synchronization over a byte source.
//!
//! The [`FrameReader`] owns a single frame buffer sized for the largest legal frame. It is
//! filled in place for every frame, so reading a stream never allocates after construction.

use crate::byte_source::ByteSource;
use crate::constants::{FRAME_HEADER_SIZE, MAX_FRAME_SIZE};
use crate::error::DemuxError;
use crate::header::FrameHeader;

use std::io;

/// Locates MPEG audio frames in a byte stream and reads them one at a time.
pub struct FrameReader {
    frame_buffer: Box<[u8]>,

    // Sliding window of the last bytes seen while scanning for a header.
    window: [u8; FRAME_HEADER_SIZE],
    window_len: usize,

    header: Option<FrameHeader>,
    frame_start: u64,
    // Number of bytes of the current frame already in `frame_buffer`.
    filled: usize,
}

impl Default for FrameReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReader {
    pub fn new() -> Self {
        FrameReader {
            frame_buffer: vec![0u8; MAX_FRAME_SIZE].into_boxed_slice(),
            window: [0; FRAME_HEADER_SIZE],
            window_len: 0,
            header: None,
            frame_start: 0,
            filled: 0,
        }
    }

    /// Hands bytes that were already consumed from the stream back to the scanner, so the next
    /// scan treats them as if they had just been read. They must directly precede the current
    /// stream position. A header needs one more byte from the stream to complete, so only the
    /// last three bytes are kept.
    pub fn append_to_scan_buffer(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if self.window_len == FRAME_HEADER_SIZE - 1 {
                self.window.copy_within(1..FRAME_HEADER_SIZE - 1, 0);
                self.window_len -= 1;
            }
            self.window[self.window_len] = byte;
            self.window_len += 1;
        }
    }

    /// Reads the stream one byte at a time until the last four bytes form a valid frame header.
    ///
    /// At most `max_bytes` candidate header positions are examined. When none matches (or the
    /// stream ends first) this returns `Ok(false)`, or [`DemuxError::NoFrameFound`] if
    /// `require_match` is set. On success the header is the start of the frame buffer and the
    /// stream is positioned right after it.
    pub fn scan_for_frame<S>(
        &mut self,
        source: &mut S,
        max_bytes: usize,
        require_match: bool,
    ) -> Result<bool, DemuxError>
    where
        S: ByteSource + ?Sized,
    {
        self.header = None;
        self.filled = 0;

        let mut examined = 0;
        while examined < max_bytes {
            let Some(byte) = source.read_byte()? else {
                break;
            };
            self.push_window(byte);

            if self.window_len < FRAME_HEADER_SIZE {
                continue;
            }
            examined += 1;

            if let Some(header) = FrameHeader::parse(&self.window) {
                self.frame_start = source.position().saturating_sub(FRAME_HEADER_SIZE as u64);
                self.frame_buffer[..FRAME_HEADER_SIZE].copy_from_slice(&self.window);
                self.filled = FRAME_HEADER_SIZE;
                self.header = Some(header);
                self.window_len = 0;
                return Ok(true);
            }
        }

        if require_match {
            return Err(DemuxError::NoFrameFound { scanned: examined });
        }
        Ok(false)
    }

    /// Reads the rest of the current frame into the frame buffer, scanning for the next header
    /// first if there is no current frame. Returns `Ok(false)` at the end of the stream.
    pub fn fill_frame_buffer<S>(&mut self, source: &mut S) -> Result<bool, DemuxError>
    where
        S: ByteSource + ?Sized,
    {
        if self.header.is_none() && !self.scan_for_frame(source, MAX_FRAME_SIZE, false)? {
            return Ok(false);
        }

        let Some(header) = self.header else {
            return Ok(false);
        };

        let size = header.frame_size;
        if self.filled < size {
            match source.read_exact(&mut self.frame_buffer[self.filled..size]) {
                Ok(()) => self.filled = size,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(false),
                Err(e) => return Err(e.into()),
            }
        }

        Ok(true)
    }

    /// Drops the current frame. The stream is already positioned at its end, so the next
    /// [`fill_frame_buffer`](Self::fill_frame_buffer) picks up the following frame without
    /// re-reading anything. Also used after the stream was repositioned by a seek.
    pub fn next_frame(&mut self) {
        self.header = None;
        self.filled = 0;
        self.window_len = 0;
    }

    /// Absolute byte position of the current frame's header.
    #[inline]
    pub fn frame_start_position(&self) -> u64 {
        self.frame_start
    }

    /// Declared length of the current frame, or 0 without one.
    #[inline]
    pub fn frame_size(&self) -> usize {
        self.header.map_or(0, |header| header.frame_size)
    }

    #[inline]
    pub fn header(&self) -> Option<&FrameHeader> {
        self.header.as_ref()
    }

    /// Bytes of the current frame read so far; the whole frame after a successful fill.
    #[inline]
    pub fn frame(&self) -> &[u8] {
        &self.frame_buffer[..self.filled]
    }

    fn push_window(&mut self, byte: u8) {
        if self.window_len == FRAME_HEADER_SIZE {
            self.window.copy_within(1.., 0);
            self.window[FRAME_HEADER_SIZE - 1] = byte;
        } else {
            self.window[self.window_len] = byte;
            self.window_len += 1;
        }
    }
}
