//! Random access byte sources the demuxer reads from.

use std::io::{self, Read, Seek, SeekFrom};

/// A blocking, random access byte source.
///
/// The stream position is an explicit part of the source: every component that reads or
/// repositions the stream goes through the same `ByteSource` handle.
pub trait ByteSource {
    /// Fills `buf` completely or fails with [`io::ErrorKind::UnexpectedEof`].
    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()>;

    /// Current absolute position in bytes.
    fn position(&self) -> u64;

    /// Moves to an absolute position in bytes.
    fn seek(&mut self, position: u64) -> io::Result<()>;

    /// Total length of the content, or `None` for live or streamed sources.
    fn content_length(&self) -> Option<u64>;

    /// Reads a single byte, returning `None` at the end of the stream.
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.read_exact(&mut byte) {
            Ok(()) => Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Skips `count` bytes forward from the current position.
    fn skip(&mut self, count: u64) -> io::Result<()> {
        let target = self.position().saturating_add(count);
        self.seek(target)
    }
}

impl<B: ByteSource + ?Sized> ByteSource for &mut B {
    #[inline]
    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        (**self).read_exact(buf)
    }

    #[inline]
    fn position(&self) -> u64 {
        (**self).position()
    }

    #[inline]
    fn seek(&mut self, position: u64) -> io::Result<()> {
        (**self).seek(position)
    }

    #[inline]
    fn content_length(&self) -> Option<u64> {
        (**self).content_length()
    }
}

/// Wraps any `Read + Seek` as a [`ByteSource`].
///
/// Pass `None` as the byte length for sources whose size is not known (for example an HTTP
/// stream without a content length); the demuxer then treats the stream as unseekable.
pub struct ReadSeekSource<T: Read + Seek> {
    inner: T,
    byte_len: Option<u64>,
    position: u64,
}

impl<T: Read + Seek> ReadSeekSource<T> {
    /// Instantiates a new `ReadSeekSource<T>` by taking ownership and wrapping the provided
    /// `Read + Seek`er. The current position of `inner` becomes the starting position.
    pub fn new(mut inner: T, byte_len: Option<u64>) -> io::Result<Self> {
        let position = inner.stream_position()?;
        Ok(ReadSeekSource {
            inner,
            byte_len,
            position,
        })
    }

    /// Consumes the source, returning the wrapped reader.
    #[inline]
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read + Seek> ByteSource for ReadSeekSource<T> {
    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => {
                    self.position += filled as u64;
                    return Err(io::Error::from(io::ErrorKind::UnexpectedEof));
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.position += filled as u64;
                    return Err(e);
                }
            }
        }
        self.position += filled as u64;
        Ok(())
    }

    #[inline]
    fn position(&self) -> u64 {
        self.position
    }

    fn seek(&mut self, position: u64) -> io::Result<()> {
        self.position = self.inner.seek(SeekFrom::Start(position))?;
        Ok(())
    }

    #[inline]
    fn content_length(&self) -> Option<u64> {
        self.byte_len
    }
}
