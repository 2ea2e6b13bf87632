use std::io;
use std::sync::Arc;

/// Errors that end a demuxing session.
#[derive(Debug, thiserror::Error, Clone)]
pub enum DemuxError {
    /// The byte source failed while reading or seeking.
    #[error("I/O error on the byte source")]
    Io(#[source] Arc<io::Error>),

    /// No MPEG audio frame header was found within the scan budget.
    #[error("no MPEG audio frame found within {scanned} bytes")]
    NoFrameFound {
        /// Number of candidate positions examined.
        scanned: usize,
    },

    /// An operation that needs the stream layout was called before `parse_headers`.
    #[error("stream headers have not been parsed yet")]
    HeadersNotParsed,

    /// Seeking failed.
    #[error("seek failed")]
    Seek(#[from] SeekError),
}

impl From<io::Error> for DemuxError {
    fn from(err: io::Error) -> Self {
        DemuxError::Io(Arc::new(err))
    }
}

/// Errors returned when repositioning the stream by timecode.
#[derive(Debug, thiserror::Error, Clone)]
pub enum SeekError {
    /// The stream has no known length, so no position can be computed.
    #[error("stream is not seekable")]
    NotSupported,

    /// The byte source failed to seek.
    #[error("byte source failed to seek")]
    Io(#[source] Arc<io::Error>),
}

impl From<io::Error> for SeekError {
    fn from(err: io::Error) -> Self {
        SeekError::Io(Arc::new(err))
    }
}

/// Errors returned by [`Mp3TrackProviderBuilder::build`](crate::Mp3TrackProviderBuilder::build).
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    /// No byte source was set.
    #[error("no byte source was given to the builder")]
    MissingSource,

    /// No frame decoder was set.
    #[error("no frame decoder was given to the builder")]
    MissingDecoder,
}
