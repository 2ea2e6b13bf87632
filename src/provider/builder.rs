//! Builder pattern for configuring and constructing track providers.
//!
//! # Examples
//!
//! ```no_run
//! use std::fs::File;
//! use mp3_demux::byte_source::ReadSeekSource;
//! use mp3_demux::decoder::SymphoniaFrameDecoder;
//! use mp3_demux::sink::SamplesSink;
//! use mp3_demux::Mp3TrackProvider;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let file = File::open("track.mp3")?;
//!     let len = file.metadata()?.len();
//!     let sink = SamplesSink::new();
//!
//!     let mut provider = Mp3TrackProvider::builder()
//!         .with_source(ReadSeekSource::new(file, Some(len))?)
//!         .with_decoder(SymphoniaFrameDecoder::new()?)
//!         .with_sink_factory(sink.factory())
//!         .build()?;
//!
//!     provider.parse_headers()?;
//!     Ok(())
//! }
//! ```
//!
//! # Settings
//!
//! - `scan_limit` - How many byte positions to examine for the first frame header

use crate::byte_source::ByteSource;
use crate::constants::DEFAULT_SCAN_LIMIT;
use crate::decoder::FrameDecoder;
use crate::error::BuildError;
use crate::sink::{PcmSink, SinkFactory};

use super::Mp3TrackProvider;
use crate::common::{ChannelCount, SampleRate};

/// Track provider configuration.
#[derive(Clone, Debug)]
pub struct Settings {
    /// How many candidate positions are examined when looking for the first frame after the
    /// ID3 tag. Streams with more leading garbage are rejected.
    pub(crate) scan_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scan_limit: DEFAULT_SCAN_LIMIT,
        }
    }
}

/// Builder for configuring and creating a [`Mp3TrackProvider`].
pub struct Mp3TrackProviderBuilder<S, D> {
    source: Option<S>,
    decoder: Option<D>,
    sink_factory: Option<SinkFactory>,
    settings: Settings,
}

impl<S, D> Default for Mp3TrackProviderBuilder<S, D> {
    fn default() -> Self {
        Self {
            source: None,
            decoder: None,
            sink_factory: None,
            settings: Settings::default(),
        }
    }
}

impl<S: ByteSource, D: FrameDecoder> Mp3TrackProviderBuilder<S, D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the byte source to demux. Its content length decides whether the track can seek.
    pub fn with_source(mut self, source: S) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets the decoder every frame is handed to.
    pub fn with_decoder(mut self, decoder: D) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Sets the function creating the sink once the stream's sample rate is known.
    ///
    /// Without a sink, frames are still read and decoded but the output is dropped.
    pub fn with_sink_factory<F>(mut self, factory: F) -> Self
    where
        F: FnOnce(ChannelCount, SampleRate) -> Box<dyn PcmSink + Send> + Send + 'static,
    {
        self.sink_factory = Some(Box::new(factory));
        self
    }

    /// Sets how many byte positions are examined for the first frame header.
    /// Defaults to 2048.
    pub fn with_scan_limit(mut self, scan_limit: usize) -> Self {
        self.settings.scan_limit = scan_limit;
        self
    }

    /// Creates the provider. Nothing is read from the source until
    /// [`parse_headers`](Mp3TrackProvider::parse_headers).
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MissingSource`] or [`BuildError::MissingDecoder`] when either was
    /// not set.
    pub fn build(self) -> Result<Mp3TrackProvider<S, D>, BuildError> {
        let source = self.source.ok_or(BuildError::MissingSource)?;
        let decoder = self.decoder.ok_or(BuildError::MissingDecoder)?;
        Ok(Mp3TrackProvider::new(
            source,
            decoder,
            self.sink_factory,
            self.settings,
        ))
    }
}
