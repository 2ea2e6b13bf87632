//! The track provider ties the pieces together: it skips the tag, locks on to the first frame,
//! picks a seeker and then feeds frames to the decoder and decoded audio to the sink until the
//! stream ends or the caller stops it.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::byte_source::ByteSource;
use crate::common::{ChannelCount, Sample, SampleRate};
use crate::constants::{MAX_SAMPLES_PER_FRAME, OUTPUT_CHANNELS};
use crate::decoder::FrameDecoder;
use crate::error::DemuxError;
use crate::frame_reader::FrameReader;
use crate::id3::{self, TagTable};
use crate::math::{duration_to_millis, timecode_of_frame};
use crate::seeker::Mp3Seeker;
use crate::sink::{PcmSink, SinkFactory};

mod builder;

pub use self::builder::{Mp3TrackProviderBuilder, Settings};

/// Lets another thread end a running [`Mp3TrackProvider::provide_frames`] loop.
///
/// The loop checks the flag once per frame, so it returns at most one frame after
/// [`stop`](Self::stop) was called.
#[derive(Clone, Debug, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the loop to stop. Stays set; use a fresh handle for the next run.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }
}

/// Why [`Mp3TrackProvider::provide_frames`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProvideOutcome {
    /// No complete frame is left in the stream.
    EndOfStream,
    /// The [`StopHandle`] was triggered.
    Stopped,
}

/// Stream layout, known once the first frame was found.
struct StreamInfo {
    sample_rate: SampleRate,
    samples_per_frame: u32,
    seeker: Mp3Seeker,
}

/// Demuxes an MP3 stream, driving a [`FrameDecoder`] and delivering its output to a
/// [`PcmSink`].
///
/// A session goes through [`parse_headers`](Self::parse_headers) once, then any mix of
/// [`provide_frames`](Self::provide_frames) and [`seek_to_timecode`](Self::seek_to_timecode),
/// then [`close`](Self::close) (or drop).
pub struct Mp3TrackProvider<S, D>
where
    S: ByteSource,
    D: FrameDecoder,
{
    source: S,
    decoder: D,
    sink_factory: Option<SinkFactory>,
    sink: Option<Box<dyn PcmSink + Send>>,
    frame_reader: FrameReader,
    // Interleaved stereo output of the last decoded frame.
    output: Box<[Sample]>,
    tags: TagTable,
    stream: Option<StreamInfo>,
    // Set when `parse_headers` failed, which leaves the stream somewhere past the tag.
    header_error: Option<DemuxError>,
    frame_index: u64,
    settings: Settings,
    closed: bool,
}

impl<S, D> Mp3TrackProvider<S, D>
where
    S: ByteSource,
    D: FrameDecoder,
{
    /// Starts configuring a provider.
    pub fn builder() -> Mp3TrackProviderBuilder<S, D> {
        Mp3TrackProviderBuilder::new()
    }

    pub(crate) fn new(
        source: S,
        decoder: D,
        sink_factory: Option<SinkFactory>,
        settings: Settings,
    ) -> Self {
        Mp3TrackProvider {
            source,
            decoder,
            sink_factory,
            sink: None,
            frame_reader: FrameReader::new(),
            output: vec![0; MAX_SAMPLES_PER_FRAME * OUTPUT_CHANNELS as usize].into_boxed_slice(),
            tags: TagTable::default(),
            stream: None,
            header_error: None,
            frame_index: 0,
            settings,
            closed: false,
        }
    }

    /// Reads the ID3 tag and the first frame, creates the sink and picks the seeker.
    ///
    /// Calling it again after it succeeded does nothing. A failure is final: later calls return
    /// the same error, and neither tags nor a sink are set up.
    ///
    /// # Errors
    ///
    /// [`DemuxError::NoFrameFound`] when no frame header shows up within the scan limit after
    /// the tag, [`DemuxError::Io`] when the source fails.
    pub fn parse_headers(&mut self) -> Result<(), DemuxError> {
        if self.stream.is_some() {
            return Ok(());
        }
        if let Some(err) = &self.header_error {
            return Err(err.clone());
        }

        let (tags, stream) = match self.read_headers() {
            Ok(parsed) => parsed,
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(error = %err, "could not parse stream headers");
                self.header_error = Some(err.clone());
                return Err(err);
            }
        };

        self.sink = self
            .sink_factory
            .take()
            .map(|factory| factory(OUTPUT_CHANNELS, stream.sample_rate));
        self.tags = tags;
        self.stream = Some(stream);
        Ok(())
    }

    fn read_headers(&mut self) -> Result<(TagTable, StreamInfo), DemuxError> {
        let tags = match id3::skip_tags(&mut self.source, &mut self.frame_reader) {
            Ok(tags) => tags,
            // Too short to even hold a tag marker, let alone a frame.
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(DemuxError::NoFrameFound { scanned: 0 })
            }
            Err(e) => return Err(e.into()),
        };

        self.frame_reader
            .scan_for_frame(&mut self.source, self.settings.scan_limit, true)?;
        let Some(header) = self.frame_reader.header().copied() else {
            return Err(DemuxError::NoFrameFound {
                scanned: self.settings.scan_limit,
            });
        };
        let first_frame_start = self.frame_reader.frame_start_position();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            position = first_frame_start,
            sample_rate = header.sample_rate,
            bitrate = header.bitrate,
            frame_size = header.frame_size,
            "located first frame"
        );

        // A truncated first frame leaves a partial buffer, which simply carries no summary.
        self.frame_reader.fill_frame_buffer(&mut self.source)?;
        let seeker = Mp3Seeker::select(
            first_frame_start,
            self.source.content_length(),
            &header,
            self.frame_reader.frame(),
        );
        // The summary frame holds no audio and the seeker counts frames after it.
        if matches!(seeker, Mp3Seeker::Xing(_)) {
            self.frame_reader.next_frame();
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(seeker = seeker.name(), duration = ?seeker.duration(), "selected seeker");

        let stream = StreamInfo {
            sample_rate: header.sample_rate,
            samples_per_frame: header.samples_per_frame,
            seeker,
        };
        Ok((tags, stream))
    }

    /// Decodes frames and hands their audio to the sink until the stream ends or `stop` is
    /// triggered. Can be called again after a seek or a stop to continue.
    ///
    /// # Errors
    ///
    /// [`DemuxError::HeadersNotParsed`] before [`parse_headers`](Self::parse_headers),
    /// [`DemuxError::Io`] when the source fails.
    pub fn provide_frames(&mut self, stop: &StopHandle) -> Result<ProvideOutcome, DemuxError> {
        if self.stream.is_none() {
            return Err(DemuxError::HeadersNotParsed);
        }
        if self.closed {
            return Ok(ProvideOutcome::EndOfStream);
        }

        loop {
            if stop.is_stopped() {
                #[cfg(feature = "tracing")]
                tracing::debug!(frame_index = self.frame_index, "frame loop stopped");
                return Ok(ProvideOutcome::Stopped);
            }

            if !self.frame_reader.fill_frame_buffer(&mut self.source)? {
                #[cfg(feature = "tracing")]
                tracing::debug!(frame_index = self.frame_index, "end of stream");
                return Ok(ProvideOutcome::EndOfStream);
            }

            let produced = self
                .decoder
                .decode(self.frame_reader.frame(), &mut self.output);
            if produced > 0 {
                let len = (produced * OUTPUT_CHANNELS as usize).min(self.output.len());
                if let Some(sink) = self.sink.as_mut() {
                    sink.process(&self.output[..len]);
                }
            }

            self.frame_reader.next_frame();
            self.frame_index += 1;
        }
    }

    /// Moves playback to the frame playing at `timecode` and returns the frame aligned timecode
    /// actually reached. The sink is told about both before any audio from the new position.
    ///
    /// Timecodes past the end land on the last frame.
    ///
    /// # Errors
    ///
    /// [`DemuxError::Seek`] wrapping [`SeekError::NotSupported`](crate::SeekError::NotSupported)
    /// when the stream length is unknown.
    pub fn seek_to_timecode(&mut self, timecode: Duration) -> Result<Duration, DemuxError> {
        let stream = self.stream.as_ref().ok_or(DemuxError::HeadersNotParsed)?;

        let frame_index = stream
            .seeker
            .seek_and_get_frame_index(duration_to_millis(timecode), &mut self.source)?;
        let actual = Duration::from_millis(timecode_of_frame(
            frame_index,
            stream.samples_per_frame,
            stream.sample_rate,
        ));

        #[cfg(feature = "tracing")]
        tracing::trace!(requested = ?timecode, ?actual, frame_index, "seek performed");

        self.frame_index = frame_index;
        if let Some(sink) = self.sink.as_mut() {
            sink.seek_performed(timecode, actual);
        }
        self.frame_reader.next_frame();

        Ok(actual)
    }

    /// Whether [`seek_to_timecode`](Self::seek_to_timecode) can succeed. False before the
    /// headers are parsed.
    pub fn is_seekable(&self) -> bool {
        self.stream
            .as_ref()
            .is_some_and(|stream| stream.seeker.is_seekable())
    }

    /// Total playback time, if the stream length is known.
    pub fn duration(&self) -> Option<Duration> {
        self.stream.as_ref()?.seeker.duration()
    }

    /// Text of the ID3 frame `id` (for example [`TITLE`](crate::id3::TITLE)), if the tag had it.
    pub fn tag(&self, id: &str) -> Option<&str> {
        self.tags.get(id)
    }

    pub fn tags(&self) -> &TagTable {
        &self.tags
    }

    /// The stream's sample rate, once the headers are parsed.
    pub fn sample_rate(&self) -> Option<SampleRate> {
        self.stream.as_ref().map(|stream| stream.sample_rate)
    }

    /// Output channel count. Always stereo.
    #[inline]
    pub fn channels(&self) -> ChannelCount {
        OUTPUT_CHANNELS
    }

    /// Index of the next frame to be decoded.
    #[inline]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn seeker(&self) -> Option<&Mp3Seeker> {
        self.stream.as_ref().map(|stream| &stream.seeker)
    }

    /// Closes the sink and the decoder. Only the first call has an effect.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Some(sink) = self.sink.as_mut() {
            sink.close();
        }
        self.decoder.close();
    }
}

impl<S, D> Drop for Mp3TrackProvider<S, D>
where
    S: ByteSource,
    D: FrameDecoder,
{
    fn drop(&mut self) {
        self.close();
    }
}
