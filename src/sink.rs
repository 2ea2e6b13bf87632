//! Where decoded PCM goes.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::common::{ChannelCount, Sample, SampleRate};

/// Receives the decoded audio of a track.
///
/// A sink is created once per session through the factory given to the builder, after the
/// first frame told the provider the stream's sample rate. Output is always interleaved stereo.
pub trait PcmSink {
    /// Consumes one block of interleaved stereo samples. The slice is only valid for the
    /// duration of the call.
    fn process(&mut self, samples: &[Sample]);

    /// Called after a seek, before any audio from the new position is processed.
    ///
    /// `actual` is where playback really resumes, aligned to a frame boundary.
    fn seek_performed(&mut self, requested: Duration, actual: Duration);

    /// Called once when the session ends.
    fn close(&mut self) {}
}

impl<T> PcmSink for Box<T>
where
    T: PcmSink + ?Sized,
{
    #[inline]
    fn process(&mut self, samples: &[Sample]) {
        (**self).process(samples)
    }

    #[inline]
    fn seek_performed(&mut self, requested: Duration, actual: Duration) {
        (**self).seek_performed(requested, actual)
    }

    #[inline]
    fn close(&mut self) {
        (**self).close()
    }
}

/// Creates the sink for a session from its channel count and sample rate.
pub type SinkFactory = Box<dyn FnOnce(ChannelCount, SampleRate) -> Box<dyn PcmSink + Send> + Send>;

/// A sink that keeps everything it is given.
///
/// Clones share the same storage, so one clone can be handed to the provider while another is
/// used to inspect what arrived.
///
/// ```
/// use mp3_demux::sink::{PcmSink, SamplesSink};
///
/// let sink = SamplesSink::new();
/// let mut handle = sink.clone();
/// handle.process(&[1, -1, 2, -2]);
/// assert_eq!(sink.samples(), vec![1, -1, 2, -2]);
/// assert_eq!(sink.block_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SamplesSink {
    recorded: Arc<Mutex<Recorded>>,
}

#[derive(Debug, Default)]
struct Recorded {
    format: Option<(ChannelCount, SampleRate)>,
    samples: Vec<Sample>,
    blocks: usize,
    seeks: Vec<(Duration, Duration)>,
    closed: bool,
}

impl SamplesSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a sink factory handing out clones of this sink, recording the format it was
    /// created with.
    pub fn factory(&self) -> SinkFactory {
        let sink = self.clone();
        Box::new(move |channels, sample_rate| {
            sink.lock().format = Some((channels, sample_rate));
            Box::new(sink)
        })
    }

    /// Channel count and sample rate the factory was called with, if it was.
    pub fn format(&self) -> Option<(ChannelCount, SampleRate)> {
        self.lock().format
    }

    /// All samples processed so far, concatenated.
    pub fn samples(&self) -> Vec<Sample> {
        self.lock().samples.clone()
    }

    /// Number of `process` calls so far.
    pub fn block_count(&self) -> usize {
        self.lock().blocks
    }

    /// `(requested, actual)` pairs of every seek performed.
    pub fn seeks(&self) -> Vec<(Duration, Duration)> {
        self.lock().seeks.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PcmSink for SamplesSink {
    fn process(&mut self, samples: &[Sample]) {
        let mut recorded = self.lock();
        recorded.samples.extend_from_slice(samples);
        recorded.blocks += 1;
    }

    fn seek_performed(&mut self, requested: Duration, actual: Duration) {
        self.lock().seeks.push((requested, actual));
    }

    fn close(&mut self) {
        self.lock().closed = true;
    }
}
