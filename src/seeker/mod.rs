//! Mapping timecodes to frames and byte positions.
//!
//! Which strategy applies depends on how the stream was encoded and whether its length is known:
//!
//! - [`XingSeeker`] when the first frame holds a VBR summary,
//! - [`ConstantRateSeeker`] when it does not but the content length is known,
//! - [`StreamSeeker`] when the content length is unknown; such streams cannot seek.

use std::time::Duration;

use crate::byte_source::ByteSource;
use crate::error::SeekError;
use crate::header::FrameHeader;

mod constant_rate;
mod stream;
mod xing;

pub use self::constant_rate::ConstantRateSeeker;
pub use self::stream::StreamSeeker;
pub use self::xing::XingSeeker;

/// The seek strategy chosen for a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mp3Seeker {
    Xing(XingSeeker),
    ConstantRate(ConstantRateSeeker),
    Stream(StreamSeeker),
}

impl Mp3Seeker {
    /// Picks the strategy for a stream whose first frame starts at `first_frame_start`.
    ///
    /// `frame` must hold the whole first frame, starting with `header`.
    pub fn select(
        first_frame_start: u64,
        content_length: Option<u64>,
        header: &FrameHeader,
        frame: &[u8],
    ) -> Self {
        let Some(content_length) = content_length else {
            return Mp3Seeker::Stream(StreamSeeker);
        };

        match XingSeeker::from_frame(first_frame_start, content_length, header, frame) {
            Some(seeker) => Mp3Seeker::Xing(seeker),
            None => Mp3Seeker::ConstantRate(ConstantRateSeeker::from_frame(
                first_frame_start,
                content_length,
                header,
            )),
        }
    }

    /// Repositions `source` at (or just before) the frame playing at `timecode` milliseconds
    /// and returns the index of that frame.
    pub fn seek_and_get_frame_index<S>(&self, timecode: u64, source: &mut S) -> Result<u64, SeekError>
    where
        S: ByteSource + ?Sized,
    {
        match self {
            Mp3Seeker::Xing(seeker) => seeker.seek_and_get_frame_index(timecode, source),
            Mp3Seeker::ConstantRate(seeker) => seeker.seek_and_get_frame_index(timecode, source),
            Mp3Seeker::Stream(seeker) => seeker.seek_and_get_frame_index(timecode, source),
        }
    }

    pub fn is_seekable(&self) -> bool {
        match self {
            Mp3Seeker::Xing(seeker) => seeker.is_seekable(),
            Mp3Seeker::ConstantRate(seeker) => seeker.is_seekable(),
            Mp3Seeker::Stream(seeker) => seeker.is_seekable(),
        }
    }

    /// Total playback time, `None` if unknown.
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Mp3Seeker::Xing(seeker) => seeker.duration(),
            Mp3Seeker::ConstantRate(seeker) => seeker.duration(),
            Mp3Seeker::Stream(seeker) => seeker.duration(),
        }
    }

    /// Short name of the strategy, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Mp3Seeker::Xing(_) => "xing",
            Mp3Seeker::ConstantRate(_) => "constant-rate",
            Mp3Seeker::Stream(_) => "stream",
        }
    }
}
