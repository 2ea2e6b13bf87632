use std::time::Duration;

use crate::byte_source::ByteSource;
use crate::common::SampleRate;
use crate::error::SeekError;
use crate::header::FrameHeader;
use crate::math::{frame_index_at, timecode_of_frame};

/// Seeker for constant bitrate streams of known length.
///
/// Padded and unpadded frames alternate so the stream keeps to the bitrate, so positions use
/// the average frame length `scaled_frame_len / sample_rate` rather than the first frame's
/// size: frame `i` starts at `first_frame_start + i * scaled_frame_len / sample_rate`, rounded
/// down. That lands on the frame or at most a byte before it, where the sync scan picks it up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantRateSeeker {
    first_frame_start: u64,
    scaled_frame_len: u64,
    frame_count: u64,
    sample_rate: SampleRate,
    samples_per_frame: u32,
}

impl ConstantRateSeeker {
    pub fn from_frame(first_frame_start: u64, content_length: u64, header: &FrameHeader) -> Self {
        let scaled_frame_len = header.scaled_frame_len().max(1);
        // `n` frames take between `floor` and `ceil` of `n` average lengths, hence the extra byte.
        let audio_len = content_length.saturating_sub(first_frame_start);
        let frame_count = (u128::from(audio_len) + 1) * u128::from(header.sample_rate)
            / u128::from(scaled_frame_len);
        let frame_count = u64::try_from(frame_count).unwrap_or(u64::MAX);

        ConstantRateSeeker {
            first_frame_start,
            scaled_frame_len,
            frame_count,
            sample_rate: header.sample_rate,
            samples_per_frame: header.samples_per_frame,
        }
    }

    /// Byte position of frame `frame_index`.
    fn frame_position(&self, frame_index: u64) -> u64 {
        let offset = u128::from(frame_index) * u128::from(self.scaled_frame_len)
            / u128::from(self.sample_rate.max(1));
        self.first_frame_start
            .saturating_add(u64::try_from(offset).unwrap_or(u64::MAX))
    }

    #[inline]
    pub fn is_seekable(&self) -> bool {
        true
    }

    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn duration(&self) -> Option<Duration> {
        let millis = timecode_of_frame(self.frame_count, self.samples_per_frame, self.sample_rate);
        Some(Duration::from_millis(millis))
    }

    /// Moves `source` to the start of the frame playing at `timecode` (in milliseconds),
    /// clamped to the last whole frame, and returns that frame's index.
    pub fn seek_and_get_frame_index<S>(&self, timecode: u64, source: &mut S) -> Result<u64, SeekError>
    where
        S: ByteSource + ?Sized,
    {
        let frame_index = frame_index_at(timecode, self.samples_per_frame, self.sample_rate)
            .min(self.frame_count.saturating_sub(1));

        source.seek(self.frame_position(frame_index))?;
        Ok(frame_index)
    }
}
