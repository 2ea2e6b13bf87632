//! Integer timecode arithmetic shared by the seekers and the track provider.
//!
//! Timecodes are whole milliseconds. A frame `i` starts at
//! `i * samples_per_frame * 1000 / sample_rate` milliseconds, truncated.

use std::time::Duration;

use crate::common::SampleRate;

/// Timecode (in milliseconds) at which frame `frame_index` starts.
#[inline]
pub fn timecode_of_frame(frame_index: u64, samples_per_frame: u32, sample_rate: SampleRate) -> u64 {
    if sample_rate == 0 {
        return 0;
    }

    let millis =
        frame_index as u128 * samples_per_frame as u128 * 1000 / sample_rate as u128;
    millis.min(u64::MAX as u128) as u64
}

/// Index of the frame playing at `timecode` milliseconds.
///
/// This is the largest index whose [`timecode_of_frame`] does not exceed `timecode`, so that
/// seeking to a timecode reported for a frame lands on that same frame again despite the
/// truncation in [`timecode_of_frame`].
#[inline]
pub fn frame_index_at(timecode: u64, samples_per_frame: u32, sample_rate: SampleRate) -> u64 {
    let millis_per_frame_scaled = samples_per_frame as u128 * 1000;
    if millis_per_frame_scaled == 0 {
        return 0;
    }

    let scaled = (timecode as u128 + 1) * sample_rate as u128;
    let index = scaled.saturating_sub(1) / millis_per_frame_scaled;
    index.min(u64::MAX as u128) as u64
}

/// Whole milliseconds of a duration, saturating.
#[inline]
pub(crate) fn duration_to_millis(duration: Duration) -> u64 {
    duration.as_millis().min(u64::MAX as u128) as u64
}
