use std::time::Duration;

use crate::byte_source::ByteSource;
use crate::common::SampleRate;
use crate::error::SeekError;
use crate::header::FrameHeader;
use crate::math::{frame_index_at, timecode_of_frame};

const XING_TAG: &[u8; 4] = b"Xing";
const INFO_TAG: &[u8; 4] = b"Info";

const FLAG_FRAMES: u32 = 0x1;
const FLAG_BYTES: u32 = 0x2;
const FLAG_TOC: u32 = 0x4;
const REQUIRED_FLAGS: u32 = FLAG_FRAMES | FLAG_BYTES | FLAG_TOC;

const TOC_SIZE: usize = 100;

/// Seeker driven by the Xing (or LAME `Info`) summary stored in the first frame of many
/// variable bitrate encodes.
///
/// The summary holds the number of audio frames, the number of audio bytes and a 100 entry table
/// mapping each percent of playback time to a position in the audio data, in 1/256 units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XingSeeker {
    data_start: u64,
    data_size: u64,
    frame_count: u64,
    toc: [u8; TOC_SIZE],
    sample_rate: SampleRate,
    samples_per_frame: u32,
}

impl XingSeeker {
    /// Reads the summary from the first frame. Returns `None` when the frame carries no summary
    /// or the summary lacks the frame count, byte count or table of contents.
    pub fn from_frame(
        first_frame_start: u64,
        content_length: u64,
        header: &FrameHeader,
        frame: &[u8],
    ) -> Option<Self> {
        let offset = header.side_info_end();

        let tag = frame.get(offset..offset + 4)?;
        if tag != XING_TAG && tag != INFO_TAG {
            return None;
        }

        let flags = read_u32(frame, offset + 4)?;
        if flags & REQUIRED_FLAGS != REQUIRED_FLAGS {
            return None;
        }

        let frame_count = u64::from(read_u32(frame, offset + 8)?);
        let byte_count = u64::from(read_u32(frame, offset + 12)?);
        let toc: [u8; TOC_SIZE] = frame
            .get(offset + 16..offset + 16 + TOC_SIZE)?
            .try_into()
            .ok()?;

        if frame_count == 0 {
            return None;
        }

        // The summary frame itself holds no audio.
        let data_start = first_frame_start + header.frame_size as u64;
        let data_size = byte_count.min(content_length.saturating_sub(data_start));

        Some(XingSeeker {
            data_start,
            data_size,
            frame_count,
            toc,
            sample_rate: header.sample_rate,
            samples_per_frame: header.samples_per_frame,
        })
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
        Some(Duration::from_millis(self.duration_millis()))
    }

    /// Moves `source` close to the start of the frame playing at `timecode` and returns that
    /// frame's index. The table is coarse, so the position is approximate; the frame reader
    /// resynchronizes on the next header.
    pub fn seek_and_get_frame_index<S>(&self, timecode: u64, source: &mut S) -> Result<u64, SeekError>
    where
        S: ByteSource + ?Sized,
    {
        let frame_index = frame_index_at(timecode, self.samples_per_frame, self.sample_rate)
            .min(self.frame_count - 1);
        let frame_timecode = timecode_of_frame(frame_index, self.samples_per_frame, self.sample_rate);

        source.seek(self.position_at(frame_timecode))?;
        Ok(frame_index)
    }

    fn duration_millis(&self) -> u64 {
        timecode_of_frame(self.frame_count, self.samples_per_frame, self.sample_rate)
    }

    /// Interpolates the byte position of `timecode` inside the table bracket containing it.
    fn position_at(&self, timecode: u64) -> u64 {
        let duration = self.duration_millis();
        if duration == 0 {
            return self.data_start;
        }

        let percent = (timecode as f64 * 100.0 / duration as f64).clamp(0.0, 100.0);
        let index = (percent as usize).min(TOC_SIZE - 1);

        let lower = f64::from(self.toc[index]);
        let upper = match self.toc.get(index + 1) {
            Some(&next) => f64::from(next),
            None => 256.0,
        };
        let scaled = lower + (upper - lower) * (percent - index as f64);

        let offset = (scaled * self.data_size as f64 / 256.0) as u64;
        self.data_start + offset.min(self.data_size)
    }
}

#[inline]
fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let raw: [u8; 4] = bytes.get(offset..offset + 4)?.try_into().ok()?;
    Some(u32::from_be_bytes(raw))
}
