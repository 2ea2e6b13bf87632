//! MPEG audio frame header decoding.
//!
//! ```text
//! AAAAAAAA AAABBCCD EEEEFFGH IIJJKLMM
//! A sync (all ones)    B version    C layer     D CRC absent
//! E bitrate index      F rate index G padding   H private
//! I channel mode       J mode ext.  K copyright L original
//! M emphasis
//! ```
//!
//! Only Layer III headers are accepted: they are the only ones the frame decoder understands,
//! and rejecting the rest makes false sync matches in arbitrary data less likely.

use crate::common::SampleRate;
use crate::constants::FRAME_HEADER_SIZE;

/// MPEG audio version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegVersion {
    /// MPEG-1
    V1,
    /// MPEG-2 (LSF)
    V2,
    /// MPEG-2.5 (unofficial extension for very low rates)
    V2_5,
}

/// Channel layout of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    Stereo,
    JointStereo,
    DualChannel,
    Mono,
}

impl ChannelMode {
    /// Number of channels encoded in the frame.
    #[inline]
    pub fn channel_count(self) -> u16 {
        match self {
            ChannelMode::Mono => 1,
            _ => 2,
        }
    }
}

/// Layer III bitrates in kbps, indexed by bitrate index (0 and 15 are invalid).
const BITRATES_V1: [u32; 15] = [0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320];
const BITRATES_V2: [u32; 15] = [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160];

const SAMPLE_RATES_V1: [SampleRate; 3] = [44100, 48000, 32000];

/// A decoded Layer III frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: MpegVersion,
    /// Whether a 16 bit CRC follows the header.
    pub protected: bool,
    /// Bitrate in kbps.
    pub bitrate: u32,
    pub sample_rate: SampleRate,
    pub padding: bool,
    pub channel_mode: ChannelMode,
    /// Length of the whole frame in bytes, header included.
    pub frame_size: usize,
    /// Samples per channel the frame decodes to.
    pub samples_per_frame: u32,
}

impl FrameHeader {
    /// Decodes the header at the start of `bytes`. Returns `None` when the bytes are not a
    /// structurally valid Layer III header.
    pub fn parse(bytes: &[u8]) -> Option<FrameHeader> {
        let raw: [u8; FRAME_HEADER_SIZE] = bytes.get(..FRAME_HEADER_SIZE)?.try_into().ok()?;
        let header = u32::from_be_bytes(raw);

        if header >> 21 != 0x7FF {
            return None;
        }

        let version = match (header >> 19) & 0x3 {
            0 => MpegVersion::V2_5,
            2 => MpegVersion::V2,
            3 => MpegVersion::V1,
            _ => return None,
        };

        // Layer bits 01 are Layer III.
        if (header >> 17) & 0x3 != 1 {
            return None;
        }

        let protected = (header >> 16) & 1 == 0;

        let bitrate_index = ((header >> 12) & 0xF) as usize;
        if bitrate_index == 0 || bitrate_index == 15 {
            return None;
        }

        let rate_index = ((header >> 10) & 0x3) as usize;
        if rate_index == 3 {
            return None;
        }

        // Emphasis 10 is reserved.
        if header & 0x3 == 2 {
            return None;
        }

        let (bitrate, sample_rate, samples_per_frame, coefficient) = match version {
            MpegVersion::V1 => (
                BITRATES_V1[bitrate_index],
                SAMPLE_RATES_V1[rate_index],
                1152,
                144,
            ),
            MpegVersion::V2 => (
                BITRATES_V2[bitrate_index],
                SAMPLE_RATES_V1[rate_index] / 2,
                576,
                72,
            ),
            MpegVersion::V2_5 => (
                BITRATES_V2[bitrate_index],
                SAMPLE_RATES_V1[rate_index] / 4,
                576,
                72,
            ),
        };

        let padding = (header >> 9) & 1 == 1;
        let frame_size =
            (coefficient * bitrate * 1000 / sample_rate) as usize + usize::from(padding);

        let channel_mode = match (header >> 6) & 0x3 {
            0 => ChannelMode::Stereo,
            1 => ChannelMode::JointStereo,
            2 => ChannelMode::DualChannel,
            _ => ChannelMode::Mono,
        };

        Some(FrameHeader {
            version,
            protected,
            bitrate,
            sample_rate,
            padding,
            channel_mode,
            frame_size,
            samples_per_frame,
        })
    }

    /// Byte offset of the Xing/Info tag inside the frame: right after the side information.
    pub fn side_info_end(&self) -> usize {
        let side_info = match (self.version, self.channel_mode) {
            (MpegVersion::V1, ChannelMode::Mono) => 17,
            (MpegVersion::V1, _) => 32,
            (_, ChannelMode::Mono) => 9,
            (_, _) => 17,
        };
        FRAME_HEADER_SIZE + side_info
    }

    /// Average frame length in bytes, scaled by the sample rate so it stays exact.
    ///
    /// Encoders pad single frames so the stream keeps to this average: dividing by
    /// `sample_rate` gives the unpadded length with its fraction.
    pub fn scaled_frame_len(&self) -> u64 {
        u64::from(self.samples_per_frame / 8) * u64::from(self.bitrate) * 1000
    }
}
