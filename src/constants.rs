//! Constants shared by the frame reader, the seekers and the track provider.

use crate::common::ChannelCount;

/// Length of an MPEG audio frame header in bytes.
pub const FRAME_HEADER_SIZE: usize = 4;

/// Largest legal Layer III frame: 320 kbps at 32 kHz (MPEG-1) with padding.
/// MPEG-2 at 160 kbps and 8 kHz gives the same bound.
pub const MAX_FRAME_SIZE: usize = 1441;

/// Samples per channel in one MPEG-1 Layer III frame.
pub const MAX_SAMPLES_PER_FRAME: usize = 1152;

/// The provider always emits interleaved stereo.
pub const OUTPUT_CHANNELS: ChannelCount = 2;

/// How many bytes past the tags are searched for the first frame by default.
pub const DEFAULT_SCAN_LIMIT: usize = 2048;
