/// Stream sample rate (samples per second per channel).
pub type SampleRate = u32;

/// Number of channels in a stream.
pub type ChannelCount = u16;

/// Decoded PCM sample. Samples are always interleaved, 16 bits signed.
pub type Sample = i16;
