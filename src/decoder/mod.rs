//! Turning compressed frames into PCM.
//!
//! The demuxer never decodes audio itself. It hands every complete frame to a [`FrameDecoder`]
//! and forwards whatever comes out to the sink.
//!
//! With the `symphonia-mp3` feature enabled, [`SymphoniaFrameDecoder`] wraps symphonia's
//! MP3 decoder.

use crate::common::Sample;

#[cfg(feature = "symphonia-mp3")]
mod symphonia;

#[cfg(feature = "symphonia-mp3")]
pub use self::symphonia::SymphoniaFrameDecoder;

/// Decodes one MPEG audio frame at a time.
pub trait FrameDecoder {
    /// Decodes the complete frame in `frame` and writes interleaved stereo samples to `output`.
    ///
    /// Returns the number of samples produced per channel: either 0, when the frame yields no
    /// audio (for example while the bit reservoir is still filling), or the frame's samples per
    /// frame. `output` holds at least [`MAX_SAMPLES_PER_FRAME`](crate::constants::MAX_SAMPLES_PER_FRAME)
    /// stereo samples.
    fn decode(&mut self, frame: &[u8], output: &mut [Sample]) -> usize;

    /// Releases the decoder's resources. Called once when the provider closes.
    fn close(&mut self) {}
}

impl<D> FrameDecoder for Box<D>
where
    D: FrameDecoder + ?Sized,
{
    #[inline]
    fn decode(&mut self, frame: &[u8], output: &mut [Sample]) -> usize {
        (**self).decode(frame, output)
    }

    #[inline]
    fn close(&mut self) {
        (**self).close()
    }
}
