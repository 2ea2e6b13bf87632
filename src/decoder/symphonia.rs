use symphonia::core::{
    audio::{AudioBufferRef, SampleBuffer, SignalSpec},
    codecs::{CodecParameters, Decoder, DecoderOptions, CODEC_TYPE_MP3},
    errors::Error,
    formats::Packet,
    units,
};

use super::FrameDecoder;
use crate::common::Sample;
use crate::constants::OUTPUT_CHANNELS;

/// [`FrameDecoder`] backed by symphonia's MP3 decoder.
///
/// Mono streams are duplicated onto both output channels.
pub struct SymphoniaFrameDecoder {
    decoder: Box<dyn Decoder>,
    buffer: Option<SampleBuffer<Sample>>,
    spec: Option<SignalSpec>,
    // Running timestamp in samples, only used to label packets.
    timestamp: u64,
}

impl SymphoniaFrameDecoder {
    /// Creates a decoder for MPEG audio Layer III.
    pub fn new() -> Result<Self, Error> {
        let mut params = CodecParameters::new();
        params.for_codec(CODEC_TYPE_MP3);
        let decoder = symphonia::default::get_codecs().make(&params, &DecoderOptions::default())?;

        Ok(SymphoniaFrameDecoder {
            decoder,
            buffer: None,
            spec: None,
            timestamp: 0,
        })
    }
}

/// Copies `decoded` into `buffer`, reallocating only when the layout changed or the buffer is too
/// small.
fn copy_to_buffer<'a>(
    buffer: &'a mut Option<SampleBuffer<Sample>>,
    spec: &mut Option<SignalSpec>,
    decoded: AudioBufferRef<'_>,
) -> &'a [Sample] {
    let decoded_spec = *decoded.spec();
    let capacity = decoded.capacity();

    let reusable = match buffer.as_ref() {
        Some(buffer) if *spec == Some(decoded_spec) => {
            buffer.capacity() >= capacity * decoded_spec.channels.count()
        }
        _ => false,
    };
    if !reusable {
        *spec = Some(decoded_spec);
        *buffer = None;
    }

    let buffer = buffer.get_or_insert_with(|| {
        SampleBuffer::new(units::Duration::from(capacity as u64), decoded_spec)
    });
    buffer.copy_interleaved_ref(decoded);
    buffer.samples()
}

/// Writes up to `frames` interleaved stereo frames taken from `samples` (interleaved with
/// `channels` channels) into `output` and returns how many were written. Mono is duplicated and
/// channels past the second are dropped.
fn to_stereo(samples: &[Sample], channels: usize, frames: usize, output: &mut [Sample]) -> usize {
    let mut written = 0;
    for (out, input) in output
        .chunks_exact_mut(OUTPUT_CHANNELS as usize)
        .zip(samples.chunks_exact(channels))
        .take(frames)
    {
        out[0] = input[0];
        out[1] = input[if channels > 1 { 1 } else { 0 }];
        written += 1;
    }
    written
}

impl FrameDecoder for SymphoniaFrameDecoder {
    fn decode(&mut self, frame: &[u8], output: &mut [Sample]) -> usize {
        let packet = Packet::new_from_slice(0, self.timestamp, 0, frame);

        let decoded = match self.decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(Error::ResetRequired) => {
                self.decoder.reset();
                return 0;
            }
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(error = %_err, "frame produced no audio");
                return 0;
            }
        };

        let frames = decoded.frames();
        if frames == 0 {
            return 0;
        }
        self.timestamp += frames as u64;

        let channels = decoded.spec().channels.count().max(1);
        let samples = copy_to_buffer(&mut self.buffer, &mut self.spec, decoded);

        to_stereo(samples, channels, frames, output)
    }

    fn close(&mut self) {
        self.decoder.reset();
        self.buffer = None;
        self.spec = None;
    }
}
