#![allow(dead_code)]
/// in separate folder so its not ran as integration test
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mp3_demux::byte_source::ReadSeekSource;
use mp3_demux::header::FrameHeader;
use mp3_demux::sink::SamplesSink;
use mp3_demux::{FrameDecoder, Mp3TrackProvider, Sample};

/// MPEG-1 Layer III, 128 kbps, 44.1 kHz, stereo: 417 byte frames of 1152 samples (26.12ms).
pub const HEADER_44100: [u8; 4] = [0xFF, 0xFB, 0x90, 0x00];
pub const FRAME_SIZE_44100: usize = 417;
/// [`HEADER_44100`] with the padding bit set: 418 byte frames.
pub const HEADER_44100_PADDED: [u8; 4] = [0xFF, 0xFB, 0x92, 0x00];

/// MPEG-1 Layer III, 128 kbps, 48 kHz, stereo: 384 byte frames of 1152 samples (24ms).
pub const HEADER_48000: [u8; 4] = [0xFF, 0xFB, 0x94, 0x00];
pub const FRAME_SIZE_48000: usize = 384;

pub type TestSource = ReadSeekSource<Cursor<Vec<u8>>>;
pub type TestProvider = Mp3TrackProvider<TestSource, CountingDecoder>;

/// Synthetic MP3 byte stream builder.
#[derive(Debug, Clone, Default)]
pub struct StreamBuilder {
    data: Vec<u8>,
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an ID3v2.4 tag holding UTF-8 text frames.
    pub fn with_id3v24(mut self, frames: &[(&str, &str)]) -> Self {
        let mut body = Vec::new();
        for (id, text) in frames {
            body.extend(text_frame_v24(id, 3, text.as_bytes()));
        }
        self.data.extend(id3_tag(4, 0, &body));
        self
    }

    /// Appends raw bytes, such as a hand built tag.
    pub fn with_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.data.extend(bytes);
        self
    }

    pub fn with_garbage(mut self, len: usize) -> Self {
        // 0x12 never starts a sync word.
        self.data.resize(self.data.len() + len, 0x12);
        self
    }

    /// Appends `count` frames with the given header, zero filled after it.
    pub fn with_frames(mut self, header: [u8; 4], frame_size: usize, count: usize) -> Self {
        for _ in 0..count {
            self.data.extend_from_slice(&header);
            self.data.resize(self.data.len() + frame_size - header.len(), 0);
        }
        self
    }

    /// Appends `count` 44.1 kHz frames padded the way an encoder keeps to 128 kbps: frame `i`
    /// ends at `ceil((i + 1) * 417.96)`. Each frame carries its index, see [`FrameNumberDecoder`].
    pub fn with_numbered_frames_44100(mut self, count: u32) -> Self {
        let end_of = |index: u64| (index * 18_432_000).div_ceil(44_100) as usize;
        for index in 0..count {
            let size = end_of(u64::from(index) + 1) - end_of(u64::from(index));
            let header = if size > FRAME_SIZE_44100 {
                HEADER_44100_PADDED
            } else {
                HEADER_44100
            };
            let start = self.data.len();
            self.data.extend_from_slice(&header);
            self.data.resize(start + size, 0);
            self.data[start + FRAME_NUMBER_OFFSET..][..4].copy_from_slice(&index.to_be_bytes());
        }
        self
    }

    /// Appends a 48 kHz frame carrying a Xing summary with a linear table of contents.
    pub fn with_xing_frame(mut self, frame_count: u32, byte_count: u32) -> Self {
        let mut frame = HEADER_48000.to_vec();
        frame.resize(36, 0);
        frame.extend(b"Xing");
        frame.extend(7u32.to_be_bytes());
        frame.extend(frame_count.to_be_bytes());
        frame.extend(byte_count.to_be_bytes());
        frame.extend((0..100u32).map(|i| (i * 256 / 100) as u8));
        frame.resize(FRAME_SIZE_48000, 0);
        self.data.extend(frame);
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// A source that knows its length, so the stream can seek.
    pub fn into_source(self) -> TestSource {
        let len = self.data.len() as u64;
        ReadSeekSource::new(Cursor::new(self.data), Some(len)).unwrap()
    }

    /// A source of unknown length, like a live stream.
    pub fn into_stream_source(self) -> TestSource {
        ReadSeekSource::new(Cursor::new(self.data), None).unwrap()
    }
}

pub fn syncsafe_bytes(value: u32) -> [u8; 4] {
    [
        (value >> 21) as u8 & 0x7F,
        (value >> 14) as u8 & 0x7F,
        (value >> 7) as u8 & 0x7F,
        value as u8 & 0x7F,
    ]
}

/// An ID3v2 tag header followed by `body`.
pub fn id3_tag(major_version: u8, flags: u8, body: &[u8]) -> Vec<u8> {
    let mut tag = b"ID3".to_vec();
    tag.extend([major_version, 0, flags]);
    tag.extend(syncsafe_bytes(body.len() as u32));
    tag.extend_from_slice(body);
    tag
}

pub fn text_frame_v24(id: &str, encoding: u8, text: &[u8]) -> Vec<u8> {
    let mut frame = id.as_bytes().to_vec();
    frame.extend(syncsafe_bytes(text.len() as u32 + 1));
    frame.extend([0, 0]);
    frame.push(encoding);
    frame.extend_from_slice(text);
    frame
}

pub fn text_frame_v23(id: &str, encoding: u8, text: &[u8]) -> Vec<u8> {
    let mut frame = id.as_bytes().to_vec();
    frame.extend((text.len() as u32 + 1).to_be_bytes());
    frame.extend([0, 0]);
    frame.push(encoding);
    frame.extend_from_slice(text);
    frame
}

pub fn text_frame_v22(id: &str, encoding: u8, text: &[u8]) -> Vec<u8> {
    let mut frame = id.as_bytes().to_vec();
    frame.extend(&(text.len() as u32 + 1).to_be_bytes()[1..]);
    frame.push(encoding);
    frame.extend_from_slice(text);
    frame
}

/// Counters shared between a [`CountingDecoder`] and the test holding it.
#[derive(Debug, Clone, Default)]
pub struct DecoderStats {
    decoded: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl DecoderStats {
    pub fn decoded(&self) -> usize {
        self.decoded.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Stands in for a real decoder: every frame yields its header's samples per frame, with every
/// sample set to the number of frames decoded before it.
#[derive(Debug, Clone, Default)]
pub struct CountingDecoder {
    stats: DecoderStats,
    // Frames producing no output, like a real decoder filling its bit reservoir.
    silent_frames: usize,
}

impl CountingDecoder {
    pub fn new() -> (Self, DecoderStats) {
        let decoder = Self::default();
        let stats = decoder.stats.clone();
        (decoder, stats)
    }

    pub fn with_silent_frames(mut self, silent_frames: usize) -> Self {
        self.silent_frames = silent_frames;
        self
    }
}

impl FrameDecoder for CountingDecoder {
    fn decode(&mut self, frame: &[u8], output: &mut [Sample]) -> usize {
        let index = self.stats.decoded.fetch_add(1, Ordering::SeqCst);
        if index < self.silent_frames {
            return 0;
        }
        let Some(header) = FrameHeader::parse(frame) else {
            return 0;
        };

        let samples = header.samples_per_frame as usize;
        output[..samples * 2].fill(index as Sample);
        samples
    }

    fn close(&mut self) {
        self.stats.closed.fetch_add(1, Ordering::SeqCst);
    }
}

const FRAME_NUMBER_OFFSET: usize = 8;

/// Decodes each frame into samples holding the index written by
/// [`StreamBuilder::with_numbered_frames_44100`].
#[derive(Debug, Clone, Default)]
pub struct FrameNumberDecoder;

impl FrameDecoder for FrameNumberDecoder {
    fn decode(&mut self, frame: &[u8], output: &mut [Sample]) -> usize {
        let Some(header) = FrameHeader::parse(frame) else {
            return 0;
        };
        let Some(number) = frame.get(FRAME_NUMBER_OFFSET..FRAME_NUMBER_OFFSET + 4) else {
            return 0;
        };
        let number = u32::from_be_bytes(number.try_into().unwrap());

        let samples = header.samples_per_frame as usize;
        output[..samples * 2].fill(number as Sample);
        samples
    }
}

/// Builds a provider over `stream` with a counting decoder and a collecting sink.
pub fn provider(source: TestSource) -> (TestProvider, SamplesSink, DecoderStats) {
    let (decoder, stats) = CountingDecoder::new();
    let sink = SamplesSink::new();
    let provider = Mp3TrackProvider::builder()
        .with_source(source)
        .with_decoder(decoder)
        .with_sink_factory(sink.factory())
        .build()
        .unwrap();
    (provider, sink, stats)
}
