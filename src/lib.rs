//! MP3 demuxing.
//!
//! This crate reads an MPEG audio (MP3) stream from a random access byte source, skips its
//! leading ID3v2 tag while picking up the title and artist, locks on to the first frame and then
//! hands frame after frame to a decoder, forwarding the decoded audio to a sink. It can seek by
//! timecode, using the Xing table of variable bitrate files or the fixed frame size of constant
//! bitrate ones.
//!
//! The audio decode itself happens behind the [`FrameDecoder`] trait. With the default
//! `symphonia-mp3` feature, [`SymphoniaFrameDecoder`](decoder::SymphoniaFrameDecoder) does it.
//!
//! # Usage
//!
//! ```no_run
//! use std::fs::File;
//! use std::time::Duration;
//! use mp3_demux::byte_source::ReadSeekSource;
//! use mp3_demux::decoder::SymphoniaFrameDecoder;
//! use mp3_demux::sink::SamplesSink;
//! use mp3_demux::{id3, Mp3TrackProvider, StopHandle};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let file = File::open("track.mp3")?;
//!     let len = file.metadata()?.len();
//!     let sink = SamplesSink::new();
//!
//!     let mut provider = Mp3TrackProvider::builder()
//!         .with_source(ReadSeekSource::new(file, Some(len))?)
//!         .with_decoder(SymphoniaFrameDecoder::new()?)
//!         .with_sink_factory(sink.factory())
//!         .build()?;
//!
//!     provider.parse_headers()?;
//!     println!("{:?} by {:?}", provider.tag(id3::TITLE), provider.tag(id3::ARTIST));
//!
//!     if provider.is_seekable() {
//!         provider.seek_to_timecode(Duration::from_secs(30))?;
//!     }
//!     provider.provide_frames(&StopHandle::new())?;
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `symphonia-mp3` (default): ships [`SymphoniaFrameDecoder`](decoder::SymphoniaFrameDecoder).
//! - `tracing` (default): emits `tracing` events while parsing, seeking and decoding.

#![cfg_attr(docsrs, feature(doc_cfg))]

mod common;
mod math;

pub mod byte_source;
pub mod constants;
pub mod decoder;
pub mod error;
pub mod frame_reader;
pub mod header;
pub mod id3;
pub mod provider;
pub mod seeker;
pub mod sink;

pub use crate::common::{ChannelCount, Sample, SampleRate};
pub use crate::decoder::FrameDecoder;
pub use crate::error::{BuildError, DemuxError, SeekError};
pub use crate::math::{frame_index_at, timecode_of_frame};
pub use crate::provider::{
    Mp3TrackProvider, Mp3TrackProviderBuilder, ProvideOutcome, Settings, StopHandle,
};
pub use crate::sink::PcmSink;
