use std::time::Duration;

use mp3_demux::seeker::Mp3Seeker;
use mp3_demux::sink::SamplesSink;
use mp3_demux::{DemuxError, Mp3TrackProvider, Sample, SeekError, StopHandle};
use rstest::rstest;

mod test_support;
use test_support::*;

fn constant_rate_stream(frames: usize) -> TestSource {
    StreamBuilder::new()
        .with_id3v24(&[("TIT2", "Constant")])
        .with_frames(HEADER_48000, FRAME_SIZE_48000, frames)
        .into_source()
}

#[test]
fn known_length_selects_constant_rate() {
    let (mut provider, _, _) = provider(constant_rate_stream(10));
    provider.parse_headers().unwrap();

    assert!(matches!(provider.seeker(), Some(Mp3Seeker::ConstantRate(_))));
    assert!(provider.is_seekable());
    assert_eq!(provider.duration(), Some(Duration::from_millis(240)));
}

#[test]
fn seek_to_zero_replays_everything() {
    let (mut provider, sink, _) = provider(constant_rate_stream(10));
    provider.parse_headers().unwrap();

    assert_eq!(provider.seek_to_timecode(Duration::ZERO).unwrap(), Duration::ZERO);
    assert_eq!(provider.frame_index(), 0);
    provider.provide_frames(&StopHandle::new()).unwrap();
    assert_eq!(sink.block_count(), 10);
}

#[test]
fn seek_lands_on_a_frame_boundary() {
    let (mut provider, sink, _) = provider(constant_rate_stream(10));
    provider.parse_headers().unwrap();

    let actual = provider
        .seek_to_timecode(Duration::from_millis(100))
        .unwrap();
    assert_eq!(actual, Duration::from_millis(96));
    assert_eq!(provider.frame_index(), 4);
    assert_eq!(
        sink.seeks(),
        vec![(Duration::from_millis(100), Duration::from_millis(96))]
    );

    provider.provide_frames(&StopHandle::new()).unwrap();
    assert_eq!(sink.block_count(), 6);
    assert_eq!(provider.frame_index(), 10);
}

#[test]
fn seek_to_the_end_lands_on_the_last_frame() {
    let (mut provider, sink, _) = provider(constant_rate_stream(10));
    provider.parse_headers().unwrap();
    let duration = provider.duration().unwrap();

    assert_eq!(
        provider.seek_to_timecode(duration).unwrap(),
        Duration::from_millis(216)
    );
    assert_eq!(
        provider.seek_to_timecode(Duration::from_secs(3600)).unwrap(),
        Duration::from_millis(216)
    );

    provider.provide_frames(&StopHandle::new()).unwrap();
    assert_eq!(sink.block_count(), 1);
}

#[test]
fn seeking_backwards_after_playing() {
    let (mut provider, sink, _) = provider(constant_rate_stream(10));
    provider.parse_headers().unwrap();
    provider.provide_frames(&StopHandle::new()).unwrap();

    provider
        .seek_to_timecode(Duration::from_millis(48))
        .unwrap();
    provider.provide_frames(&StopHandle::new()).unwrap();
    assert_eq!(sink.block_count(), 10 + 8);
}

#[rstest]
fn seeking_to_the_reported_timecode_is_stable(
    #[values(0, 1, 25, 26, 27, 500, 1000, 1044, 1045, 2600)] millis: u64,
) {
    // 44.1 kHz frames are 26.12ms long, so reported timecodes are truncated.
    let source = StreamBuilder::new()
        .with_numbered_frames_44100(100)
        .into_source();
    let (mut provider, _, _) = provider(source);
    provider.parse_headers().unwrap();

    let requested = Duration::from_millis(millis);
    let actual = provider.seek_to_timecode(requested).unwrap();
    let index = provider.frame_index();
    assert!(actual <= requested);

    assert_eq!(provider.seek_to_timecode(actual).unwrap(), actual);
    assert_eq!(provider.frame_index(), index);
}

#[rstest]
fn padded_frames_seek_to_the_reported_frame(
    #[values(0, 1_000, 12_345, 40_000, 52_000)] millis: u64,
) {
    let source = StreamBuilder::new()
        .with_id3v24(&[("TIT2", "Padded")])
        .with_numbered_frames_44100(2000)
        .into_source();
    let sink = SamplesSink::new();
    let mut provider = Mp3TrackProvider::builder()
        .with_source(source)
        .with_decoder(FrameNumberDecoder)
        .with_sink_factory(sink.factory())
        .build()
        .unwrap();
    provider.parse_headers().unwrap();

    assert!(matches!(provider.seeker(), Some(Mp3Seeker::ConstantRate(_))));
    // 2000 frames of 1152 samples at 44.1 kHz
    assert_eq!(provider.duration(), Some(Duration::from_millis(52_244)));

    provider.seek_to_timecode(Duration::from_millis(millis)).unwrap();
    let index = provider.frame_index();
    provider.provide_frames(&StopHandle::new()).unwrap();

    assert_eq!(sink.samples().first(), Some(&(index as Sample)));
    assert_eq!(sink.block_count() as u64, 2000 - index);
}

#[test]
fn xing_summary_drives_seeking() {
    let source = StreamBuilder::new()
        .with_id3v24(&[("TIT2", "Variable")])
        .with_xing_frame(10, 10 * FRAME_SIZE_48000 as u32)
        .with_frames(HEADER_48000, FRAME_SIZE_48000, 10)
        .into_source();
    let (mut provider, sink, _) = provider(source);
    provider.parse_headers().unwrap();

    assert!(matches!(provider.seeker(), Some(Mp3Seeker::Xing(_))));
    assert_eq!(provider.duration(), Some(Duration::from_millis(240)));

    // Halfway through the table is halfway through the audio bytes: frame 5.
    let actual = provider
        .seek_to_timecode(Duration::from_millis(120))
        .unwrap();
    assert_eq!(actual, Duration::from_millis(120));
    assert_eq!(provider.frame_index(), 5);

    provider.provide_frames(&StopHandle::new()).unwrap();
    assert_eq!(sink.block_count(), 5);
}

#[test]
fn xing_summary_frame_is_not_played() {
    let source = StreamBuilder::new()
        .with_xing_frame(10, 10 * FRAME_SIZE_48000 as u32)
        .with_frames(HEADER_48000, FRAME_SIZE_48000, 10)
        .into_source();
    let (mut provider, sink, stats) = provider(source);
    provider.parse_headers().unwrap();
    provider.provide_frames(&StopHandle::new()).unwrap();

    assert_eq!(stats.decoded(), 10);
    assert_eq!(sink.block_count(), 10);
    assert_eq!(provider.frame_index(), 10);
    assert_eq!(provider.duration(), Some(Duration::from_millis(240)));
}

#[test]
fn xing_summary_is_ignored_without_content_length() {
    let source = StreamBuilder::new()
        .with_xing_frame(10, 10 * FRAME_SIZE_48000 as u32)
        .with_frames(HEADER_48000, FRAME_SIZE_48000, 10)
        .into_stream_source();
    let (mut provider, _, _) = provider(source);
    provider.parse_headers().unwrap();

    assert!(matches!(provider.seeker(), Some(Mp3Seeker::Stream(_))));
    assert_eq!(provider.duration(), None);
}

#[test]
fn unseekable_stream_refuses_and_keeps_playing() {
    let source = StreamBuilder::new()
        .with_frames(HEADER_48000, FRAME_SIZE_48000, 4)
        .into_stream_source();
    let (mut provider, sink, _) = provider(source);
    provider.parse_headers().unwrap();

    assert!(!provider.is_seekable());
    let err = provider
        .seek_to_timecode(Duration::from_millis(50))
        .unwrap_err();
    assert!(matches!(err, DemuxError::Seek(SeekError::NotSupported)));
    assert!(sink.seeks().is_empty());

    provider.provide_frames(&StopHandle::new()).unwrap();
    assert_eq!(sink.block_count(), 4);
}
