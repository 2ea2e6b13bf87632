use std::time::Duration;

use crate::byte_source::ByteSource;
use crate::error::SeekError;

/// Seeker for streams of unknown length, such as live radio. Nothing can be located in them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSeeker;

impl StreamSeeker {
    #[inline]
    pub fn is_seekable(&self) -> bool {
        false
    }

    /// Unknown.
    #[inline]
    pub fn duration(&self) -> Option<Duration> {
        None
    }

    /// Always fails with [`SeekError::NotSupported`], leaving the stream untouched.
    pub fn seek_and_get_frame_index<S>(
        &self,
        _timecode: u64,
        _source: &mut S,
    ) -> Result<u64, SeekError>
    where
        S: ByteSource + ?Sized,
    {
        Err(SeekError::NotSupported)
    }
}
