//! Leading ID3v2 tag handling.
//!
//! The tag is skipped as a whole; while walking its frames the two text frames callers can ask
//! for (`TIT2` title and `TPE1` artist) are decoded into a [`TagTable`]. Everything else is
//! stepped over using the declared frame sizes.

use std::collections::HashMap;
use std::io;

use encoding_rs::{UTF_16BE, UTF_8};

use crate::byte_source::ByteSource;
use crate::frame_reader::FrameReader;

const TAG_MARKER: &[u8; 3] = b"ID3";

const FLAG_UNSYNCHRONIZATION: u8 = 0x80;
const FLAG_EXTENDED: u8 = 0x40;
const FLAG_FOOTER: u8 = 0x10;

const FOOTER_SIZE: u64 = 10;

/// Title frame identifier.
pub const TITLE: &str = "TIT2";
/// Lead artist frame identifier.
pub const ARTIST: &str = "TPE1";

/// Text tags extracted from the leading ID3v2 tag, keyed by their four character identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagTable {
    tags: HashMap<&'static str, String>,
}

impl TagTable {
    /// Value of the tag with exactly this identifier, if it was present.
    #[inline]
    pub fn get(&self, id: &str) -> Option<&str> {
        self.tags.get(id).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(id, value)| (*id, value.as_str()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Flags of a single tag frame, normalized across tag versions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameFlags {
    pub tag_alter_preservation: bool,
    pub file_alter_preservation: bool,
    pub read_only: bool,
    pub grouping_identity: bool,
    pub compression: bool,
    pub encryption: bool,
    pub unsynchronization: bool,
    pub data_length_indicator: bool,
}

impl FrameFlags {
    /// ID3v2.4 layout: `0abc0000 0h00kmnp`.
    pub fn from_v24(flags: u16) -> Self {
        FrameFlags {
            tag_alter_preservation: flags & 0x4000 != 0,
            file_alter_preservation: flags & 0x2000 != 0,
            read_only: flags & 0x1000 != 0,
            grouping_identity: flags & 0x0040 != 0,
            compression: flags & 0x0008 != 0,
            encryption: flags & 0x0004 != 0,
            unsynchronization: flags & 0x0002 != 0,
            data_length_indicator: flags & 0x0001 != 0,
        }
    }

    /// ID3v2.3 layout: `abc00000 ijk00000`. Unsynchronization is a tag wide flag there.
    pub fn from_v23(flags: u16, tag_unsynchronized: bool) -> Self {
        FrameFlags {
            tag_alter_preservation: flags & 0x8000 != 0,
            file_alter_preservation: flags & 0x4000 != 0,
            read_only: flags & 0x2000 != 0,
            compression: flags & 0x0080 != 0,
            encryption: flags & 0x0040 != 0,
            grouping_identity: flags & 0x0020 != 0,
            unsynchronization: tag_unsynchronized,
            data_length_indicator: false,
        }
    }

    /// Whether the frame body can be read as is, without decompressing, decrypting or
    /// undoing unsynchronization.
    #[inline]
    pub fn is_raw(&self) -> bool {
        !self.compression
            && !self.encryption
            && !self.unsynchronization
            && !self.data_length_indicator
    }
}

#[derive(Debug, Clone, Copy)]
struct FrameHeader {
    id: [u8; 4],
    size: u64,
    flags: FrameFlags,
}

impl FrameHeader {
    /// Identifier under which this frame is stored, if it is one of the known text frames.
    fn known_text_id(&self) -> Option<&'static str> {
        match &self.id {
            b"TIT2" | b"TT2\0" => Some(TITLE),
            b"TPE1" | b"TP1\0" => Some(ARTIST),
            _ => None,
        }
    }
}

/// Decodes a 28 bit syncsafe integer: 7 low bits of each byte, big endian.
#[inline]
pub fn syncsafe(bytes: [u8; 4]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |acc, &byte| (acc << 7) | u32::from(byte & 0x7F))
}

/// Consumes a leading ID3v2 tag, leaving `source` at the first byte after it.
///
/// Without a tag the three bytes read to check for one are handed to `frame_reader` so the
/// frame scan still sees them. Tags with a major version outside 2..=5 are skipped without
/// reading their frames; version 5 frames are not read either since their layout is unknown.
pub fn skip_tags<S>(source: &mut S, frame_reader: &mut FrameReader) -> io::Result<TagTable>
where
    S: ByteSource + ?Sized,
{
    let mut marker = [0u8; 3];
    source.read_exact(&mut marker)?;

    if &marker != TAG_MARKER {
        frame_reader.append_to_scan_buffer(&marker);
        return Ok(TagTable::default());
    }

    let mut header = [0u8; 7];
    source.read_exact(&mut header)?;
    let [major_version, _minor_version, flags, s0, s1, s2, s3] = header;
    let tags_size = syncsafe([s0, s1, s2, s3]);

    let frames_end = source.position() + u64::from(tags_size);
    let tags_end = if major_version >= 4 && flags & FLAG_FOOTER != 0 {
        frames_end + FOOTER_SIZE
    } else {
        frames_end
    };

    let mut table = TagTable::default();

    if !(2..=5).contains(&major_version) {
        #[cfg(feature = "tracing")]
        tracing::debug!(major_version, "skipping ID3v2 tag of unsupported version");
        source.seek(tags_end)?;
        return Ok(table);
    }

    // In v2.2 this bit means the whole tag is compressed.
    let compressed = major_version == 2 && flags & FLAG_EXTENDED != 0;

    if !compressed && flags & FLAG_EXTENDED != 0 {
        skip_extended_header(source, major_version)?;
    }

    if major_version < 5 && !compressed {
        let tag_unsynchronized = flags & FLAG_UNSYNCHRONIZATION != 0;
        parse_frames(source, &mut table, major_version, tag_unsynchronized, frames_end)?;
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        major_version,
        tags_size,
        found = table.len(),
        "parsed ID3v2 tag"
    );

    source.seek(tags_end)?;
    Ok(table)
}

fn skip_extended_header<S>(source: &mut S, major_version: u8) -> io::Result<()>
where
    S: ByteSource + ?Sized,
{
    let mut size = [0u8; 4];
    source.read_exact(&mut size)?;

    if major_version >= 4 {
        // The syncsafe size counts its own four bytes.
        source.skip(u64::from(syncsafe(size)).saturating_sub(4))
    } else {
        source.skip(u64::from(u32::from_be_bytes(size)))
    }
}

fn parse_frames<S>(
    source: &mut S,
    table: &mut TagTable,
    major_version: u8,
    tag_unsynchronized: bool,
    frames_end: u64,
) -> io::Result<()>
where
    S: ByteSource + ?Sized,
{
    let header_len: u64 = if major_version == 2 { 6 } else { 10 };

    while source.position() + header_len <= frames_end {
        let Some(frame) = read_frame_header(source, major_version, tag_unsynchronized)? else {
            break;
        };

        let data_start = source.position();
        if frame.size > frames_end.saturating_sub(data_start) {
            break;
        }

        match frame.known_text_id() {
            Some(id) if frame.flags.is_raw() && frame.size > 0 => {
                if let Some(text) = read_text(source, frame.size as usize)? {
                    table.tags.insert(id, text);
                }
            }
            Some(_id) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(id = _id, flags = ?frame.flags, "skipping non-raw text frame");
            }
            None => {}
        }

        source.seek(data_start + frame.size)?;
    }

    Ok(())
}

fn read_frame_header<S>(
    source: &mut S,
    major_version: u8,
    tag_unsynchronized: bool,
) -> io::Result<Option<FrameHeader>>
where
    S: ByteSource + ?Sized,
{
    if major_version == 2 {
        let mut raw = [0u8; 6];
        source.read_exact(&mut raw)?;
        if raw[0] == 0 {
            return Ok(None);
        }

        let size = u32::from_be_bytes([0, raw[3], raw[4], raw[5]]);
        return Ok(Some(FrameHeader {
            id: [raw[0], raw[1], raw[2], 0],
            size: u64::from(size),
            flags: FrameFlags {
                unsynchronization: tag_unsynchronized,
                ..FrameFlags::default()
            },
        }));
    }

    let mut raw = [0u8; 10];
    source.read_exact(&mut raw)?;
    if raw[0] == 0 {
        return Ok(None);
    }

    let size_bytes = [raw[4], raw[5], raw[6], raw[7]];
    let flags = u16::from_be_bytes([raw[8], raw[9]]);
    let (size, flags) = if major_version == 3 {
        (
            u32::from_be_bytes(size_bytes),
            FrameFlags::from_v23(flags, tag_unsynchronized),
        )
    } else {
        (syncsafe(size_bytes), FrameFlags::from_v24(flags))
    };

    Ok(Some(FrameHeader {
        id: [raw[0], raw[1], raw[2], raw[3]],
        size: u64::from(size),
        flags,
    }))
}

fn read_text<S>(source: &mut S, size: usize) -> io::Result<Option<String>>
where
    S: ByteSource + ?Sized,
{
    let mut data = vec![0u8; size];
    source.read_exact(&mut data)?;
    Ok(decode_text(data[0], &data[1..]))
}

/// Decodes the body of a text frame after its encoding byte.
///
/// Encodings: 0 ISO-8859-1, 1 UTF-16 with byte order mark (big endian without one),
/// 2 UTF-16BE, 3 UTF-8. A single trailing terminator is not part of the value. Unknown
/// encodings yield `None`.
pub fn decode_text(encoding: u8, data: &[u8]) -> Option<String> {
    let text = match encoding {
        0 => encoding_rs::mem::decode_latin1(strip_terminator(data, 1)),
        1 => UTF_16BE.decode(strip_terminator(data, 2)).0,
        2 => {
            UTF_16BE
                .decode_without_bom_handling(strip_terminator(data, 2))
                .0
        }
        3 => UTF_8.decode(strip_terminator(data, 1)).0,
        _ => return None,
    };
    Some(text.into_owned())
}

fn strip_terminator(data: &[u8], width: usize) -> &[u8] {
    match data.len().checked_sub(width) {
        Some(end) if data[end..].iter().all(|&byte| byte == 0) => &data[..end],
        _ => data,
    }
}
