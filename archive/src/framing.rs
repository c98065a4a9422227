use crate::cursor::Cursor;
use crate::error::DecodeError;
use crate::record::{GameRecord, ParsedGame};

pub const ARCHIVE_TAG: u8 = b'G';
pub const ENTRY_MAGIC: u8 = b'g';

/// How game entries are delimited after the two byte archive header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// `'g'` followed by the bare payload. The payload must be decoded
    /// eagerly to find the next entry boundary, so any decode error aborts
    /// the whole archive.
    Stream,
    /// `'g'`, a signed 32 bit little-endian payload length, then that many
    /// payload bytes handed to the record parser lazily.
    LengthPrefixed,
}

impl Framing {
    pub(crate) fn decoder(&self) -> &'static dyn RecordFraming {
        match self {
            Framing::Stream => &StreamFraming,
            Framing::LengthPrefixed => &LengthPrefixedFraming,
        }
    }
}

pub(crate) trait RecordFraming {
    /// Reads the next entry, or `None` on clean end-of-stream. End-of-stream
    /// is only clean when the cursor is exhausted before the entry magic;
    /// running out of bytes anywhere inside an entry is `TruncatedInput`.
    fn next_record(&self, cursor: &mut Cursor) -> Result<Option<GameRecord>, DecodeError>;
}

pub(crate) struct StreamFraming;

pub(crate) struct LengthPrefixedFraming;

fn read_entry_magic(cursor: &mut Cursor) -> Result<bool, DecodeError> {
    if cursor.is_empty() {
        return Ok(false);
    }

    let offset = cursor.offset();
    let magic = cursor.read_u8()?;
    if magic != ENTRY_MAGIC {
        return Err(DecodeError::BadFrameMagic {
            found: magic,
            offset,
        });
    }

    Ok(true)
}

impl RecordFraming for StreamFraming {
    fn next_record(&self, cursor: &mut Cursor) -> Result<Option<GameRecord>, DecodeError> {
        if !read_entry_magic(cursor)? {
            return Ok(None);
        }

        let parsed = ParsedGame::decode(cursor)?;
        Ok(Some(GameRecord::from_parsed(parsed)))
    }
}

impl RecordFraming for LengthPrefixedFraming {
    fn next_record(&self, cursor: &mut Cursor) -> Result<Option<GameRecord>, DecodeError> {
        if !read_entry_magic(cursor)? {
            return Ok(None);
        }

        let offset = cursor.offset();
        let len = cursor.read_i32()?;
        let len = usize::try_from(len).map_err(|_| DecodeError::TruncatedInput {
            offset,
            needed: len.unsigned_abs() as usize,
            available: cursor.remaining(),
        })?;

        let payload = cursor.take(len)?;
        Ok(Some(GameRecord::from_raw(payload.to_vec())))
    }
}
