use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use common::{bits, BOARD_SQ, HISTORY_STEP, INPUT_CHANNELS, PACKED_SAMPLE_LEN, PLANE_BYTES};

use archive::{Cursor, DecodeError};

use crate::encode::EncodedPosition;
use crate::symmetry;

pub const SAMPLE_MAGIC: u8 = b'v';

/// One pre-encoded training sample: the stored history planes as bit-packed
/// bitmaps, then a player-is-white flag byte and a signed result byte. The
/// color-to-move planes are not stored; they are synthesized from the flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedSample {
    bytes: [u8; PACKED_SAMPLE_LEN],
}

impl PackedSample {
    pub fn from_bytes(bytes: [u8; PACKED_SAMPLE_LEN]) -> Self {
        Self { bytes }
    }

    pub fn from_position(position: &EncodedPosition) -> Self {
        let mut bytes = [0u8; PACKED_SAMPLE_LEN];

        for plane in 0..2 * HISTORY_STEP {
            let packed = bits::pack_plane(position.history_plane(plane));
            bytes[plane * PLANE_BYTES..(plane + 1) * PLANE_BYTES].copy_from_slice(&packed);
        }
        bytes[PACKED_SAMPLE_LEN - 2] = u8::from(!position.black_to_move());
        bytes[PACKED_SAMPLE_LEN - 1] = position.result() as u8;

        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; PACKED_SAMPLE_LEN] {
        &self.bytes
    }

    pub fn plane(&self, plane: usize) -> &[u8] {
        &self.bytes[plane * PLANE_BYTES..(plane + 1) * PLANE_BYTES]
    }

    pub fn player_is_white(&self) -> bool {
        self.bytes[PACKED_SAMPLE_LEN - 2] != 0
    }

    pub fn result(&self) -> i8 {
        self.bytes[PACKED_SAMPLE_LEN - 1] as i8
    }

    /// Unpacks the stored planes to one 0/1 cell per coordinate.
    pub fn unpack_planes(&self) -> Vec<u8> {
        let mut cells = Vec::with_capacity(2 * HISTORY_STEP * BOARD_SQ);
        for plane in 0..2 * HISTORY_STEP {
            cells.extend_from_slice(&bits::unpack_plane(self.plane(plane)));
        }
        cells
    }

    /// Applies a board symmetry, producing a new record. The source record is
    /// left untouched and may back any number of augmented samples.
    pub fn apply_symmetry(&self, symmetry: usize) -> Self {
        let cells = symmetry::apply_to_planes(symmetry, &self.unpack_planes());

        // flag and result bytes carry over unchanged
        let mut bytes = self.bytes;
        for plane in 0..2 * HISTORY_STEP {
            let packed = bits::pack_plane(&cells[plane * BOARD_SQ..(plane + 1) * BOARD_SQ]);
            bytes[plane * PLANE_BYTES..(plane + 1) * PLANE_BYTES].copy_from_slice(&packed);
        }

        Self { bytes }
    }

    /// The training-side contract: the full unpacked input with the two
    /// color-to-move planes synthesized from the stored flag, plus the
    /// outcome scalar.
    pub fn to_input(&self) -> (Vec<u8>, f32) {
        let mut input = self.unpack_planes();
        input.reserve(2 * BOARD_SQ);

        let white_to_move = u8::from(self.player_is_white());
        input.extend(std::iter::repeat(1 - white_to_move).take(BOARD_SQ));
        input.extend(std::iter::repeat(white_to_move).take(BOARD_SQ));

        debug_assert_eq!(input.len(), INPUT_CHANNELS * BOARD_SQ);
        (input, self.result() as f32)
    }
}

impl EncodedPosition {
    /// Bit-packs this position into a sample record.
    pub fn to_packed(&self) -> PackedSample {
        PackedSample::from_position(self)
    }
}

/// A loaded archive of pre-encoded samples, one `'v'`-framed record each.
#[derive(Debug)]
pub struct ScoreArchive {
    samples: Vec<PackedSample>,
}

impl ScoreArchive {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let bytes =
            fs::read(path).with_context(|| format!("Failed to read sample archive: {:?}", path))?;
        let archive = Self::from_bytes(&bytes)
            .with_context(|| format!("Failed to decode sample archive: {:?}", path))?;

        info!("loaded {} samples from {:?}", archive.len(), path);

        Ok(archive)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut cursor = Cursor::new(bytes);
        let mut samples = Vec::new();

        while !cursor.is_empty() {
            let offset = cursor.offset();
            let magic = cursor.read_u8()?;
            if magic != SAMPLE_MAGIC {
                return Err(DecodeError::BadFrameMagic {
                    found: magic,
                    offset,
                });
            }

            let raw = cursor.take(PACKED_SAMPLE_LEN)?;
            samples.push(PackedSample::from_bytes(
                raw.try_into().expect("fixed length slice"),
            ));
        }

        Ok(Self { samples })
    }

    pub fn write(path: impl AsRef<Path>, samples: &[PackedSample]) -> Result<()> {
        let path = path.as_ref();

        let file = File::create(path)
            .with_context(|| format!("Failed to create sample archive: {:?}", path))?;
        let mut writer = BufWriter::new(file);
        Self::write_to(&mut writer, samples)?;
        writer.flush()?;

        Ok(())
    }

    pub fn write_to(writer: &mut impl Write, samples: &[PackedSample]) -> Result<()> {
        for sample in samples {
            writer.write_all(&[SAMPLE_MAGIC])?;
            writer.write_all(sample.as_bytes())?;
        }
        Ok(())
    }

    pub fn samples(&self) -> &[PackedSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
