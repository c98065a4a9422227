use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use log::{info, warn};

use common::BOARD_SIZE;

use crate::cursor::Cursor;
use crate::error::DecodeError;
use crate::framing::{Framing, ARCHIVE_TAG};
use crate::record::GameRecord;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// An ordered, immutable collection of game records loaded from one or more
/// archive files. Records parse lazily and cache their decoded form, so a
/// loaded archive can be shared read-only across any number of workers.
#[derive(Debug)]
pub struct GameArchive {
    games: Vec<GameRecord>,
}

impl GameArchive {
    pub fn load(path: impl AsRef<Path>, framing: Framing) -> Result<Self> {
        let mut archive = Self { games: vec![] };
        archive.append(path, framing)?;
        Ok(archive)
    }

    /// Loads another archive file into this collection.
    pub fn append(&mut self, path: impl AsRef<Path>, framing: Framing) -> Result<()> {
        let path = path.as_ref();

        let bytes = read_archive_bytes(path)
            .with_context(|| format!("Failed to read archive: {:?}", path))?;

        let loaded = self
            .append_bytes(&bytes, framing)
            .with_context(|| format!("Failed to decode archive: {:?}", path))?;

        info!("loaded {} games from {:?}", loaded, path);

        Ok(())
    }

    pub fn from_bytes(bytes: &[u8], framing: Framing) -> Result<Self> {
        let mut archive = Self { games: vec![] };
        archive.append_bytes(bytes, framing)?;
        Ok(archive)
    }

    fn append_bytes(&mut self, bytes: &[u8], framing: Framing) -> Result<usize> {
        let mut cursor = Cursor::new(bytes);

        let tag = cursor.read_u8()?;
        let board_size = cursor.read_u8()?;
        if tag != ARCHIVE_TAG || board_size as usize != BOARD_SIZE {
            return Err(DecodeError::BadHeader { tag, board_size }.into());
        }

        let decoder = framing.decoder();
        let mut loaded = 0;
        loop {
            let entry_index = self.games.len();
            match decoder.next_record(&mut cursor) {
                Ok(Some(record)) => {
                    self.games.push(record);
                    loaded += 1;
                }
                Ok(None) => break,
                Err(err) => {
                    return Err(anyhow::Error::new(err)
                        .context(format!("game entry {}", entry_index)));
                }
            }
        }

        Ok(loaded)
    }

    pub fn games(&self) -> &[GameRecord] {
        &self.games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// `(game_index, step_index)` pairs for every step eligible for sampling.
    /// A record whose lazy parse fails is skipped with a warning; under the
    /// stream framing such records cannot exist, since the load would have
    /// failed outright.
    pub fn sample_positions(&self) -> Vec<(usize, usize)> {
        let mut entries = vec![];
        for (game_index, record) in self.games.iter().enumerate() {
            match record.parsed() {
                Ok(parsed) => {
                    entries.extend(parsed.valid_indices().iter().map(|&step| (game_index, step)))
                }
                Err(err) => warn!("skipping unparseable game {}: {}", game_index, err),
            }
        }
        entries
    }
}

fn read_archive_bytes(path: &Path) -> Result<Vec<u8>> {
    let bytes = fs::read(path)?;

    if bytes.starts_with(&GZIP_MAGIC) {
        let mut decoded = Vec::new();
        GzDecoder::new(&bytes[..]).read_to_end(&mut decoded)?;
        return Ok(decoded);
    }

    Ok(bytes)
}
