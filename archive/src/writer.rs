use std::io::Write;

use anyhow::Result;
use byteorder::{LittleEndian, WriteBytesExt};
use log::warn;

use common::{BOARD_SIZE, PROB_LEN};

use crate::board::{Color, GoBoard};
use crate::framing::{Framing, ARCHIVE_TAG, ENTRY_MAGIC};
use crate::record::{STEP_HAS_PROBS, STEP_HAS_REMOVES, STEP_NOT_SAMPLED};

/// Streams games into a move-log archive. Moves are replayed on an internal
/// board to derive each step's capture list; a move onto an occupied point
/// marks the whole game invalid and `end_game` drops it.
pub struct ArchiveWriter<W> {
    out: W,
    framing: Framing,
    board: GoBoard,
    buffer: Vec<u8>,
    move_count: u16,
    to_move: Color,
    game_valid: bool,
    in_game: bool,
}

impl<W: Write> ArchiveWriter<W> {
    /// Writes the archive header and returns the writer.
    pub fn create(mut out: W, framing: Framing) -> Result<Self> {
        out.write_all(&[ARCHIVE_TAG, BOARD_SIZE as u8])?;

        Ok(Self {
            out,
            framing,
            board: GoBoard::new(),
            buffer: Vec::new(),
            move_count: 0,
            to_move: Color::Black,
            game_valid: false,
            in_game: false,
        })
    }

    pub fn start_game(&mut self) {
        self.buffer.clear();
        self.move_count = 0;
        self.board.reset();
        self.to_move = Color::Black;
        self.game_valid = true;
        self.in_game = true;
    }

    /// Adds one ply for the side to move. `probs` is either empty or a full
    /// search distribution; `valid` unset excludes the step from sampling.
    pub fn add_move(&mut self, position: usize, probs: &[f32], valid: bool) {
        assert!(self.in_game, "add_move called outside a game");

        if !self.game_valid {
            return;
        }

        let removed = match self.board.play(self.to_move, position) {
            Ok(removed) => removed,
            Err(err) => {
                warn!("discarding game: {}", err);
                self.game_valid = false;
                return;
            }
        };

        let mut word = position as u16;
        if !removed.is_empty() {
            word |= STEP_HAS_REMOVES;
        }
        if !probs.is_empty() {
            assert_eq!(probs.len(), PROB_LEN);
            word |= STEP_HAS_PROBS;
        }
        if !valid {
            word |= STEP_NOT_SAMPLED;
        }

        self.push_u16(word);
        if !removed.is_empty() {
            self.push_u16(removed.len() as u16);
            for rm in removed {
                self.push_u16(rm);
            }
        }
        for &p in probs {
            self.buffer.extend_from_slice(&p.to_le_bytes());
        }

        self.to_move = self.to_move.opponent();
        self.move_count += 1;
    }

    /// Finishes the current game and writes its framed entry. Returns the
    /// number of bytes written, or 0 when the game was discarded.
    pub fn end_game(&mut self, result: i8) -> Result<usize> {
        assert!(self.in_game, "end_game called outside a game");
        self.in_game = false;

        if !self.game_valid {
            self.buffer.clear();
            return Ok(0);
        }

        // result byte + move count precede the buffered steps
        let payload_len = self.buffer.len() + 3;
        let mut written = 1 + payload_len;

        self.out.write_u8(ENTRY_MAGIC)?;
        if self.framing == Framing::LengthPrefixed {
            self.out.write_i32::<LittleEndian>(payload_len as i32)?;
            written += 4;
        }
        self.out.write_i8(result)?;
        self.out.write_u16::<LittleEndian>(self.move_count)?;
        self.out.write_all(&self.buffer)?;

        self.buffer.clear();
        Ok(written)
    }

    /// Writes a whole game from a bare move list.
    pub fn encode_game(&mut self, moves: &[usize], result: i8) -> Result<usize> {
        self.start_game();
        for &position in moves {
            self.add_move(position, &[], true);
        }
        self.end_game(result)
    }

    /// Flushes and hands back the underlying stream.
    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }

    fn push_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }
}
