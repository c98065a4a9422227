use thiserror::Error;

/// Decode failures for archives and game records. All of these are terminal
/// for the unit being decoded; the input is a static file, so nothing is
/// retried and no out-of-range value is ever defaulted.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unexpected end of input at byte {offset}: {needed} bytes needed, {available} available")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("bad archive header: tag {tag:#04x}, board size {board_size}")]
    BadHeader { tag: u8, board_size: u8 },

    #[error("bad entry magic {found:#04x} at byte {offset}")]
    BadFrameMagic { found: u8, offset: usize },

    #[error("game result {0} is not -1, 0 or 1")]
    InvalidResult(i8),

    #[error("move position {pos} exceeds the board ({max} points)")]
    InvalidPosition { pos: u16, max: usize },

    #[error("capture position {pos} outside the board ({max} points)")]
    InvalidRemovePosition { pos: u16, max: usize },
}
