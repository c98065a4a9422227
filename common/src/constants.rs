/// Board edge length. Archives declaring any other size are rejected at load.
pub const BOARD_SIZE: usize = 19;

/// Number of playable points on the board.
pub const BOARD_SQ: usize = BOARD_SIZE * BOARD_SIZE;

/// Sentinel coordinate for a pass move. Only valid as a move position and as
/// the final entry of a probability vector, never as an occupancy coordinate.
pub const PASS_MOVE: usize = BOARD_SQ;

/// Occupancy snapshots kept per color when encoding a position.
pub const HISTORY_STEP: usize = 8;

/// History planes for both colors plus the two color-to-move planes.
pub const INPUT_CHANNELS: usize = 2 * HISTORY_STEP + 2;

/// Probability vector length: one entry per point plus the pass entry.
pub const PROB_LEN: usize = BOARD_SQ + 1;

/// Bytes in one bit-packed occupancy plane.
pub const PLANE_BYTES: usize = (BOARD_SQ + 7) / 8;

/// Bytes in one bit-packed sample record: the stored history planes followed
/// by a player-is-white flag byte and a signed result byte.
pub const PACKED_SAMPLE_LEN: usize = 2 * HISTORY_STEP * PLANE_BYTES + 2;
