use archive::ParsedGame;

use common::{BOARD_SQ, HISTORY_STEP, INPUT_CHANNELS, PROB_LEN};

/// One training position extracted from a game: the most recent occupancy
/// snapshots for both colors, the policy target, and the outcome seen from
/// the player to move.
pub struct EncodedPosition {
    history: Vec<u8>,
    probabilities: Vec<f32>,
    black_to_move: bool,
    result: i8,
}

impl EncodedPosition {
    /// The stored history planes: `HISTORY_STEP` planes for the player to
    /// move followed by `HISTORY_STEP` planes for the opponent, most recent
    /// snapshot first, one 0/1 cell per point.
    pub fn history(&self) -> &[u8] {
        &self.history
    }

    pub fn history_plane(&self, plane: usize) -> &[u8] {
        &self.history[plane * BOARD_SQ..(plane + 1) * BOARD_SQ]
    }

    pub fn probabilities(&self) -> &[f32] {
        &self.probabilities
    }

    pub fn black_to_move(&self) -> bool {
        self.black_to_move
    }

    /// Game outcome from the perspective of the player to move.
    pub fn result(&self) -> i8 {
        self.result
    }

    /// Full network input: the history planes followed by the two constant
    /// color-to-move planes.
    pub fn input_planes(&self) -> Vec<u8> {
        let mut input = Vec::with_capacity(INPUT_CHANNELS * BOARD_SQ);
        input.extend_from_slice(&self.history);

        let (black_plane, white_plane) = if self.black_to_move { (1, 0) } else { (0, 1) };
        input.extend(std::iter::repeat(black_plane).take(BOARD_SQ));
        input.extend(std::iter::repeat(white_plane).take(BOARD_SQ));

        input
    }
}

/// Replays a game up to `index` and encodes the position the player to move
/// is facing there. Pure function of the game and index; the game record is
/// never mutated and may back any number of encodes concurrently.
pub fn encode_position(game: &ParsedGame, index: usize) -> EncodedPosition {
    let steps = game.steps();
    assert!(
        index < steps.len(),
        "step index {} out of range ({} steps)",
        index,
        steps.len()
    );

    // Black plays ply 0 and the colors alternate strictly, passes included
    let black_to_move = index % 2 == 0;

    let mut blacks = [0u8; BOARD_SQ];
    let mut whites = [0u8; BOARD_SQ];
    let mut history = vec![0u8; 2 * HISTORY_STEP * BOARD_SQ];

    let mut black_plays = true;
    for (ply, step) in steps[..index].iter().enumerate() {
        if !step.is_pass() {
            let mover = if black_plays { &mut blacks } else { &mut whites };
            mover[step.position as usize] = 1;
        }

        // the record does not say which color a capture took off the board
        for &rm in &step.removed {
            blacks[rm as usize] = 0;
            whites[rm as usize] = 0;
        }

        let h = index - ply - 1;
        if h < HISTORY_STEP {
            let (mine, theirs) = if black_to_move {
                (&blacks, &whites)
            } else {
                (&whites, &blacks)
            };
            history[h * BOARD_SQ..(h + 1) * BOARD_SQ].copy_from_slice(mine);
            history[(HISTORY_STEP + h) * BOARD_SQ..(HISTORY_STEP + h + 1) * BOARD_SQ]
                .copy_from_slice(theirs);
        }

        black_plays = !black_plays;
    }

    let step = &steps[index];
    let probabilities = if step.probabilities.is_empty() {
        let mut one_hot = vec![0f32; PROB_LEN];
        one_hot[step.position as usize] = 1.0;
        one_hot
    } else {
        step.probabilities.clone()
    };

    let result = if black_to_move {
        game.result()
    } else {
        -game.result()
    };

    EncodedPosition {
        history,
        probabilities,
        black_to_move,
        result,
    }
}
