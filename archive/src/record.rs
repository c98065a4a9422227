use once_cell::sync::OnceCell;
use serde::Serialize;

use common::{BOARD_SQ, PROB_LEN};

use crate::cursor::Cursor;
use crate::error::DecodeError;

pub const STEP_HAS_REMOVES: u16 = 0x8000;
pub const STEP_HAS_PROBS: u16 = 0x4000;
pub const STEP_NOT_SAMPLED: u16 = 0x2000;
pub const STEP_POS_MASK: u16 = 0x01FF;

/// One recorded ply. `position` equal to the number of board points is a
/// pass. `removed` lists the coordinates vacated by the move, in removal
/// order. `probabilities` is either empty or a full search distribution of
/// one value per point plus the pass entry. Steps with `is_valid` unset are
/// excluded from sample selection but still affect board replay.
#[derive(Debug, Clone, Serialize)]
pub struct Step {
    pub position: u16,
    pub removed: Vec<u16>,
    pub probabilities: Vec<f32>,
    pub is_valid: bool,
}

impl Step {
    pub fn is_pass(&self) -> bool {
        self.position as usize == BOARD_SQ
    }
}

/// The decoded form of one game: final result from Black's perspective, the
/// ordered ply list, and the indices of plies eligible for sampling.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedGame {
    result: i8,
    steps: Vec<Step>,
    valid_indices: Vec<usize>,
}

impl ParsedGame {
    /// Decodes one game payload: result byte, step count, then per step a
    /// move word followed by its optional capture list and probability block.
    /// Pure function of the input bytes; a failure leaves no partial game.
    pub fn decode(cursor: &mut Cursor) -> Result<Self, DecodeError> {
        let result = cursor.read_i8()?;
        if !matches!(result, -1 | 0 | 1) {
            return Err(DecodeError::InvalidResult(result));
        }

        let step_count = cursor.read_u16()? as usize;
        let mut steps = Vec::with_capacity(step_count);
        let mut valid_indices = Vec::new();

        for index in 0..step_count {
            let word = cursor.read_u16()?;

            let position = word & STEP_POS_MASK;
            if position as usize > BOARD_SQ {
                return Err(DecodeError::InvalidPosition {
                    pos: position,
                    max: BOARD_SQ,
                });
            }

            let mut removed = Vec::new();
            if word & STEP_HAS_REMOVES != 0 {
                let count = cursor.read_u16()? as usize;
                removed.reserve(count);
                for _ in 0..count {
                    let pos = cursor.read_u16()?;
                    if pos as usize >= BOARD_SQ {
                        return Err(DecodeError::InvalidRemovePosition {
                            pos,
                            max: BOARD_SQ,
                        });
                    }
                    removed.push(pos);
                }
            }

            let probabilities = if word & STEP_HAS_PROBS != 0 {
                cursor.read_f32s(PROB_LEN)?
            } else {
                Vec::new()
            };

            let is_valid = word & STEP_NOT_SAMPLED == 0;
            if is_valid {
                valid_indices.push(index);
            }

            steps.push(Step {
                position,
                removed,
                probabilities,
                is_valid,
            });
        }

        Ok(Self {
            result,
            steps,
            valid_indices,
        })
    }

    /// Builds a game directly from its plies, computing the valid-step list.
    pub fn from_steps(result: i8, steps: Vec<Step>) -> Self {
        let valid_indices = steps
            .iter()
            .enumerate()
            .filter(|(_, step)| step.is_valid)
            .map(|(index, _)| index)
            .collect();

        Self {
            result,
            steps,
            valid_indices,
        }
    }

    pub fn result(&self) -> i8 {
        self.result
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn valid_indices(&self) -> &[usize] {
        &self.valid_indices
    }
}

/// One archived game. Length-prefixed archives hand the raw payload over
/// undecoded; the first access to the decoded form parses it once and caches
/// the result for the record's lifetime, after which the record is safe for
/// unlimited concurrent read-only use.
#[derive(Debug)]
pub struct GameRecord {
    raw: Vec<u8>,
    parsed: OnceCell<ParsedGame>,
}

impl GameRecord {
    pub fn from_raw(raw: Vec<u8>) -> Self {
        Self {
            raw,
            parsed: OnceCell::new(),
        }
    }

    pub fn from_parsed(parsed: ParsedGame) -> Self {
        Self {
            raw: Vec::new(),
            parsed: OnceCell::with_value(parsed),
        }
    }

    pub fn parsed(&self) -> Result<&ParsedGame, DecodeError> {
        self.parsed
            .get_or_try_init(|| ParsedGame::decode(&mut Cursor::new(&self.raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_u16(buf: &mut Vec<u8>, value: u16) {
        buf.extend_from_slice(&value.to_le_bytes());
    }

    fn game_payload(result: i8, words: &[(u16, &[u16], &[f32])]) -> Vec<u8> {
        let mut buf = vec![result as u8];
        push_u16(&mut buf, words.len() as u16);
        for &(word, removes, probs) in words {
            push_u16(&mut buf, word);
            if word & STEP_HAS_REMOVES != 0 {
                push_u16(&mut buf, removes.len() as u16);
                for &rm in removes {
                    push_u16(&mut buf, rm);
                }
            }
            if word & STEP_HAS_PROBS != 0 {
                for &p in probs {
                    buf.extend_from_slice(&p.to_le_bytes());
                }
            }
        }
        buf
    }

    #[test]
    fn test_decode_plain_moves() {
        let payload = game_payload(1, &[(40, &[], &[]), (41, &[], &[])]);

        let game = ParsedGame::decode(&mut Cursor::new(&payload)).unwrap();

        assert_eq!(game.result(), 1);
        assert_eq!(game.steps().len(), 2);
        assert_eq!(game.steps()[0].position, 40);
        assert!(game.steps()[0].removed.is_empty());
        assert!(game.steps()[0].probabilities.is_empty());
        assert!(game.steps()[0].is_valid);
        assert_eq!(game.valid_indices(), &[0, 1]);
    }

    #[test]
    fn test_decode_pass_position_is_legal() {
        let payload = game_payload(0, &[(BOARD_SQ as u16, &[], &[])]);

        let game = ParsedGame::decode(&mut Cursor::new(&payload)).unwrap();

        assert!(game.steps()[0].is_pass());
    }

    #[test]
    fn test_decode_capture_list() {
        let payload = game_payload(-1, &[(41 | STEP_HAS_REMOVES, &[40, 60], &[])]);

        let game = ParsedGame::decode(&mut Cursor::new(&payload)).unwrap();

        assert_eq!(game.steps()[0].removed, vec![40, 60]);
    }

    #[test]
    fn test_decode_probabilities() {
        let mut probs = vec![0f32; PROB_LEN];
        probs[40] = 0.75;
        probs[BOARD_SQ] = 0.25;
        let payload = game_payload(1, &[(40 | STEP_HAS_PROBS, &[], &probs)]);

        let game = ParsedGame::decode(&mut Cursor::new(&payload)).unwrap();

        assert_eq!(game.steps()[0].probabilities.len(), PROB_LEN);
        assert_eq!(game.steps()[0].probabilities[40], 0.75);
        assert_eq!(game.steps()[0].probabilities[BOARD_SQ], 0.25);
    }

    #[test]
    fn test_decode_not_sampled_flag() {
        let payload = game_payload(1, &[(40 | STEP_NOT_SAMPLED, &[], &[]), (41, &[], &[])]);

        let game = ParsedGame::decode(&mut Cursor::new(&payload)).unwrap();

        assert!(!game.steps()[0].is_valid);
        assert_eq!(game.valid_indices(), &[1]);
    }

    #[test]
    fn test_decode_rejects_bad_result() {
        let payload = game_payload(3, &[]);

        let err = ParsedGame::decode(&mut Cursor::new(&payload)).unwrap_err();

        assert!(matches!(err, DecodeError::InvalidResult(3)));
    }

    #[test]
    fn test_decode_rejects_position_beyond_pass() {
        // 400 fits in the 9 bit position field but exceeds the board
        let payload = game_payload(1, &[(400, &[], &[])]);

        let err = ParsedGame::decode(&mut Cursor::new(&payload)).unwrap_err();

        assert!(matches!(err, DecodeError::InvalidPosition { pos: 400, .. }));
    }

    #[test]
    fn test_decode_rejects_pass_as_capture() {
        let payload = game_payload(1, &[(41 | STEP_HAS_REMOVES, &[BOARD_SQ as u16], &[])]);

        let err = ParsedGame::decode(&mut Cursor::new(&payload)).unwrap_err();

        assert!(matches!(err, DecodeError::InvalidRemovePosition { pos, .. } if pos as usize == BOARD_SQ));
    }

    #[test]
    fn test_decode_truncated_steps() {
        let mut payload = vec![1u8];
        push_u16(&mut payload, 3);
        push_u16(&mut payload, 40);

        let err = ParsedGame::decode(&mut Cursor::new(&payload)).unwrap_err();

        assert!(matches!(err, DecodeError::TruncatedInput { .. }));
    }

    #[test]
    fn test_decode_truncated_probabilities() {
        let mut payload = vec![1u8];
        push_u16(&mut payload, 1);
        push_u16(&mut payload, 40 | STEP_HAS_PROBS);
        payload.extend_from_slice(&1.0f32.to_le_bytes());

        let err = ParsedGame::decode(&mut Cursor::new(&payload)).unwrap_err();

        assert!(matches!(err, DecodeError::TruncatedInput { .. }));
    }

    #[test]
    fn test_lazy_parse_is_cached() {
        let payload = game_payload(1, &[(40, &[], &[])]);
        let record = GameRecord::from_raw(payload);

        let first = record.parsed().unwrap();
        let second = record.parsed().unwrap();

        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_lazy_parse_failure_is_repeatable() {
        let record = GameRecord::from_raw(vec![3]);

        assert!(record.parsed().is_err());
        assert!(record.parsed().is_err());
    }

    #[test]
    fn test_from_steps_collects_valid_indices() {
        let steps = vec![
            Step {
                position: 40,
                removed: vec![],
                probabilities: vec![],
                is_valid: false,
            },
            Step {
                position: 41,
                removed: vec![],
                probabilities: vec![],
                is_valid: true,
            },
        ];

        let game = ParsedGame::from_steps(1, steps);

        assert_eq!(game.valid_indices(), &[1]);
    }
}
