use archive::{ArchiveWriter, Framing, GameArchive};
use assert_approx_eq::assert_approx_eq;
use common::{BOARD_SIZE, HISTORY_STEP, PASS_MOVE, PROB_LEN};
use replay::{
    apply_to_probabilities, encode_position, PackedSample, ScoreArchive, SYMMETRY_COUNT,
};

// A short real game: Black captures the white corner stone on ply 2, then
// both sides keep playing.
fn archive_bytes(framing: Framing) -> Vec<u8> {
    let mut writer = ArchiveWriter::create(Vec::new(), framing).unwrap();

    writer.start_game();
    writer.add_move(1, &[], true);
    writer.add_move(0, &[], true);
    writer.add_move(BOARD_SIZE, &[], true);
    writer.add_move(60, &[], false);

    let mut probs = vec![0f32; PROB_LEN];
    probs[100] = 0.7;
    probs[PASS_MOVE] = 0.3;
    writer.add_move(100, &probs, true);
    writer.end_game(1).unwrap();

    writer.finish().unwrap()
}

#[test]
fn encode_positions_from_both_framings() {
    for framing in [Framing::Stream, Framing::LengthPrefixed] {
        let archive = GameArchive::from_bytes(&archive_bytes(framing), framing).unwrap();
        let game = archive.games()[0].parsed().unwrap();

        // ply 2 captured the white stone at the corner
        assert_eq!(game.steps()[2].removed, vec![0]);

        // at ply 3 White is to move and sees the post-capture board
        let position = encode_position(game, 3);
        assert!(!position.black_to_move());
        assert_eq!(position.result(), -1);
        assert_eq!(position.history_plane(0)[0], 0);
        assert_eq!(position.history_plane(HISTORY_STEP)[1], 1);
        assert_eq!(position.history_plane(HISTORY_STEP)[BOARD_SIZE], 1);
    }
}

#[test]
fn sample_positions_skip_unsampled_steps() {
    let framing = Framing::LengthPrefixed;
    let archive = GameArchive::from_bytes(&archive_bytes(framing), framing).unwrap();

    let entries = archive.sample_positions();

    assert_eq!(entries, vec![(0, 0), (0, 1), (0, 2), (0, 4)]);
}

#[test]
fn packed_samples_survive_augmentation_round_trip() {
    let framing = Framing::Stream;
    let archive = GameArchive::from_bytes(&archive_bytes(framing), framing).unwrap();
    let game = archive.games()[0].parsed().unwrap();

    let samples: Vec<PackedSample> = archive
        .sample_positions()
        .into_iter()
        .map(|(game_index, step_index)| {
            assert_eq!(game_index, 0);
            PackedSample::from_position(&encode_position(game, step_index))
        })
        .collect();

    let mut bytes = Vec::new();
    ScoreArchive::write_to(&mut bytes, &samples).unwrap();
    let restored = ScoreArchive::from_bytes(&bytes).unwrap();
    assert_eq!(restored.samples(), &samples[..]);

    // augmenting by a symmetry and its inverse restores every record
    const INVERSE: [usize; SYMMETRY_COUNT] = [0, 1, 2, 3, 4, 6, 5, 7];
    for sample in restored.samples() {
        for sym in 0..SYMMETRY_COUNT {
            let augmented = sample.apply_symmetry(sym);
            assert_eq!(augmented.apply_symmetry(INVERSE[sym]), *sample);
            assert_eq!(augmented.player_is_white(), sample.player_is_white());
            assert_eq!(augmented.result(), sample.result());
        }
    }
}

#[test]
fn probability_targets_follow_the_board_symmetry() {
    let framing = Framing::Stream;
    let archive = GameArchive::from_bytes(&archive_bytes(framing), framing).unwrap();
    let game = archive.games()[0].parsed().unwrap();

    // the recorded distribution survives the writer and parser
    let position = encode_position(game, 4);
    assert_approx_eq!(position.probabilities()[100], 0.7);
    assert_approx_eq!(position.probabilities()[PASS_MOVE], 0.3);

    for sym in 0..SYMMETRY_COUNT {
        let mapped = apply_to_probabilities(sym, position.probabilities());

        assert_approx_eq!(mapped.iter().sum::<f32>(), 1.0);
        assert_approx_eq!(mapped[PASS_MOVE], 0.3);
        assert_eq!(mapped.iter().filter(|&&p| p != 0.0).count(), 2);
    }
}
