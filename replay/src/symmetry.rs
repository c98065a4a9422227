use once_cell::sync::Lazy;
use rand::Rng;

use common::{BOARD_SIZE, BOARD_SQ, HISTORY_STEP, PROB_LEN};

/// Size of the board's symmetry group: four rotations, each with an optional
/// reflection.
pub const SYMMETRY_COUNT: usize = 8;

/// Remaps a board coordinate under one of the eight dihedral symmetries.
/// Index >= 4 transposes first; the two low bits then select the x and y
/// reflections.
pub fn remap_vertex(vertex: usize, symmetry: usize) -> usize {
    assert!(vertex < BOARD_SQ);
    assert!(symmetry < SYMMETRY_COUNT);

    let mut x = vertex % BOARD_SIZE;
    let mut y = vertex / BOARD_SIZE;
    let mut symmetry = symmetry;

    if symmetry >= 4 {
        std::mem::swap(&mut x, &mut y);
        symmetry -= 4;
    }
    if symmetry == 1 || symmetry == 3 {
        x = BOARD_SIZE - x - 1;
    }
    if symmetry == 2 || symmetry == 3 {
        y = BOARD_SIZE - y - 1;
    }

    y * BOARD_SIZE + x
}

struct SymmetryTables {
    prob: Vec<Vec<usize>>,
    full: Vec<Vec<usize>>,
}

// Built once per process, then shared read-only by every worker.
static TABLES: Lazy<SymmetryTables> = Lazy::new(build_tables);

fn build_tables() -> SymmetryTables {
    let prob = (0..SYMMETRY_COUNT)
        .map(|sym| {
            (0..BOARD_SQ)
                .map(|vertex| remap_vertex(vertex, sym))
                .chain([BOARD_SQ])
                .collect()
        })
        .collect();

    let full = (0..SYMMETRY_COUNT)
        .map(|sym| {
            (0..2 * HISTORY_STEP)
                .flat_map(|plane| {
                    (0..BOARD_SQ).map(move |vertex| remap_vertex(vertex, sym) + plane * BOARD_SQ)
                })
                .collect()
        })
        .collect();

    SymmetryTables { prob, full }
}

/// Gather table over a probability vector; the trailing pass entry maps to
/// itself.
pub fn prob_table(symmetry: usize) -> &'static [usize] {
    &TABLES.prob[symmetry]
}

/// Gather table over a flattened stack of history planes; every plane is
/// remapped in place, plane order unchanged.
pub fn full_table(symmetry: usize) -> &'static [usize] {
    &TABLES.full[symmetry]
}

/// Applies a symmetry to a probability vector, producing a fresh buffer.
pub fn apply_to_probabilities(symmetry: usize, probs: &[f32]) -> Vec<f32> {
    assert_eq!(probs.len(), PROB_LEN);
    prob_table(symmetry).iter().map(|&i| probs[i]).collect()
}

/// Applies a symmetry to a flattened stack of unpacked history planes,
/// producing a fresh buffer.
pub fn apply_to_planes(symmetry: usize, planes: &[u8]) -> Vec<u8> {
    assert_eq!(planes.len(), 2 * HISTORY_STEP * BOARD_SQ);
    full_table(symmetry).iter().map(|&i| planes[i]).collect()
}

/// Uniformly chosen symmetry index, used to pick the augmentation applied to
/// each sample.
pub fn random_symmetry<R: Rng>(rng: &mut R) -> usize {
    rng.gen_range(0..SYMMETRY_COUNT)
}

#[cfg(test)]
mod tests {
    use super::*;

    // each symmetry's inverse within the group
    const INVERSE: [usize; SYMMETRY_COUNT] = [0, 1, 2, 3, 4, 6, 5, 7];

    #[test]
    fn test_remap_is_a_bijection_for_every_symmetry() {
        for sym in 0..SYMMETRY_COUNT {
            let mut seen = [false; BOARD_SQ];
            for vertex in 0..BOARD_SQ {
                let mapped = remap_vertex(vertex, sym);
                assert!(!seen[mapped], "symmetry {} collides at {}", sym, mapped);
                seen[mapped] = true;
            }
            assert!(seen.iter().all(|&s| s));
        }
    }

    #[test]
    fn test_symmetry_zero_is_identity() {
        for vertex in 0..BOARD_SQ {
            assert_eq!(remap_vertex(vertex, 0), vertex);
        }
    }

    #[test]
    fn test_known_remaps() {
        // vertex 0 is the (0, 0) corner
        assert_eq!(remap_vertex(0, 1), BOARD_SIZE - 1);
        assert_eq!(remap_vertex(0, 2), (BOARD_SIZE - 1) * BOARD_SIZE);
        assert_eq!(remap_vertex(0, 3), BOARD_SQ - 1);
        // transposition swaps the (1, 0) and (0, 1) points
        assert_eq!(remap_vertex(1, 4), BOARD_SIZE);
        assert_eq!(remap_vertex(BOARD_SIZE, 4), 1);
    }

    #[test]
    fn test_inverse_round_trips_vertices() {
        for sym in 0..SYMMETRY_COUNT {
            for vertex in 0..BOARD_SQ {
                assert_eq!(remap_vertex(remap_vertex(vertex, sym), INVERSE[sym]), vertex);
            }
        }
    }

    #[test]
    fn test_prob_table_keeps_pass_fixed() {
        for sym in 0..SYMMETRY_COUNT {
            assert_eq!(prob_table(sym)[BOARD_SQ], BOARD_SQ);
        }
    }

    #[test]
    fn test_apply_to_probabilities_round_trip() {
        let probs: Vec<f32> = (0..PROB_LEN).map(|i| i as f32).collect();

        for sym in 0..SYMMETRY_COUNT {
            let mapped = apply_to_probabilities(sym, &probs);
            let restored = apply_to_probabilities(INVERSE[sym], &mapped);
            assert_eq!(restored, probs, "symmetry {} round trip", sym);
        }
    }

    #[test]
    fn test_apply_to_planes_round_trip() {
        let planes: Vec<u8> = (0..2 * HISTORY_STEP * BOARD_SQ)
            .map(|i| (i % 251) as u8)
            .collect();

        for sym in 0..SYMMETRY_COUNT {
            let mapped = apply_to_planes(sym, &planes);
            let restored = apply_to_planes(INVERSE[sym], &mapped);
            assert_eq!(restored, planes, "symmetry {} round trip", sym);
        }
    }

    #[test]
    fn test_apply_to_planes_remaps_each_plane_independently() {
        let mut planes = vec![0u8; 2 * HISTORY_STEP * BOARD_SQ];
        // mark vertex 0 in plane 0 and vertex 1 in plane 3
        planes[0] = 1;
        planes[3 * BOARD_SQ + 1] = 1;

        let mapped = apply_to_planes(1, &planes);

        // horizontal reflection within each plane, no cross-plane movement
        assert_eq!(mapped[BOARD_SIZE - 1], 1);
        assert_eq!(mapped[3 * BOARD_SQ + BOARD_SIZE - 2], 1);
        assert_eq!(mapped.iter().filter(|&&c| c != 0).count(), 2);
    }

    #[test]
    fn test_random_symmetry_is_in_range() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            assert!(random_symmetry(&mut rng) < SYMMETRY_COUNT);
        }
    }
}
