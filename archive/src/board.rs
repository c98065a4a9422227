use once_cell::sync::Lazy;
use thiserror::Error;

use common::{BOARD_SIZE, BOARD_SQ, PASS_MOVE};

static NEIGHBORS: Lazy<Vec<Vec<u16>>> = Lazy::new(|| {
    (0..BOARD_SQ)
        .map(|pos| {
            let x = pos % BOARD_SIZE;
            let y = pos / BOARD_SIZE;

            let mut neighbors = Vec::with_capacity(4);
            if y > 0 {
                neighbors.push((pos - BOARD_SIZE) as u16);
            }
            if y < BOARD_SIZE - 1 {
                neighbors.push((pos + BOARD_SIZE) as u16);
            }
            if x > 0 {
                neighbors.push((pos - 1) as u16);
            }
            if x < BOARD_SIZE - 1 {
                neighbors.push((pos + 1) as u16);
            }
            neighbors
        })
        .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    fn sign(self) -> i8 {
        match self {
            Color::Black => 1,
            Color::White => -1,
        }
    }
}

#[derive(Debug, Error)]
#[error("point {pos} is not playable")]
pub struct IllegalMove {
    pub pos: usize,
}

/// Board state with enough group bookkeeping to derive captures: per-point
/// stone color, group ids, group liberty counts, and a circular next-stone
/// link threading each group. Used by the archive writer; the read path never
/// recomputes captures.
pub struct GoBoard {
    stones: [i8; BOARD_SQ],
    group_ids: [u16; BOARD_SQ],
    group_libs: [i16; BOARD_SQ],
    stone_next: [u16; BOARD_SQ],
}

// Tracks which neighboring groups were already visited while scanning the up
// to four neighbors of one point.
#[derive(Default)]
struct NeighborVisitor {
    seen: [u16; 4],
    count: usize,
}

impl NeighborVisitor {
    fn visited(&mut self, group: u16) -> bool {
        if self.seen[..self.count].contains(&group) {
            return true;
        }
        self.seen[self.count] = group;
        self.count += 1;
        false
    }
}

impl GoBoard {
    pub fn new() -> Self {
        Self {
            stones: [0; BOARD_SQ],
            group_ids: [0; BOARD_SQ],
            group_libs: [0; BOARD_SQ],
            stone_next: [0; BOARD_SQ],
        }
    }

    pub fn reset(&mut self) {
        self.stones = [0; BOARD_SQ];
    }

    /// Signed occupancy of one point: +1 Black, -1 White, 0 empty.
    pub fn stone(&self, pos: usize) -> i8 {
        self.stones[pos]
    }

    /// Places a stone and returns the coordinates vacated by the move, in
    /// removal order. A pass changes nothing. A group that loses its last
    /// liberty comes off the board, the mover's own group included (suicide).
    /// Fails when the point is out of range or already occupied.
    pub fn play(&mut self, color: Color, pos: usize) -> Result<Vec<u16>, IllegalMove> {
        if pos > PASS_MOVE {
            return Err(IllegalMove { pos });
        }
        if pos == PASS_MOVE {
            return Ok(Vec::new());
        }
        if self.stones[pos] != 0 {
            return Err(IllegalMove { pos });
        }

        let sign = color.sign();
        self.stones[pos] = sign;
        self.stone_next[pos] = pos as u16;
        self.group_ids[pos] = pos as u16;

        let mut libs = 0;
        let mut visitor = NeighborVisitor::default();
        for &ai in NEIGHBORS[pos].iter() {
            let ai = ai as usize;
            if self.stones[ai] == 0 {
                libs += 1;
            } else {
                let group = self.group_ids[ai];
                if !visitor.visited(group) {
                    self.group_libs[group as usize] -= 1;
                }
            }
        }
        self.group_libs[pos] = libs;

        let mut removed = Vec::new();
        for &ai in NEIGHBORS[pos].iter() {
            let ai = ai as usize;
            if self.stones[ai] == -sign {
                let group = self.group_ids[ai] as usize;
                if self.group_libs[group] == 0 {
                    self.remove_string(ai, &mut removed);
                }
            } else if self.stones[ai] == sign {
                let own_group = self.group_ids[pos];
                let neighbor_group = self.group_ids[ai];
                if own_group != neighbor_group {
                    self.merge_strings(neighbor_group as usize, own_group as usize);
                }
            }
        }

        if self.group_libs[self.group_ids[pos] as usize] == 0 {
            self.remove_string(pos, &mut removed);
        }

        Ok(removed)
    }

    // Takes a whole string off the board, crediting a liberty back to each
    // distinct group adjacent to every removed stone.
    fn remove_string(&mut self, origin: usize, removed: &mut Vec<u16>) {
        let mut pos = origin;
        loop {
            self.stones[pos] = 0;
            removed.push(pos as u16);

            let mut visitor = NeighborVisitor::default();
            for &ai in NEIGHBORS[pos].iter() {
                let ai = ai as usize;
                if self.stones[ai] == 0 {
                    continue;
                }
                let group = self.group_ids[ai];
                if !visitor.visited(group) {
                    self.group_libs[group as usize] += 1;
                }
            }

            pos = self.stone_next[pos] as usize;
            if pos == origin {
                break;
            }
        }
    }

    // Absorbs one string into another: liberties of the absorbed string not
    // already shared with the target are credited to the target, ids are
    // rewritten, and the circular stone links are spliced.
    fn merge_strings(&mut self, target: usize, absorbed: usize) {
        let mut pos = absorbed;
        loop {
            for &ai in NEIGHBORS[pos].iter() {
                let ai = ai as usize;
                if self.stones[ai] != 0 {
                    continue;
                }

                let mut shared = false;
                for &aai in NEIGHBORS[ai].iter() {
                    let aai = aai as usize;
                    if self.stones[aai] != 0 && self.group_ids[aai] as usize == target {
                        shared = true;
                        break;
                    }
                }

                if !shared {
                    self.group_libs[target] += 1;
                }
            }

            self.group_ids[pos] = target as u16;
            pos = self.stone_next[pos] as usize;
            if pos == absorbed {
                break;
            }
        }

        self.stone_next.swap(target, absorbed);
    }
}

impl Default for GoBoard {
    fn default() -> Self {
        Self::new()
    }
}
