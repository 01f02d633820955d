//! Illegal turns.
//!
//! A turn `{a, b}` is illegal when iterating the derivative `D` on both ends
//! in lock-step eventually makes them coincide. The iteration lives in the
//! finite turn space of `2E × 2E` pairs, so a revisited pair proves the turn
//! legal.

use super::TrainTrack;
use crate::word::Letter;

/// Position of an illegal turn inside an edge image: the turn is formed by
/// `im[edge][pos]⁻¹` and `im[edge][pos + 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IllegalTurn {
    pub edge: usize,
    pub pos: usize,
    /// Number of `D` iterations (counting the turn itself) until the ends
    /// coincide.
    pub depth: usize,
}

impl TrainTrack {
    /// Depth at which `D^k(a) == D^k(b)` first holds, starting from 1 for
    /// `a == b`; 0 if the turn is legal. Empty images make a turn legal.
    pub fn is_illegal(&self, a: Letter, b: Letter) -> usize {
        let ne = self.g.edges();
        if a.index() >= ne || b.index() >= ne {
            return 0;
        }
        let dim = 2 * ne;
        let mut seen = vec![false; dim * dim];
        let (mut a, mut b) = (a, b);
        let mut depth = 1;
        loop {
            if a == b {
                return depth;
            }
            let (x, y) = (self.coord(a), self.coord(b));
            if seen[x * dim + y] {
                return 0;
            }
            seen[x * dim + y] = true;
            seen[y * dim + x] = true;
            match (self.g.derivative(a), self.g.derivative(b)) {
                (Some(da), Some(db)) => {
                    a = da;
                    b = db;
                }
                _ => return 0,
            }
            depth += 1;
        }
    }

    /// Illegal turn of minimal depth among all turns taken by edge images.
    pub fn find_illegal_turn(&self) -> Option<IllegalTurn> {
        let ne = self.g.edges();
        let mut bound = 8 * ne * ne;
        let mut best = None;
        for i in 0..ne {
            for (pos, pair) in self.g.image(i).windows(2).enumerate() {
                let d = self.is_illegal(pair[0].inverse(), pair[1]);
                if d > 0 && d < bound {
                    bound = d;
                    best = Some(IllegalTurn {
                        edge: i,
                        pos,
                        depth: d,
                    });
                }
            }
        }
        best
    }

    /// No edge image takes an illegal turn.
    pub fn is_train_track(&self) -> bool {
        self.find_illegal_turn().is_none()
    }
}
