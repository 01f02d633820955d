//! Random automorphisms of free groups (Nielsen moves + replay tokens).
//!
//! Purpose
//! - Provide reproducible test and benchmark inputs: automorphisms of `F_n`
//!   represented as graph maps on the rose with `n` petals.
//!
//! Model
//! - Start from the identity and apply `moves` elementary Nielsen moves,
//!   each acting on the generator images: right or left multiplication by
//!   another image or its inverse, inversion of one image, transposition of
//!   two images. Moves that would push an image above `max_len` letters are
//!   rejected and redrawn.
//! - Determinism uses a replay token `(seed, index)` mixed into a single RNG.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::graph_map::GraphMap;
use crate::word::{self, Word};

/// Sampler configuration.
#[derive(Clone, Copy, Debug)]
pub struct RandomCfg {
    pub rank: usize,
    /// Number of accepted Nielsen moves.
    pub moves: usize,
    /// Longest image a move may produce.
    pub max_len: usize,
}
impl Default for RandomCfg {
    fn default() -> Self {
        Self {
            rank: 3,
            moves: 12,
            max_len: 64,
        }
    }
}

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}
impl ReplayToken {
    #[inline]
    fn to_std_rng(self) -> StdRng {
        // SplitMix64 finalizer.
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

#[derive(Clone, Copy, Debug)]
enum NielsenMove {
    /// `x_i -> x_i x_j^±`
    Right { i: usize, j: usize, inv: bool },
    /// `x_i -> x_j^± x_i`
    Left { i: usize, j: usize, inv: bool },
    Invert { i: usize },
    Swap { i: usize, j: usize },
}

impl NielsenMove {
    fn sample<R: Rng>(rank: usize, rng: &mut R) -> Self {
        let i = rng.gen_range(0..rank);
        if rank == 1 {
            return NielsenMove::Invert { i };
        }
        // j != i
        let j = (i + rng.gen_range(1..rank)) % rank;
        let inv = rng.gen::<bool>();
        match rng.gen_range(0..8) {
            0..=2 => NielsenMove::Right { i, j, inv },
            3..=5 => NielsenMove::Left { i, j, inv },
            6 => NielsenMove::Invert { i },
            _ => NielsenMove::Swap { i, j },
        }
    }

    /// New images, or `None` if some image would exceed `max_len`.
    fn apply(self, im: &[Word], max_len: usize) -> Option<Vec<Word>> {
        let signed = |j: usize, inv: bool| {
            if inv {
                word::reverse(&im[j])
            } else {
                im[j].clone()
            }
        };
        let mut out = im.to_vec();
        match self {
            NielsenMove::Right { i, j, inv } => {
                let mut w = im[i].clone();
                w.extend(signed(j, inv));
                out[i] = word::tighten(&w);
            }
            NielsenMove::Left { i, j, inv } => {
                let mut w = signed(j, inv);
                w.extend_from_slice(&im[i]);
                out[i] = word::tighten(&w);
            }
            NielsenMove::Invert { i } => out[i] = word::reverse(&im[i]),
            NielsenMove::Swap { i, j } => out.swap(i, j),
        }
        out.iter().all(|w| w.len() <= max_len).then_some(out)
    }
}

/// Draw a random automorphism of the free group of rank `cfg.rank`.
pub fn random_automorphism(cfg: RandomCfg, tok: ReplayToken) -> Result<GraphMap> {
    let mut g = GraphMap::identity_rose(cfg.rank)?;
    if cfg.rank == 0 {
        return Ok(g);
    }
    let mut rng = tok.to_std_rng();
    let mut im: Vec<Word> = (0..cfg.rank).map(|i| g.image(i).to_vec()).collect();
    let max_len = cfg.max_len.max(1);
    let mut accepted = 0;
    // a rejected move is redrawn, up to 16 draws per requested move
    let mut tries = 0;
    while accepted < cfg.moves && tries < 16 * cfg.moves {
        tries += 1;
        if let Some(next) = NielsenMove::sample(cfg.rank, &mut rng).apply(&im, max_len) {
            im = next;
            accepted += 1;
        }
    }
    for (i, w) in im.into_iter().enumerate() {
        g.set_image(i, w)?;
    }
    g.set_label(format!("random_r{}_s{}_i{}", cfg.rank, tok.seed, tok.index));
    Ok(g)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn draw(rank: usize, moves: usize, seed: u64, index: u64) -> GraphMap {
        let cfg = RandomCfg {
            rank,
            moves,
            max_len: 24,
        };
        random_automorphism(cfg, ReplayToken { seed, index }).unwrap()
    }

    #[test]
    fn reproducible_draw() {
        let g1 = draw(3, 10, 42, 7);
        let g2 = draw(3, 10, 42, 7);
        assert_eq!(g1, g2);
        assert_eq!(g1.label(), "random_r3_s42_i7");
        // some other index differs
        assert!((0..8).any(|k| draw(3, 10, 42, k) != g1));
    }

    #[test]
    fn draws_are_automorphisms_within_length_cap() {
        for index in 0..10 {
            let g = draw(3, 15, 5, index);
            assert!(g.is_good_map());
            assert!((0..3).all(|i| g.image(i).len() <= 24));
            assert!(g.is_automorphism().unwrap());
        }
    }

    #[test]
    fn degenerate_ranks() {
        let g = draw(0, 5, 1, 1);
        assert_eq!(g.edges(), 0);
        let g = draw(1, 5, 1, 1);
        assert_eq!(g.edges(), 1);
        assert_eq!(g.image(0).len(), 1);
        let g = draw(2, 0, 1, 1);
        assert_eq!(g, GraphMap::identity_rose(2).unwrap());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn inverse_composes_to_identity(seed in any::<u64>(), rank in 1usize..4) {
            let g = draw(rank, 8, seed, 0);
            let mut inv = g.clone();
            prop_assert!(inv.invert().unwrap());
            let id = GraphMap::identity_rose(rank).unwrap();
            let mut left = g.clone();
            left.compose(&inv).unwrap();
            prop_assert_eq!(&left, &id);
            let mut right = inv.clone();
            right.compose(&g).unwrap();
            prop_assert_eq!(&right, &id);
        }

        #[test]
        fn composition_is_associative(seed in any::<u64>()) {
            let f = draw(3, 6, seed, 0);
            let g = draw(3, 6, seed, 1);
            let h = draw(3, 6, seed, 2);
            let mut left = f.clone();
            left.compose(&g).unwrap();
            left.compose(&h).unwrap();
            let mut gh = g.clone();
            gh.compose(&h).unwrap();
            let mut right = f.clone();
            right.compose(&gh).unwrap();
            prop_assert_eq!(left, right);
        }

        #[test]
        fn serialization_round_trip(seed in any::<u64>(), rank in 0usize..5) {
            let g = draw(rank, 10, seed, 3);
            let text = g.to_string();
            let h: GraphMap = text.parse().unwrap();
            prop_assert_eq!(&h, &g);
            prop_assert_eq!(h.label(), g.label());
        }
    }
}
