//! Curated surface for the command-line driver and benchmarks.
//!
//! Notes
//! - Unstable; names follow the modules they come from except where two
//!   modules would clash.

// Words and graph maps
pub use crate::graph_map::{GraphMap, MarkedLoop, SpanningTree};
pub use crate::word::{label as edge_label, parse_path, path_to_string, Letter, Word, MAX_INDEX};
// Matrices
pub use crate::matrix::{poly_string, EigenCfg, IntMatrix};
// Engine
pub use crate::train::{Event, Gates, IllegalTurn, Outcome, TrainCfg, TrainTrack};
// Random inputs
pub use crate::rand::{random_automorphism, RandomCfg, ReplayToken as RandomReplay};

/// Parse a map, run the engine to completion, and return the final state.
pub fn train_from_text(text: &str, cfg: TrainCfg) -> crate::Result<(TrainTrack, Outcome)> {
    let g = GraphMap::parse(text)?;
    let mut t = TrainTrack::with_cfg(g, cfg);
    let out = t.run(|_| {}, None)?;
    Ok((t, out))
}
