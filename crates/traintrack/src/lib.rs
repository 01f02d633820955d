//! Train tracks for outer automorphisms of free groups.
//!
//! An automorphism is a self-map of a finite graph (`GraphMap`). The engine
//! (`train::TrainTrack`) splits, folds, and collapses until no illegal turn
//! remains, or until the transition matrix turns out to be reducible.
//!
//! Layout
//! - `word`: edge letters, paths, and their text form.
//! - `graph_map`: graphs with maps, surgery, composition, inversion, text I/O.
//! - `matrix`: transition matrices and their eigen data.
//! - `train`: the Bestvina–Handel loop and gates.
//! - `rand`: reproducible random automorphisms.

pub mod api;
pub mod error;
pub mod graph_map;
pub mod matrix;
pub mod rand;
pub mod train;
pub mod word;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{ErrorKind, GraphError, Result};
pub use graph_map::GraphMap;
pub use train::{Outcome, TrainTrack};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::error::{ErrorKind, GraphError};
    pub use crate::graph_map::{GraphMap, MarkedLoop};
    pub use crate::matrix::{poly_string, EigenCfg, IntMatrix};
    pub use crate::rand::{random_automorphism, RandomCfg, ReplayToken};
    pub use crate::train::{Event, Gates, Outcome, TrainCfg, TrainTrack};
    pub use crate::word::{parse_path, path_to_string, Letter, Word};
}
