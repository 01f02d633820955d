//! Engine state, configuration, and the event/outcome vocabulary.

use crate::error::Result;
use crate::graph_map::GraphMap;
use crate::matrix::{EigenCfg, IntMatrix};

/// Engine configuration.
#[derive(Clone, Copy, Debug)]
pub struct TrainCfg {
    /// Cap on split-and-fold rounds; `None` runs to completion.
    pub max_iterations: Option<usize>,
    pub eigen: EigenCfg,
}

impl Default for TrainCfg {
    fn default() -> Self {
        Self {
            max_iterations: None,
            eigen: EigenCfg::default(),
        }
    }
}

/// Progress notifications emitted by `TrainTrack::run`.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    NewComputation,
    /// Current growth-rate estimate after a split-and-fold round.
    Progress(f64),
    Success,
    Failure,
    /// The graph map was mutated.
    Change,
    Stopped,
    /// An error is about to be returned.
    Fault(String),
}

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Outcome {
    /// Irreducible matrix and no illegal turn.
    TrainTrack { growth_rate: f64 },
    /// The transition matrix became reducible.
    Reducible,
    /// Stop flag raised or iteration cap reached.
    Stopped,
}

impl Outcome {
    pub fn is_train_track(&self) -> bool {
        matches!(self, Outcome::TrainTrack { .. })
    }
}

/// The train-track engine: owns one graph map and rewrites it in place.
#[derive(Clone, Debug)]
pub struct TrainTrack {
    pub(crate) g: GraphMap,
    pub(crate) cfg: TrainCfg,
}

impl TrainTrack {
    pub fn new(g: GraphMap) -> Self {
        Self::with_cfg(g, TrainCfg::default())
    }

    pub fn with_cfg(g: GraphMap, cfg: TrainCfg) -> Self {
        Self { g, cfg }
    }

    #[inline]
    pub fn graph(&self) -> &GraphMap {
        &self.g
    }

    pub fn into_graph(self) -> GraphMap {
        self.g
    }

    #[inline]
    pub fn cfg(&self) -> TrainCfg {
        self.cfg
    }

    pub fn transition_matrix(&self) -> IntMatrix {
        self.g.transition_matrix()
    }

    pub fn is_irreducible(&self) -> bool {
        self.transition_matrix().is_irreducible()
    }

    /// Spectral radius of the current transition matrix.
    pub fn growth_rate(&self) -> Result<f64> {
        self.transition_matrix().growth_rate()
    }

    /// Reduced characteristic polynomial of the current transition matrix.
    pub fn char_poly(&self) -> Result<Vec<i64>> {
        self.transition_matrix().reduced_char_poly(self.cfg.eigen)
    }

    /// Coordinate of an oriented edge in the `2E × 2E` turn space.
    #[inline]
    pub(crate) fn coord(&self, c: crate::word::Letter) -> usize {
        if c.is_inverse() {
            self.g.edges() + c.index()
        } else {
            c.index()
        }
    }
}
