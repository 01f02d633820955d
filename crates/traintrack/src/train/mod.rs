//! Train-track engine.
//!
//! Purpose
//! - Turn a graph map representing an outer automorphism into an efficient
//!   (train track) representative, or detect that its transition matrix is
//!   reducible.
//!
//! Notes
//! - All work happens in place on the owned `GraphMap`; clone first if the
//!   input must survive a failing run.
//! - Single-threaded. Cancellation is cooperative and only observed between
//!   split-and-fold rounds.
//!
//! References
//! - M. Bestvina, M. Handel, "Train tracks and automorphisms of free
//!   groups", Annals of Math. 135 (1992).
//! - M. Bestvina, M. Handel, "Train-tracks for surface homeomorphisms",
//!   Topology 34 (1995).

mod cleanup;
mod engine;
mod fold;
mod gates;
mod turns;
mod types;

pub use gates::Gates;
pub use turns::IllegalTurn;
pub use types::{Event, Outcome, TrainCfg, TrainTrack};
