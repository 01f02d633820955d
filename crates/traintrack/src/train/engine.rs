//! The outer Bestvina–Handel loop.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use super::{Event, IllegalTurn, Outcome, TrainTrack};
use crate::error::Result;
use crate::word::Letter;

impl TrainTrack {
    /// Rewrite the map until it is a train track or its transition matrix
    /// becomes reducible.
    ///
    /// `on_event` receives `Change` after mutating steps, `NewComputation`
    /// once cleanup is done, `Progress` after each split-and-fold round, and
    /// one terminal event. `stop` is polled between rounds. On error the
    /// graph is left as it was at the failing step and `Fault` is emitted.
    pub fn run(
        &mut self,
        mut on_event: impl FnMut(Event),
        stop: Option<&AtomicBool>,
    ) -> Result<Outcome> {
        match self.run_inner(&mut on_event, stop) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!(error = %e, "train track computation failed");
                on_event(Event::Fault(e.to_string()));
                Err(e)
            }
        }
    }

    /// `run` without events or a stop flag.
    pub fn train_track_map(&mut self) -> Result<Outcome> {
        self.run(|_| {}, None)
    }

    fn run_inner(
        &mut self,
        on_event: &mut dyn FnMut(Event),
        stop: Option<&AtomicBool>,
    ) -> Result<Outcome> {
        on_event(Event::Change);
        self.clean_it_up()?;
        on_event(Event::Change);
        on_event(Event::NewComputation);

        let mut rounds = 0usize;
        loop {
            if !self.is_irreducible() {
                info!(rounds, edges = self.g.edges(), "transition matrix is reducible");
                self.g.validate()?;
                on_event(Event::Failure);
                return Ok(Outcome::Reducible);
            }
            let Some(turn) = self.find_illegal_turn() else {
                break;
            };
            let stopped = stop.is_some_and(|s| s.load(Ordering::Relaxed));
            let capped = self.cfg.max_iterations.is_some_and(|m| rounds >= m);
            if stopped || capped {
                info!(rounds, stopped, capped, "stopping before next round");
                on_event(Event::Stopped);
                return Ok(Outcome::Stopped);
            }
            self.fold_at(turn, on_event)?;
            self.clean_it_up()?;
            rounds += 1;
            let growth = self.growth_rate()?;
            info!(
                round = rounds,
                edges = self.g.edges(),
                vertices = self.g.vertices(),
                growth,
                "split-and-fold round"
            );
            on_event(Event::Progress(growth));
        }

        self.g.validate()?;
        let growth_rate = self.growth_rate()?;
        info!(rounds, growth_rate, "train track found");
        on_event(Event::Success);
        Ok(Outcome::TrainTrack { growth_rate })
    }

    /// One round: split at the turn, move the new vertex to slot 0, and fold.
    pub(crate) fn fold_at(&mut self, turn: IllegalTurn, on_event: &mut dyn FnMut(Event)) -> Result<()> {
        debug!(edge = turn.edge, pos = turn.pos, depth = turn.depth, "folding illegal turn");
        let a = turn.edge;
        let tail = self.g.split_edge(a, turn.pos + 1)?;
        // now the first letter of a is one half of the turn
        self.g.reverse_edge(a)?;
        self.g.swap_vertices(self.g.start(a), 0)?;
        self.split_and_fold(Letter::fwd(a), Letter::fwd(tail), on_event)?;
        Ok(())
    }
}
