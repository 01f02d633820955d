//! Cleanup passes run between split-and-fold rounds: valence-one and
//! valence-two homotopies, invariant-forest collapse, and tightening.

use tracing::debug;

use super::TrainTrack;
use crate::error::{GraphError, Result};

impl TrainTrack {
    /// Collapse one edge incident to a valence-one vertex, if any.
    pub fn v1_homotopy(&mut self) -> Result<bool> {
        let val = self.g.valences();
        let hit = (0..self.g.edges()).find(|&i| val[self.g.start(i)] == 1 || val[self.g.end(i)] == 1);
        let Some(i) = hit else {
            return Ok(false);
        };
        debug!(edge = i, "valence-one homotopy");
        self.g.collapse_edge(i)?;
        Ok(true)
    }

    /// Join the two edges at a valence-two vertex, if any. The edge with the
    /// larger Perron–Frobenius weight is absorbed into the other one; on a
    /// reducible matrix the lower-indexed edge survives.
    pub fn v2_homotopy(&mut self) -> Result<bool> {
        let val = self.g.valences();
        let ne = self.g.edges();
        let hit = (0..ne).find(|&i| {
            let (s, e) = (self.g.start(i), self.g.end(i));
            s != e && (val[s] == 2 || val[e] == 2)
        });
        let Some(i) = hit else {
            return Ok(false);
        };
        let vt = if val[self.g.start(i)] == 2 {
            self.g.start(i)
        } else {
            self.g.end(i)
        };
        let j = (i + 1..ne)
            .find(|&j| self.g.start(j) == vt || self.g.end(j) == vt)
            .ok_or_else(|| {
                GraphError::invariant("v2_homotopy", format!("no second edge at v{vt}"))
            })?;

        let m = self.transition_matrix();
        let (keep, drop) = if m.is_irreducible() {
            let (_, v) = m.eigen_pair(self.cfg.eigen)?;
            if v[i] > v[j] {
                (j, i)
            } else {
                (i, j)
            }
        } else {
            (i, j)
        };
        debug!(keep, drop, vertex = vt, "valence-two homotopy");
        self.g.join_edges(keep, drop)?;
        Ok(true)
    }

    /// Edges reachable from `ed` by repeatedly taking images.
    pub(crate) fn invariant_subgraph(&self, ed: usize) -> Vec<bool> {
        let mut sub = vec![false; self.g.edges()];
        let mut stack = vec![ed];
        while let Some(e) = stack.pop() {
            if sub[e] {
                continue;
            }
            sub[e] = true;
            stack.extend(self.g.image(e).iter().map(|c| c.index()).filter(|&k| !sub[k]));
        }
        sub
    }

    /// Every connected component of the subgraph has fewer edges than
    /// vertices.
    pub(crate) fn is_forest(&self, sub: &[bool]) -> bool {
        let nv = self.g.vertices();
        let mut parent: Vec<usize> = (0..nv).collect();
        fn find(parent: &mut [usize], mut x: usize) -> usize {
            while parent[x] != x {
                parent[x] = parent[parent[x]];
                x = parent[x];
            }
            x
        }
        for (i, _) in sub.iter().enumerate().filter(|&(_, &s)| s) {
            let (a, b) = (find(&mut parent, self.g.start(i)), find(&mut parent, self.g.end(i)));
            if a == b {
                // this edge closes a cycle
                return false;
            }
            parent[a] = b;
        }
        true
    }

    /// Find an invariant subgraph that is a forest and collapse it.
    pub fn collapse_inv_forest(&mut self) -> Result<bool> {
        let ne = self.g.edges();
        let Some(sub) = (0..ne)
            .map(|i| self.invariant_subgraph(i))
            .find(|sub| self.is_forest(sub))
        else {
            return Ok(false);
        };
        debug!(edges = sub.iter().filter(|&&s| s).count(), "collapsing invariant forest");
        let before = self.g.carried_loops();
        for i in (0..ne).rev() {
            if sub[i] {
                self.g.collapse_edge(i)?;
            }
        }
        self.g.ensure_carried("collapse_inv_forest", &before)?;
        Ok(true)
    }

    /// Alternate vertex tightening and image tightening until both are
    /// stable. Returns true iff anything changed.
    pub fn tighten_plus(&mut self) -> bool {
        let mut changed = false;
        loop {
            let mut step = false;
            while self.g.tighten_vertex() {
                step = true;
            }
            if self.g.tighten() {
                step = true;
            }
            if !step {
                return changed;
            }
            changed = true;
        }
    }

    /// Fixpoint of the cheap simplifications.
    pub fn clean_it_up(&mut self) -> Result<()> {
        while self.v1_homotopy()? {}
        loop {
            self.tighten_plus();
            while self.collapse_inv_forest()? {
                self.tighten_plus();
            }
            if !self.v2_homotopy()? {
                return Ok(());
            }
        }
    }
}
