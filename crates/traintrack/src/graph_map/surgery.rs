//! Graph surgery: subdivision, collapse, contraction, folding, and the
//! bookkeeping that keeps images, the fixed word, and marked loops in step.
//!
//! Notes
//! - Removing an edge moves the last edge into its slot, so edge indices are
//!   stable except for the former last edge.
//! - Removing a vertex shifts every higher vertex index down by one.

use tracing::trace;

use super::GraphMap;
use crate::error::{GraphError, Result};
use crate::word::{self, Letter, MAX_INDEX};

impl GraphMap {
    /// Subdivide edge `ed` after `at` letters of its image. The tail becomes a
    /// new edge (index `edges()` before the call) starting at a new vertex.
    pub fn split_edge(&mut self, ed: usize, at: usize) -> Result<usize> {
        trace!(edge = ed, at, "split_edge");
        self.check_edge("split_edge", ed)?;
        if at >= self.im[ed].len() {
            return Err(GraphError::invariant(
                "split_edge",
                format!("position {at} beyond image of length {}", self.im[ed].len()),
            ));
        }
        if self.edges() >= MAX_INDEX {
            return Err(GraphError::invariant("split_edge", "edge capacity exhausted"));
        }
        let n = self.edges();
        let v = self.vertices;
        let tail = self.im[ed].split_off(at);
        self.start.push(v);
        self.end.push(self.end[ed]);
        self.im.push(tail);
        self.end[ed] = v;
        self.vertices += 1;
        self.rewrite_all(|w| word::split_letter(w, ed, n));
        Ok(n)
    }

    /// Flip the orientation of edge `ed` everywhere it occurs.
    pub fn reverse_edge(&mut self, ed: usize) -> Result<()> {
        trace!(edge = ed, "reverse_edge");
        self.check_edge("reverse_edge", ed)?;
        self.im[ed] = word::reverse(&self.im[ed]);
        std::mem::swap(&mut self.start[ed], &mut self.end[ed]);
        self.rewrite_all(|w| word::reverse_letter(w, ed));
        Ok(())
    }

    /// Merge the larger of `v1`, `v2` into the smaller and close the gap.
    pub(crate) fn adjust_vertices(&mut self, v1: usize, v2: usize) {
        if v1 == v2 {
            return;
        }
        let (lo, hi) = if v1 < v2 { (v1, v2) } else { (v2, v1) };
        let shift = |v: &mut usize| {
            if *v == hi {
                *v = lo;
            } else if *v > hi {
                *v -= 1;
            }
        };
        self.start.iter_mut().for_each(shift);
        self.end.iter_mut().for_each(shift);
        self.vertices -= 1;
    }

    /// Drop edge `ed` without touching vertices: its letters disappear from
    /// every word and the last edge takes over index `ed`.
    pub(crate) fn remove_entry(&mut self, ed: usize) {
        let last = self.edges() - 1;
        self.start.swap_remove(ed);
        self.end.swap_remove(ed);
        self.im.swap_remove(ed);
        self.rewrite_all(|w| {
            let mut out = word::remove_edge(w, ed);
            word::rename_edge(&mut out, last, ed);
            out
        });
    }

    /// Delete edge `ed`; its endpoints are merged when one of them would
    /// otherwise be left with fewer than three incident edges.
    pub fn remove_edge(&mut self, ed: usize) -> Result<()> {
        trace!(edge = ed, "remove_edge");
        self.check_edge("remove_edge", ed)?;
        let (s, e) = (self.start[ed], self.end[ed]);
        let touching = |v: usize| {
            (0..self.edges())
                .filter(|&i| self.start[i] == v || self.end[i] == v)
                .count()
        };
        if touching(s) < 3 || touching(e) < 3 {
            self.adjust_vertices(s, e);
        }
        self.remove_entry(ed);
        Ok(())
    }

    /// Delete edge `ed` and identify its endpoints.
    pub fn collapse_edge(&mut self, ed: usize) -> Result<()> {
        trace!(edge = ed, "collapse_edge");
        self.check_edge("collapse_edge", ed)?;
        self.adjust_vertices(self.start[ed], self.end[ed]);
        self.remove_entry(ed);
        Ok(())
    }

    /// Homotopy equivalence contracting the non-loop edge `ed` to its start
    /// vertex. Edges at the terminal vertex absorb the image of `ed`.
    pub fn contract_edge(&mut self, ed: usize) -> Result<()> {
        trace!(edge = ed, "contract_edge");
        self.check_edge("contract_edge", ed)?;
        if self.start[ed] == self.end[ed] {
            return Err(GraphError::invariant(
                "contract_edge",
                format!("edge {} is a loop", word::label(ed, false)),
            ));
        }
        let before = self.carried_loops();
        let v = self.end[ed];
        let img = std::mem::take(&mut self.im[ed]);
        let rev = word::reverse(&img);
        for i in 0..self.edges() {
            if i == ed {
                continue;
            }
            if self.start[i] == v {
                let mut w = img.clone();
                w.extend_from_slice(&self.im[i]);
                self.im[i] = w;
            }
            if self.end[i] == v {
                self.im[i].extend_from_slice(&rev);
            }
        }
        self.collapse_edge(ed)?;
        self.tighten();
        self.ensure_carried("contract_edge", &before)
    }

    /// Contract non-loop edges until a single vertex remains (connected
    /// graphs only).
    pub fn rose(&mut self) -> Result<()> {
        for i in (0..self.edges()).rev() {
            if i < self.edges() && self.start[i] != self.end[i] {
                self.contract_edge(i)?;
            }
        }
        Ok(())
    }

    /// Valence-two homotopy: merge `e2` into `e1` across their shared
    /// valence-two vertex, orienting both as needed. Returns the index of the
    /// merged edge.
    pub fn join_edges(&mut self, e1: usize, e2: usize) -> Result<usize> {
        trace!(e1, e2, "join_edges");
        self.check_edge("join_edges", e1)?;
        self.check_edge("join_edges", e2)?;
        if e1 == e2 {
            return Ok(e1);
        }
        if self.valence(self.end[e1]) != 2 {
            self.reverse_edge(e1)?;
        }
        if self.start[e2] != self.end[e1] {
            self.reverse_edge(e2)?;
        }
        if self.start[e2] != self.end[e1] {
            self.reverse_edge(e1)?;
        }
        if self.start[e2] != self.end[e1] {
            self.reverse_edge(e2)?;
        }
        if self.start[e2] != self.end[e1] {
            return Err(GraphError::invariant("join_edges", "edges not adjacent"));
        }
        if self.valence(self.end[e1]) != 2 {
            return Err(GraphError::invariant(
                "join_edges",
                format!("shared vertex v{} has valence != 2", self.end[e1]),
            ));
        }
        let tail = self.im[e2].clone();
        self.im[e1].extend_from_slice(&tail);
        let last = self.edges() - 1;
        self.collapse_edge(e2)?;
        Ok(if e1 == last { e2 } else { e1 })
    }

    /// Identify `e2` with `e1`. Both must start at the same vertex and carry
    /// identical images. `e2` is removed.
    pub fn elementary_fold(&mut self, e1: usize, e2: usize) -> Result<()> {
        trace!(e1, e2, "elementary_fold");
        self.check_edge("elementary_fold", e1)?;
        self.check_edge("elementary_fold", e2)?;
        if e1 == e2 {
            return Ok(());
        }
        if self.im[e1] != self.im[e2] || self.start[e1] != self.start[e2] {
            return Err(GraphError::invariant(
                "elementary_fold",
                format!(
                    "{} and {} differ in image or start vertex",
                    word::label(e1, false),
                    word::label(e2, false)
                ),
            ));
        }
        self.rewrite_all(|w| {
            let mut out = w.to_vec();
            word::rename_edge(&mut out, e2, e1);
            out
        });
        self.adjust_vertices(self.end[e1], self.end[e2]);
        self.remove_entry(e2);
        Ok(())
    }

    /// Glue two vertices. The last vertex is renumbered into the freed slot.
    pub fn identify_vertices(&mut self, v1: usize, v2: usize) -> Result<()> {
        if v1 >= self.vertices || v2 >= self.vertices {
            return Err(GraphError::invariant(
                "identify_vertices",
                format!("nonexistent vertex ({v1}, {v2})"),
            ));
        }
        if v1 == v2 {
            return Ok(());
        }
        let (lo, hi) = if v1 < v2 { (v1, v2) } else { (v2, v1) };
        let top = self.vertices - 1;
        let relabel = |v: &mut usize| {
            if *v == hi {
                *v = lo;
            } else if *v == top {
                *v = hi;
            }
        };
        self.start.iter_mut().for_each(relabel);
        self.end.iter_mut().for_each(relabel);
        self.vertices -= 1;
        Ok(())
    }

    /// Exchange the labels of two vertices.
    pub fn swap_vertices(&mut self, v1: usize, v2: usize) -> Result<()> {
        trace!(v1, v2, "swap_vertices");
        if v1 >= self.vertices || v2 >= self.vertices {
            return Err(GraphError::invariant(
                "swap_vertices",
                format!("nonexistent vertex ({v1}, {v2})"),
            ));
        }
        if v1 == v2 {
            return Ok(());
        }
        let swap = |v: &mut usize| {
            if *v == v1 {
                *v = v2;
            } else if *v == v2 {
                *v = v1;
            }
        };
        self.start.iter_mut().for_each(swap);
        self.end.iter_mut().for_each(swap);
        Ok(())
    }

    /// Free-reduce every image and cyclically reduce the fixed word and the
    /// marked loops. Returns true iff some image changed.
    pub fn tighten(&mut self) -> bool {
        let mut changed = false;
        for w in self.im.iter_mut() {
            let t = word::tighten(w);
            if t.len() != w.len() {
                changed = true;
                *w = t;
            }
        }
        self.fix = word::tighten_cyclic(&self.fix);
        for m in self.marking.iter_mut().flatten() {
            m.path = word::tighten_cyclic(&m.path);
        }
        changed
    }

    /// Pull back vertices around which the derivative is constant: the common
    /// first letter is stripped from every incident end. Edges left with an
    /// empty image are collapsed afterwards. Returns true iff a vertex fired.
    pub fn tighten_vertex(&mut self) -> bool {
        let mut fired = false;
        for v in 0..self.vertices {
            if !self.derivative_constant_at(v) {
                continue;
            }
            trace!(vertex = v, "tighten_vertex");
            fired = true;
            for j in 0..self.edges() {
                if self.start[j] == v && !self.im[j].is_empty() {
                    self.im[j].remove(0);
                }
                if self.end[j] == v {
                    self.im[j].pop();
                }
            }
        }
        let mut i = 0;
        while i < self.edges() {
            if self.im[i].is_empty() {
                // index i is re-examined: the former last edge moved here
                self.adjust_vertices(self.start[i], self.end[i]);
                self.remove_entry(i);
            } else {
                i += 1;
            }
        }
        fired
    }

    /// True iff `v` has at least one incident end, no incident edge has an
    /// empty image, and every incident end has the same derivative.
    fn derivative_constant_at(&self, v: usize) -> bool {
        let mut common: Option<Letter> = None;
        let mut seen = false;
        for j in 0..self.edges() {
            for (at_v, c) in [
                (self.start[j] == v, Letter::fwd(j)),
                (self.end[j] == v, Letter::inv(j)),
            ] {
                if !at_v {
                    continue;
                }
                let Some(d) = self.derivative(c) else {
                    return false;
                };
                match common {
                    None => common = Some(d),
                    Some(x) if x != d => return false,
                    Some(_) => {}
                }
                seen = true;
            }
        }
        seen
    }
}
