//! Split-and-fold at an illegal turn.
//!
//! Purpose
//! - Descend along `D` from an illegal turn to the point where both ends
//!   coincide, then on the way back up split the preimages and fold them
//!   until tightening happens.
//!
//! Notes
//! - Folding moves edges around (the last edge takes a removed edge's slot),
//!   so the path of turns is kept in a pointer list that is rewritten after
//!   every split, reversal, and fold.
//! - Vertex 0 is the vertex created at the illegal turn; its valence must not
//!   grow (Bestvina–Handel 1992, end of §3.3). Merges always keep the lower
//!   vertex index, so it keeps label 0 throughout.

use tracing::trace;

use super::{Event, TrainTrack};
use crate::error::{GraphError, Result};
use crate::word::Letter;

fn put(list: &mut Vec<Letter>, at: usize, c: Letter) {
    if at < list.len() {
        list[at] = c;
    } else {
        list.resize(at + 1, c);
    }
}

/// After edge `old` was split its inverse begins on the new tail edge `nw`.
fn update_inv(list: &mut [Letter], old: usize, nw: usize) {
    for c in list.iter_mut() {
        if c.index() == old && c.is_inverse() {
            *c = c.with_index(nw);
        }
    }
}

/// Edge `old` moved to slot `nw`.
fn update_all(list: &mut [Letter], old: usize, nw: usize) {
    for c in list.iter_mut() {
        if c.index() == old {
            *c = c.with_index(nw);
        }
    }
}

/// Edge `ed` was reversed.
fn reverse_list(list: &mut [Letter], ed: usize) {
    for c in list.iter_mut() {
        if c.index() == ed {
            *c = c.inverse();
        }
    }
}

fn flagged(fld: &[bool], i: usize) -> bool {
    fld.get(i).copied().unwrap_or(false)
}

fn set_flag(fld: &mut Vec<bool>, i: usize, on: bool) {
    if fld.len() <= i {
        fld.resize(i + 1, false);
    }
    fld[i] = on;
}

fn common_prefix(a: &[Letter], b: &[Letter]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

impl TrainTrack {
    fn d(&self, op: &'static str, c: Letter) -> Result<Letter> {
        self.g
            .derivative(c)
            .ok_or_else(|| GraphError::invariant(op, format!("empty image at {c}")))
    }

    /// Split and fold at the turn `{a, b}`. Returns true iff the final
    /// tightening changed the map.
    pub(crate) fn split_and_fold(
        &mut self,
        a: Letter,
        b: Letter,
        on_event: &mut dyn FnMut(Event),
    ) -> Result<bool> {
        let mut al = Vec::with_capacity(4 * self.g.edges());
        self.split_and_fold_rec(a, b, &mut al, 0, on_event)
    }

    fn split_and_fold_rec(
        &mut self,
        a: Letter,
        b: Letter,
        al: &mut Vec<Letter>,
        depth: usize,
        on_event: &mut dyn FnMut(Event),
    ) -> Result<bool> {
        put(al, depth, a);
        if a == b {
            trace!(depth, "reached the collapsing turn");
            return Ok(false);
        }
        let ne = self.g.edges();
        if depth > 4 * ne * ne + 1 {
            return Err(GraphError::invariant("split_and_fold", "turn is not illegal"));
        }
        let (da, db) = (self.d("split_and_fold", a)?, self.d("split_and_fold", b)?);
        if self.split_and_fold_rec(da, db, al, depth + 1, on_event)? {
            return Ok(true);
        }

        let mut a = al[depth];
        let mut e1 = a.index();
        if a.is_inverse() {
            reverse_list(al, e1);
            self.g.reverse_edge(e1)?;
            a = a.inverse();
        }

        // Collect the fold candidates and the length of their common prefix.
        let mut fld: Vec<bool> = Vec::new();
        let mut len = self.g.image(e1).len();
        let mut i = 0;
        while i < self.g.edges() {
            let dv = self.d("split_and_fold", a)?;
            let v0 = self.g.start(e1);
            let starts = self.g.start(i) == v0 && self.g.image(i).first() == Some(&dv);
            let ends = self.g.end(i) == v0 && self.g.derivative(Letter::inv(i)) == Some(dv);
            if starts {
                if i < e1 {
                    e1 = i;
                    a = Letter::fwd(i);
                }
                set_flag(&mut fld, i, true);
                let dv = self.d("split_and_fold", a)?;
                if self.g.end(i) == self.g.start(e1) && self.g.derivative(Letter::inv(i)) == Some(dv)
                {
                    // both ends of i fold onto e1
                    update_inv(al, i, self.g.edges());
                    self.g.split_edge(i, self.g.image(i).len() / 2)?;
                }
                len = len.min(common_prefix(self.g.image(i), self.g.image(e1)));
            } else if ends {
                if i < e1 {
                    e1 = i;
                    a = Letter::fwd(i);
                }
                set_flag(&mut fld, i, true);
                self.g.reverse_edge(i)?;
                reverse_list(al, i);
                len = len.min(common_prefix(self.g.image(i), self.g.image(e1)));
            }
            i += 1;
        }

        // Keep the valence of vertex 0 from growing.
        for i in 0..self.g.edges() {
            if flagged(&fld, i) && self.g.end(i) == 0 && self.g.image(i).len() <= len {
                if len > 1 {
                    len -= 1;
                } else {
                    let first = *self.g.image(e1).first().ok_or_else(|| {
                        GraphError::invariant("split_and_fold", "empty image on fold edge")
                    })?;
                    let mut sl = Vec::new();
                    self.sub_split_rec(first, al, &mut sl, 0)?;
                    len = self.g.image(i).len().saturating_sub(1);
                }
                break;
            }
        }

        // Split every candidate down to the common length.
        for i in 0..self.g.edges() {
            if flagged(&fld, i) && self.g.image(i).len() > len {
                update_inv(al, i, self.g.edges());
                self.g.split_edge(i, len)?;
                len = self.g.image(i).len();
            }
        }

        let mut i = e1 + 1;
        while i < self.g.edges() {
            if flagged(&fld, i) {
                self.g.elementary_fold(e1, i)?;
                let last = self.g.edges();
                update_all(al, i, e1);
                update_all(al, last, i);
                let moved = flagged(&fld, last);
                set_flag(&mut fld, i, moved);
            } else {
                i += 1;
            }
        }

        let tightened = self.tighten_plus();
        on_event(Event::Change);
        Ok(tightened)
    }

    /// Split the edges along the `D`-orbit of `a` so that the first edge
    /// has an image of length at least two.
    fn sub_split_rec(
        &mut self,
        a: Letter,
        al: &mut Vec<Letter>,
        sl: &mut Vec<Letter>,
        depth: usize,
    ) -> Result<()> {
        if depth > 2 * self.g.edges() {
            return Err(GraphError::invariant(
                "sub_split",
                "derivative orbit never reaches a long image",
            ));
        }
        put(sl, depth, a);
        if self.g.image(a.index()).len() <= 1 {
            let da = self.d("sub_split", a)?;
            self.sub_split_rec(da, al, sl, depth + 1)?;
        }
        let a = sl[depth];
        let ed = a.index();
        let n = self.g.edges();
        update_inv(al, ed, n);
        update_inv(sl, ed, n);
        let at = if a.is_inverse() {
            1
        } else {
            self.g.image(ed).len().saturating_sub(1)
        };
        trace!(edge = ed, at, "sub_split");
        self.g.split_edge(ed, at)?;
        Ok(())
    }
}
