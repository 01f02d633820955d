//! Map algebra: applying a map to words, composition, spanning trees, and
//! inversion by Nielsen reduction.
//!
//! References
//! - Lyndon and Schupp, Combinatorial Group Theory, ch. I.2 (Nielsen's
//!   method and the well-order used to decide when a move shortens).

use std::cmp::Ordering;

use tracing::debug;

use super::GraphMap;
use crate::error::{GraphError, Result};
use crate::word::{self, Letter, Word};

/// Spanning tree of a connected graph plus the tree path between every pair
/// of vertices (`paths[u][v]` runs from `u` to `v`).
#[derive(Clone, Debug)]
pub struct SpanningTree {
    pub in_tree: Vec<bool>,
    pub paths: Vec<Vec<Word>>,
}

impl GraphMap {
    /// Image of the edge path `w` (not tightened). Every letter must name an
    /// edge of this graph.
    pub fn map_word(&self, w: &[Letter]) -> Word {
        let mut out = Vec::with_capacity(w.len() * 2);
        for &c in w {
            let img = &self.im[c.index()];
            if c.is_inverse() {
                out.extend(img.iter().rev().map(|x| x.inverse()));
            } else {
                out.extend_from_slice(img);
            }
        }
        out
    }

    /// Replace `self` by `self ∘ other` (apply `other` first). Both maps must
    /// live on the same graph.
    pub fn compose(&mut self, other: &GraphMap) -> Result<()> {
        if !self.same_graph(other) {
            return Err(GraphError::invariant("compose", "maps live on different graphs"));
        }
        let im: Vec<Word> = other
            .im
            .iter()
            .map(|w| word::tighten(&self.map_word(w)))
            .collect();
        self.im = im;
        Ok(())
    }

    /// Spanning tree grown from vertex 0, always adding the crossing edge that
    /// keeps the tree's eccentricity smallest. `len` gives edge lengths
    /// (all 1 when `None`).
    pub fn spanning_tree(&self, len: Option<&[f64]>) -> Result<SpanningTree> {
        let nv = self.vertices;
        let ne = self.edges();
        let unit = vec![1.0; ne];
        let len = len.unwrap_or(&unit);
        let mut in_tree = vec![false; ne];
        let mut paths = vec![vec![Word::new(); nv]; nv];
        if nv == 0 {
            return Ok(SpanningTree { in_tree, paths });
        }
        let mut dist = vec![vec![0.0f64; nv]; nv];
        let mut maxdist = vec![0.0f64; nv];
        let mut reached = vec![false; nv];
        reached[0] = true;
        let mut diam = 0.0f64;

        for _ in 0..nv - 1 {
            let mut best: Option<(usize, f64)> = None;
            for j in 0..ne {
                let (s, e) = (self.start[j], self.end[j]);
                if in_tree[j] || reached[s] == reached[e] {
                    continue;
                }
                let from = if reached[s] { s } else { e };
                let mm = diam.max(maxdist[from] + len[j]);
                if best.map_or(true, |(_, m)| mm < m) {
                    best = Some((j, mm));
                }
            }
            let Some((k, _)) = best else {
                return Err(GraphError::Structural("graph is not connected".into()));
            };
            let (l0, l1, c) = if reached[self.start[k]] {
                (self.start[k], self.end[k], Letter::fwd(k))
            } else {
                (self.end[k], self.start[k], Letter::inv(k))
            };
            diam = diam.max(maxdist[l0] + len[k]);
            for j in 0..nv {
                if !reached[j] {
                    continue;
                }
                dist[j][l1] = dist[j][l0] + len[k];
                dist[l1][j] = dist[j][l1];
                if dist[j][l1] > maxdist[j] {
                    maxdist[j] = dist[j][l1];
                }
                let mut p = paths[j][l0].clone();
                p.push(c);
                paths[l1][j] = word::reverse(&p);
                paths[j][l1] = p;
            }
            maxdist[l1] = maxdist[l0] + len[k];
            reached[l1] = true;
            in_tree[k] = true;
        }
        Ok(SpanningTree { in_tree, paths })
    }

    /// Replace `self` by a homotopy inverse on the same graph. Returns
    /// `Ok(false)` when the map does not induce an automorphism, in which case
    /// `self` is left unchanged.
    pub fn invert(&mut self) -> Result<bool> {
        self.validate()?;
        let rank = self.rank();
        let tree = self.spanning_tree(None)?;
        let mut spt = tree.in_tree;

        // contract the tree on a scratch copy; `map[i]` is the edge of `self`
        // that ends up as petal i of the rose
        let mut g = self.clone();
        g.fix.clear();
        g.marking = None;
        let mut map: Vec<usize> = (0..rank).collect();
        let mut i = 0;
        while i < g.edges() {
            while i < g.edges() && spt[i] {
                g.contract_edge(i)?;
                spt[i] = spt[g.edges()];
                if i < rank {
                    map[i] = g.edges();
                }
            }
            i += 1;
        }
        if g.edges() != rank {
            return Err(GraphError::Structural(format!(
                "tree contraction left {} petals for rank {rank}",
                g.edges()
            )));
        }
        if !g.invert_rose() {
            debug!("invert: Nielsen reduction did not reach a permutation");
            return Ok(false);
        }

        let mut im: Vec<Word> = (0..self.edges()).map(|i| vec![Letter::fwd(i)]).collect();
        for (i, &m) in map.iter().enumerate() {
            im[m] = g.im[i]
                .iter()
                .map(|c| c.with_index(map[c.index()]))
                .collect();
        }
        for i in 0..self.edges() {
            let w = &im[i];
            let (Some(&first), Some(&last)) = (w.first(), w.last()) else {
                continue;
            };
            let mut tmp = tree.paths[self.start[i]][self.first_vertex(first)].clone();
            for pair in w.windows(2) {
                tmp.push(pair[0]);
                tmp.extend_from_slice(
                    &tree.paths[self.last_vertex(pair[0])][self.first_vertex(pair[1])],
                );
            }
            tmp.push(last);
            tmp.extend_from_slice(&tree.paths[self.last_vertex(last)][self.end[i]]);
            im[i] = word::tighten(&tmp);
        }
        let old = std::mem::replace(&mut self.im, im);
        if let Err(e) = self.validate() {
            self.im = old;
            return Err(e);
        }
        Ok(true)
    }

    /// True iff the map induces an automorphism of the fundamental group.
    pub fn is_automorphism(&self) -> Result<bool> {
        self.clone().invert()
    }

    /// Nielsen reduction on a rose. On success the images become those of
    /// the inverse map.
    pub(crate) fn invert_rose(&mut self) -> bool {
        let n = self.edges();
        let mut g = self.clone();
        g.set_identity();

        // (reverse i, reverse j) for the four length-reducing moves
        const MOVES: [(bool, bool); 4] = [(false, false), (false, true), (true, true), (true, false)];
        let combine = |a: &[Letter], b: &[Letter], ra: bool, rb: bool| -> Word {
            let mut w = if ra { word::reverse(a) } else { a.to_vec() };
            if rb {
                w.extend(word::reverse(b));
            } else {
                w.extend_from_slice(b);
            }
            word::tighten(&w)
        };

        loop {
            let mut progress = false;
            for i in 0..n {
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    for &(ri, rj) in &MOVES {
                        let cand = combine(&self.im[i], &self.im[j], ri, rj);
                        if nielsen_less(&cand, &self.im[i]) {
                            self.im[i] = cand;
                            g.im[i] = combine(&g.im[i], &g.im[j], ri, rj);
                            progress = true;
                            break;
                        }
                    }
                }
            }
            if !progress {
                break;
            }
        }

        if self.im.iter().any(|w| w.len() != 1) {
            return false;
        }
        for i in 0..n.saturating_sub(1) {
            if self.im[i][0].index() == i {
                continue;
            }
            let Some(j) = (i + 1..n).find(|&j| self.im[j][0].index() == i) else {
                return false;
            };
            self.im.swap(i, j);
            g.im.swap(i, j);
        }
        for i in 0..n {
            if self.im[i][0].is_inverse() {
                self.im[i] = word::reverse(&self.im[i]);
                g.im[i] = word::reverse(&g.im[i]);
            }
        }
        self.im = g.im;
        true
    }
}

fn left_half(w: &[Letter]) -> &[Letter] {
    &w[..(w.len() + 1) / 2]
}

/// Nielsen well-order: shorter first; equal lengths compare the smaller,
/// then the larger, of the left halves of the word and of its inverse.
pub(crate) fn nielsen_less(a: &[Letter], b: &[Letter]) -> bool {
    match a.len().cmp(&b.len()) {
        Ordering::Less => return true,
        Ordering::Greater => return false,
        Ordering::Equal => {}
    }
    let ar = word::reverse(a);
    let br = word::reverse(b);
    let (la, l_a) = (left_half(a), left_half(&ar));
    let (lb, l_b) = (left_half(b), left_half(&br));
    let (mina, maxa) = if la < l_a { (la, l_a) } else { (l_a, la) };
    let (minb, maxb) = if lb < l_b { (lb, l_b) } else { (l_b, lb) };
    match mina.cmp(minb) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => maxa < maxb,
    }
}
