//! Gates and infinitesimal edges of a train track map.
//!
//! Purpose
//! - Directions at a vertex fall into gates: two directions share a gate iff
//!   the turn they form is illegal. A turn taken by some iterated edge image
//!   is drawn as an infinitesimal edge between the two gates involved.
//!
//! Notes
//! - Directions at a vertex are listed in edge order, the start of edge `i`
//!   before its end. Gates are numbered by first appearance in that list.
//! - The map is pseudo-Anosov when the gate graph at every vertex is
//!   connected with every gate on one or two infinitesimal edges, and the
//!   transition matrix is irreducible.

use std::fmt;

use super::TrainTrack;
use crate::word::{self, Letter};

#[derive(Clone, Debug)]
pub struct Gates {
    /// Directions at each vertex.
    adj: Vec<Vec<Letter>>,
    /// Gate of each direction, parallel to `adj`.
    gate: Vec<Vec<usize>>,
    /// Symmetric gate adjacency per vertex.
    infini: Vec<Vec<Vec<bool>>>,
    irreducible: bool,
}

impl Gates {
    pub fn new(t: &TrainTrack) -> Self {
        let g = t.graph();
        let adj: Vec<Vec<Letter>> = (0..g.vertices())
            .map(|v| {
                let mut dirs = Vec::new();
                for j in 0..g.edges() {
                    if g.start(j) == v {
                        dirs.push(Letter::fwd(j));
                    }
                    if g.end(j) == v {
                        dirs.push(Letter::inv(j));
                    }
                }
                dirs
            })
            .collect();

        let gate: Vec<Vec<usize>> = adj
            .iter()
            .map(|dirs| {
                let mut reps: Vec<Letter> = Vec::new();
                dirs.iter()
                    .map(|&d| match reps.iter().position(|&r| t.is_illegal(r, d) > 0) {
                        Some(k) => k,
                        None => {
                            reps.push(d);
                            reps.len() - 1
                        }
                    })
                    .collect()
            })
            .collect();

        let mut infini: Vec<Vec<Vec<bool>>> = gate
            .iter()
            .map(|gs| {
                let n = gs.iter().max().map_or(1, |m| m + 1);
                vec![vec![false; n]; n]
            })
            .collect();

        let dim = 2 * g.edges();
        let mut seen = vec![false; dim * dim];
        let gate_of = |v: usize, d: Letter| {
            adj[v].iter().position(|&x| x == d).map(|p| gate[v][p])
        };
        for i in 0..g.edges() {
            for pair in g.image(i).windows(2) {
                let (mut a, mut b) = (pair[0].inverse(), pair[1]);
                loop {
                    let (x, y) = (t.coord(a), t.coord(b));
                    if seen[x * dim + y] {
                        break;
                    }
                    seen[x * dim + y] = true;
                    seen[y * dim + x] = true;
                    let vt = g.first_vertex(b);
                    if let (Some(ga), Some(gb)) = (gate_of(vt, a), gate_of(vt, b)) {
                        infini[vt][ga][gb] = true;
                        infini[vt][gb][ga] = true;
                    }
                    match (g.derivative(a), g.derivative(b)) {
                        (Some(da), Some(db)) => {
                            a = da;
                            b = db;
                        }
                        _ => break,
                    }
                }
            }
        }

        Self {
            adj,
            gate,
            infini,
            irreducible: t.is_irreducible(),
        }
    }

    /// Number of gates at vertex `v`.
    pub fn gate_count(&self, v: usize) -> usize {
        self.infini.get(v).map_or(0, Vec::len)
    }

    /// Gate index of each direction at `v`, in direction order.
    pub fn gates_at(&self, v: usize) -> Vec<(Letter, usize)> {
        self.adj[v].iter().copied().zip(self.gate[v].iter().copied()).collect()
    }

    pub fn is_infinitesimal(&self, v: usize, g1: usize, g2: usize) -> bool {
        self.infini[v][g1][g2]
    }

    pub fn is_pseudo_anosov(&self) -> bool {
        self.infini.iter().all(|m| gate_graph_is_path_or_cycle(m)) && self.irreducible
    }
}

fn gate_graph_is_path_or_cycle(m: &[Vec<bool>]) -> bool {
    let n = m.len();
    let degrees: Vec<usize> = m.iter().map(|row| row.iter().filter(|&&x| x).count()).collect();
    if degrees.iter().any(|&d| d == 0 || d > 2) {
        return false;
    }
    if degrees.iter().filter(|&&d| d == 1).count() > 2 {
        return false;
    }
    let mut reached = vec![false; n];
    let mut stack = vec![0];
    while let Some(j) = stack.pop() {
        if reached[j] {
            continue;
        }
        reached[j] = true;
        stack.extend((0..n).filter(|&k| m[j][k] && !reached[k]));
    }
    reached.into_iter().all(|r| r)
}

impl fmt::Display for Gates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (v, dirs) in self.adj.iter().enumerate() {
            writeln!(f, "vertex {v}")?;
            for (d, gt) in dirs.iter().zip(&self.gate[v]) {
                writeln!(f, "{} {gt}", word::label(d.index(), d.is_inverse()))?;
            }
            writeln!(f)?;
            for row in &self.infini[v] {
                for &x in row {
                    write!(f, "{} ", if x { 1 } else { 0 })?;
                }
                writeln!(f)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
