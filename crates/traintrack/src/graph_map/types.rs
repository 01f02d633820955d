//! The `GraphMap` data type: a finite graph, an image path per edge, an
//! optional fixed word, and an optional marking.
//!
//! Invariant ("good map", checked by `validate`):
//! - every edge image is a continuous path,
//! - every marked loop is continuous,
//! - the fixed word is a continuous loop mapped to a cyclic conjugate of
//!   itself or of its reverse.

use crate::error::{GraphError, Result};
use crate::matrix::IntMatrix;
use crate::word::{self, Letter, Word, MAX_INDEX};

/// A named loop carried through every rewriting step so the automorphism on
/// generators can be read off later.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkedLoop {
    pub label: String,
    pub path: Word,
}

impl MarkedLoop {
    pub fn new(label: impl Into<String>, path: Word) -> Self {
        Self {
            label: label.into(),
            path,
        }
    }
}

/// Self-map of a finite graph. Edge `i` runs from `start[i]` to `end[i]` and
/// maps to the edge path `im[i]`.
#[derive(Clone, Debug, Default)]
pub struct GraphMap {
    pub(crate) vertices: usize,
    pub(crate) start: Vec<usize>,
    pub(crate) end: Vec<usize>,
    pub(crate) im: Vec<Word>,
    pub(crate) fix: Word,
    pub(crate) label: String,
    pub(crate) marking: Option<Vec<MarkedLoop>>,
}

/// Which carried loops were non-empty before a collapsing operation.
pub(crate) struct CarriedLoops {
    fix: bool,
    marks: Vec<bool>,
}

impl GraphMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity on the rose with `n` petals, empty fixed word.
    pub fn identity_rose(n: usize) -> Result<Self> {
        let mut g = Self {
            vertices: 1,
            ..Self::default()
        };
        for i in 0..n {
            g.add_edge(0, 0, vec![Letter::fwd(i)])?;
        }
        Ok(g)
    }

    /// Identity on the rose with `|bd|/2` petals; the fixed word is the dual
    /// of the boundary word `bd`.
    pub fn identity_from_boundary(bd: &[Letter]) -> Result<Self> {
        let fix = word::dualize(bd)?;
        let mut g = Self::identity_rose(bd.len() / 2)?;
        g.fix = fix;
        Ok(g)
    }

    /// Identity on the graph whose vertices are read off the boundary word
    /// `fw`; `fw` becomes the fixed word.
    pub fn identity_from_fixed(fw: &[Letter]) -> Result<Self> {
        if !word::is_boundary(fw) {
            return Err(GraphError::Structural(format!(
                "bad boundary word: {}",
                word::path_to_string(fw)
            )));
        }
        let n = fw.len() / 2;
        if fw.iter().any(|c| c.index() >= n) {
            return Err(GraphError::Structural(format!(
                "boundary word uses labels beyond {n} edges: {}",
                word::path_to_string(fw)
            )));
        }
        let mut start: Vec<Option<usize>> = vec![None; n];
        let mut end: Vec<Option<usize>> = vec![None; n];
        let first_of = |c: Letter, s: &[Option<usize>], e: &[Option<usize>]| {
            if c.is_inverse() {
                e[c.index()]
            } else {
                s[c.index()]
            }
        };
        let len = fw.len();
        let mut cnt = 0;
        for i0 in 0..len {
            if first_of(fw[i0], &start, &end).is_some() {
                continue;
            }
            let mut i = i0;
            while first_of(fw[i], &start, &end).is_none() {
                let c = fw[i];
                if c.is_inverse() {
                    end[c.index()] = Some(cnt);
                } else {
                    start[c.index()] = Some(cnt);
                }
                while fw[i].inverse() != c {
                    i = (i + 1) % len;
                }
                i = (i + 1) % len;
            }
            cnt += 1;
        }
        let mut g = Self::new();
        for i in 0..n {
            match (start[i], end[i]) {
                (Some(s), Some(e)) => {
                    g.add_edge(s, e, vec![Letter::fwd(i)])?;
                }
                _ => {
                    return Err(GraphError::Structural(format!(
                        "edge {} not visited by boundary word",
                        word::label(i, false)
                    )))
                }
            }
        }
        g.vertices = cnt.max(g.vertices);
        g.fix = fw.to_vec();
        Ok(g)
    }

    /// Turn the map into the identity of the underlying graph.
    pub fn set_identity(&mut self) {
        for (i, w) in self.im.iter_mut().enumerate() {
            *w = vec![Letter::fwd(i)];
        }
    }

    #[inline]
    pub fn edges(&self) -> usize {
        self.im.len()
    }
    #[inline]
    pub fn vertices(&self) -> usize {
        self.vertices
    }
    #[inline]
    pub fn capacity(&self) -> usize {
        self.im.capacity()
    }
    /// Rank of the fundamental group, assuming the graph is connected. The
    /// empty graph has rank 0.
    #[inline]
    pub fn rank(&self) -> usize {
        if self.vertices == 0 {
            return 0;
        }
        (self.edges() + 1).saturating_sub(self.vertices)
    }
    /// Sum of the lengths of all edge images.
    pub fn size(&self) -> usize {
        self.im.iter().map(Vec::len).sum()
    }
    /// Image of edge `i`. Panics if `i >= edges()`.
    #[inline]
    pub fn image(&self, i: usize) -> &[Letter] {
        &self.im[i]
    }
    #[inline]
    pub fn start(&self, i: usize) -> usize {
        self.start[i]
    }
    #[inline]
    pub fn end(&self, i: usize) -> usize {
        self.end[i]
    }
    #[inline]
    pub fn fix(&self) -> &[Letter] {
        &self.fix
    }
    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }
    /// Line breaks and `//` would not survive the text format; they become
    /// spaces and `/`.
    pub fn set_label(&mut self, s: impl Into<String>) {
        let mut s: String = s.into();
        s = s.replace(['\n', '\r'], " ");
        while s.contains("//") {
            s = s.replace("//", "/");
        }
        self.label = s.trim().to_string();
    }
    pub fn marking(&self) -> Option<&[MarkedLoop]> {
        self.marking.as_deref()
    }
    pub fn is_marked(&self) -> bool {
        self.marking.is_some()
    }
    pub fn set_marking(&mut self, loops: Vec<MarkedLoop>) {
        self.marking = Some(loops);
    }
    pub fn unmark(&mut self) {
        self.marking = None;
    }

    /// Append an edge from `v1` to `v2` with the given image.
    pub fn add_edge(&mut self, v1: usize, v2: usize, image: Word) -> Result<usize> {
        if self.edges() >= MAX_INDEX {
            return Err(GraphError::invariant(
                "add_edge",
                format!("capacity exhausted ({MAX_INDEX} edges)"),
            ));
        }
        self.start.push(v1);
        self.end.push(v2);
        self.im.push(image);
        self.vertices = self.vertices.max(v1 + 1).max(v2 + 1);
        Ok(self.edges() - 1)
    }

    /// Replace the image of edge `ed`. The caller restores continuity.
    pub fn set_image(&mut self, ed: usize, w: Word) -> Result<()> {
        self.check_edge("set_image", ed)?;
        self.im[ed] = w;
        Ok(())
    }

    /// Replace the fixed word. The caller restores the good-map invariant.
    pub fn set_fix(&mut self, w: Word) {
        self.fix = w;
    }

    pub(crate) fn check_edge(&self, op: &'static str, ed: usize) -> Result<()> {
        if ed >= self.edges() {
            return Err(GraphError::invariant(
                op,
                format!("nonexistent edge {ed} (have {})", self.edges()),
            ));
        }
        Ok(())
    }

    /// Terminal vertex of the oriented edge `c`.
    #[inline]
    pub fn last_vertex(&self, c: Letter) -> usize {
        if c.is_inverse() {
            self.start[c.index()]
        } else {
            self.end[c.index()]
        }
    }

    /// Initial vertex of the oriented edge `c`.
    #[inline]
    pub fn first_vertex(&self, c: Letter) -> usize {
        self.last_vertex(c.inverse())
    }

    /// The derivative map `D`: first letter of the image of a forward end,
    /// inverse of the last letter for a backward end. `None` on empty images.
    pub fn derivative(&self, c: Letter) -> Option<Letter> {
        let w = self.im.get(c.index())?;
        if c.is_inverse() {
            w.last().map(|x| x.inverse())
        } else {
            w.first().copied()
        }
    }

    /// Number of edge ends at `v` (loops count twice).
    pub fn valence(&self, v: usize) -> usize {
        self.valences().get(v).copied().unwrap_or(0)
    }

    pub fn valences(&self) -> Vec<usize> {
        let mut val = vec![0; self.vertices];
        for i in 0..self.edges() {
            val[self.start[i]] += 1;
            val[self.end[i]] += 1;
        }
        val
    }

    /// Directions at `v`, in the cyclic order given by the fixed word when it
    /// passes through `v`, otherwise in edge order.
    pub fn star_of_vertex(&self, v: usize) -> Word {
        let fix = &self.fix;
        let from_fix = fix
            .iter()
            .position(|&c| c.index() < self.edges() && self.first_vertex(c) == v);
        let Some(i0) = from_fix else {
            let mut res = Vec::new();
            for i in 0..self.edges() {
                if self.start[i] == v {
                    res.push(Letter::fwd(i));
                }
                if self.end[i] == v {
                    res.push(Letter::inv(i));
                }
            }
            return res;
        };
        let len = fix.len();
        let mut res = Vec::new();
        let mut j = i0;
        for _ in 0..=len {
            let c = fix[j];
            res.push(c);
            match (1..len).map(|k| (j + k) % len).find(|&p| fix[p] == c.inverse()) {
                Some(p) => j = (p + 1) % len,
                None => break,
            }
            if j == i0 {
                break;
            }
        }
        res
    }

    /// Induced map on vertices, read off the derivative.
    pub fn vertex_map(&self) -> Vec<usize> {
        let mut vt = vec![0; self.vertices];
        for i in 0..self.edges() {
            if let Some(d) = self.derivative(Letter::fwd(i)) {
                vt[self.start[i]] = self.first_vertex(d);
            }
            if let Some(d) = self.derivative(Letter::inv(i)) {
                vt[self.end[i]] = self.first_vertex(d);
            }
        }
        vt
    }

    /// Entry `(i, j)` counts occurrences of edge `i` (either orientation) in
    /// the image of edge `j`.
    pub fn transition_matrix(&self) -> IntMatrix {
        let mut m = IntMatrix::zeros(self.edges());
        for (j, w) in self.im.iter().enumerate() {
            for c in w {
                m.a[(c.index(), j)] += 1;
            }
        }
        m
    }

    /// Action on the first homology of the graph (signed edge counts).
    pub fn abelianized(&self) -> IntMatrix {
        let mut ab = IntMatrix::zeros(self.edges());
        for (j, w) in self.im.iter().enumerate() {
            for c in w {
                ab.a[(c.index(), j)] += if c.is_inverse() { -1 } else { 1 };
            }
        }
        ab
    }

    /// True iff both maps live on the same underlying graph.
    pub fn same_graph(&self, other: &GraphMap) -> bool {
        self.vertices == other.vertices && self.start == other.start && self.end == other.end
    }

    /// Continuous path: consecutive letters share a vertex and every letter
    /// names an existing edge.
    pub fn is_good_path(&self, p: &[Letter]) -> bool {
        if p.iter().any(|c| c.index() >= self.edges()) {
            return false;
        }
        p.windows(2)
            .all(|w| self.last_vertex(w[0]) == self.first_vertex(w[1]))
    }

    /// Continuous closed path (the empty loop is good).
    pub fn is_good_loop(&self, p: &[Letter]) -> bool {
        match (p.first(), p.last()) {
            (Some(&f), Some(&l)) => {
                self.is_good_path(p) && self.first_vertex(f) == self.last_vertex(l)
            }
            _ => true,
        }
    }

    /// Check the good-map invariant; the error names the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.start.iter().chain(&self.end).any(|&v| v >= self.vertices) {
            return Err(GraphError::Structural("vertex out of range".into()));
        }
        for w in &self.im {
            if !self.is_good_path(w) {
                return Err(GraphError::Structural(format!(
                    "bad image: {}",
                    word::path_to_string(w)
                )));
            }
        }
        for m in self.marking.iter().flatten() {
            if !self.is_good_path(&m.path) {
                return Err(GraphError::Structural(format!(
                    "bad marking: {}",
                    word::path_to_string(&m.path)
                )));
            }
        }
        if !self.is_good_loop(&self.fix) {
            return Err(GraphError::Structural(format!(
                "bad fixed word: {}",
                word::path_to_string(&self.fix)
            )));
        }
        let image = self.map_word(&self.fix);
        if word::is_cyclically_conjugate(&self.fix, &image)
            || word::is_cyclically_conjugate(&word::reverse(&self.fix), &image)
        {
            Ok(())
        } else {
            Err(GraphError::Structural("fixed word not preserved".into()))
        }
    }

    pub fn is_good_map(&self) -> bool {
        self.validate().is_ok()
    }

    pub(crate) fn carried_loops(&self) -> CarriedLoops {
        CarriedLoops {
            fix: !self.fix.is_empty(),
            marks: self
                .marking
                .iter()
                .flatten()
                .map(|m| !m.path.is_empty())
                .collect(),
        }
    }

    /// A fixed word or marked loop that was non-empty before `op` must still
    /// be a non-empty continuous path afterwards.
    pub(crate) fn ensure_carried(&self, op: &'static str, before: &CarriedLoops) -> Result<()> {
        if before.fix && (self.fix.is_empty() || !self.is_good_loop(&self.fix)) {
            return Err(GraphError::Structural(format!(
                "{op} detached the fixed word"
            )));
        }
        for (m, &was) in self.marking.iter().flatten().zip(&before.marks) {
            if was && (m.path.is_empty() || !self.is_good_path(&m.path)) {
                return Err(GraphError::Structural(format!(
                    "{op} detached marked loop {}",
                    m.label
                )));
            }
        }
        Ok(())
    }

    /// Apply `f` to every stored word: images, fixed word, marked loops.
    pub(crate) fn rewrite_all(&mut self, mut f: impl FnMut(&[Letter]) -> Word) {
        for w in self.im.iter_mut() {
            *w = f(w);
        }
        self.fix = f(&self.fix);
        for m in self.marking.iter_mut().flatten() {
            m.path = f(&m.path);
        }
    }
}

/// Same graph, same images, fixed words cyclically conjugate.
impl PartialEq for GraphMap {
    fn eq(&self, other: &Self) -> bool {
        self.same_graph(other)
            && self.im == other.im
            && word::is_cyclically_conjugate(&self.fix, &other.fix)
    }
}
