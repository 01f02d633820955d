//! Edge-path words over the oriented-edge alphabet.
//!
//! Purpose
//! - Define the internal representation of edge paths (`Word = Vec<Letter>`)
//!   and the text format for edges and paths.
//! - Provide free reduction, cyclic reduction, reversal, conjugacy tests, and
//!   the rewriting helpers used by graph surgery (split, rename, remove).
//!
//! Text format
//! - Edges `0..26` are labelled `a..z`, their inverses `A..Z`.
//! - Edge `26 + k` is labelled `z<k>`, its inverse `Z<k>` (e.g. `z0`, `Z15`).
//! - Vertices are labelled `v<k>`.

use std::fmt;

use crate::error::{GraphError, Result};

/// Largest number of edges a graph may carry.
pub const MAX_INDEX: usize = 32767;

const PLAIN_LIMIT: usize = 26;

/// An oriented edge: an edge index plus an orientation bit.
///
/// Ordering puts every forward letter before every inverse letter and then
/// orders by index; the Nielsen well-order in `graph_map` relies on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Letter {
    inverted: bool,
    index: u32,
}

impl Letter {
    #[inline]
    pub fn new(index: usize, inverted: bool) -> Self {
        debug_assert!(index < MAX_INDEX, "edge index {index} out of range");
        Self {
            inverted,
            index: index as u32,
        }
    }
    #[inline]
    pub fn fwd(index: usize) -> Self {
        Self::new(index, false)
    }
    #[inline]
    pub fn inv(index: usize) -> Self {
        Self::new(index, true)
    }
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }
    #[inline]
    pub fn is_inverse(self) -> bool {
        self.inverted
    }
    #[inline]
    pub fn inverse(self) -> Self {
        Self {
            inverted: !self.inverted,
            index: self.index,
        }
    }
    /// Same orientation, different edge.
    #[inline]
    pub fn with_index(self, index: usize) -> Self {
        Self::new(index, self.inverted)
    }

    pub fn to_latex(self) -> String {
        latex_label(self.index(), self.inverted)
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&label(self.index(), self.inverted))
    }
}

pub type Word = Vec<Letter>;

/// Text label of an oriented edge.
pub fn label(index: usize, inverted: bool) -> String {
    let base = if inverted { b'A' } else { b'a' };
    if index < PLAIN_LIMIT {
        ((base + index as u8) as char).to_string()
    } else {
        format!("{}{}", (base + 25) as char, index - PLAIN_LIMIT)
    }
}

/// LaTeX label of an oriented edge (inverse edges get a bar).
pub fn latex_label(index: usize, inverted: bool) -> String {
    match (index < PLAIN_LIMIT, inverted) {
        (true, false) => ((b'a' + index as u8) as char).to_string(),
        (true, true) => format!("{{\\bar {}}}", (b'a' + index as u8) as char),
        (false, false) => format!("z_{{{}}}", index - PLAIN_LIMIT),
        (false, true) => format!("{{\\bar z}}_{{{}}}", index - PLAIN_LIMIT),
    }
}

pub fn vertex_label(v: usize) -> String {
    format!("v{v}")
}

pub fn vertex_latex_label(v: usize) -> String {
    format!("v_{{{v}}}")
}

/// Parse a vertex label `v<k>`.
pub fn parse_vertex(s: &str) -> Option<usize> {
    s.strip_prefix('v')?.parse().ok()
}

/// Parse a path string such as `aBz0Z3` into a word.
pub fn parse_path(s: &str) -> Result<Word> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        let inverted = match c {
            b'a'..=b'z' => false,
            b'A'..=b'Z' => true,
            _ => {
                return Err(GraphError::parse(
                    0,
                    format!("bad edge label character {:?} in {s:?}", c as char),
                ))
            }
        };
        let mut index = (c.to_ascii_lowercase() - b'a') as usize;
        let mut j = i + 1;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > i + 1 {
            if index != 25 {
                return Err(GraphError::parse(
                    0,
                    format!("numbered label must use z/Z: {:?}", &s[i..j]),
                ));
            }
            let k: usize = s[i + 1..j]
                .parse()
                .map_err(|_| GraphError::parse(0, format!("bad label {:?}", &s[i..j])))?;
            index = k.checked_add(PLAIN_LIMIT).ok_or_else(|| {
                GraphError::parse(0, format!("edge index in {:?} too large", &s[i..j]))
            })?;
        }
        if index >= MAX_INDEX {
            return Err(GraphError::parse(0, format!("edge index {index} too large")));
        }
        out.push(Letter::new(index, inverted));
        i = j;
    }
    Ok(out)
}

pub fn path_to_string(w: &[Letter]) -> String {
    w.iter().map(|c| c.to_string()).collect()
}

pub fn path_to_latex(w: &[Letter]) -> String {
    w.iter().map(|c| c.to_latex()).collect()
}

/// Free reduction: delete adjacent mutually inverse pairs until none remain.
pub fn tighten(w: &[Letter]) -> Word {
    let mut out: Word = Vec::with_capacity(w.len());
    for &c in w {
        if out.last() == Some(&c.inverse()) {
            out.pop();
        } else {
            out.push(c);
        }
    }
    out
}

/// Free reduction followed by stripping inverse pairs across the wraparound.
pub fn tighten_cyclic(w: &[Letter]) -> Word {
    let t = tighten(w);
    let mut lo = 0;
    let mut hi = t.len();
    while hi - lo >= 2 && t[lo].inverse() == t[hi - 1] {
        lo += 1;
        hi -= 1;
    }
    t[lo..hi].to_vec()
}

/// The inverse path: reversed order, every letter inverted.
pub fn reverse(w: &[Letter]) -> Word {
    w.iter().rev().map(|c| c.inverse()).collect()
}

/// Flip the orientation of every occurrence of edge `e`.
pub fn reverse_letter(w: &[Letter], e: usize) -> Word {
    w.iter()
        .map(|&c| if c.index() == e { c.inverse() } else { c })
        .collect()
}

/// Delete every occurrence of edge `e` (either orientation).
pub fn remove_edge(w: &[Letter], e: usize) -> Word {
    w.iter().copied().filter(|c| c.index() != e).collect()
}

/// Rename edge `from` to `to`, keeping orientations.
pub fn rename_edge(w: &mut [Letter], from: usize, to: usize) {
    for c in w.iter_mut() {
        if c.index() == from {
            *c = c.with_index(to);
        }
    }
}

/// Subdivide edge `e` into `e·n`: `e ↦ e n`, `E ↦ N E`.
pub fn split_letter(w: &[Letter], e: usize, n: usize) -> Word {
    let mut out = Vec::with_capacity(w.len() + 4);
    for &c in w {
        if c.index() != e {
            out.push(c);
        } else if c.is_inverse() {
            out.push(Letter::inv(n));
            out.push(c);
        } else {
            out.push(c);
            out.push(Letter::fwd(n));
        }
    }
    out
}

/// Replace every occurrence of `c` by `s` (and `c⁻¹` by `s⁻¹`), then tighten.
pub fn replace_letter(w: &[Letter], c: Letter, s: &[Letter]) -> Word {
    let si = reverse(s);
    let mut out = Vec::with_capacity(w.len());
    for &x in w {
        if x == c {
            out.extend_from_slice(s);
        } else if x == c.inverse() {
            out.extend_from_slice(&si);
        } else {
            out.push(x);
        }
    }
    tighten(&out)
}

/// Position of the next occurrence of `target` strictly after `i`, cyclically.
fn next_cyclic(w: &[Letter], i: usize, target: Letter) -> Option<usize> {
    let n = w.len();
    (1..n).map(|k| (i + k) % n).find(|&j| w[j] == target)
}

/// Admissible boundary word: cyclically reduced, even length, and each
/// letter's inverse occurs exactly once in the word.
pub fn is_boundary(w: &[Letter]) -> bool {
    if w.len() % 2 != 0 || tighten_cyclic(w).len() != w.len() {
        return false;
    }
    w.iter()
        .all(|&c| w.iter().filter(|&&x| x == c.inverse()).count() == 1)
}

/// Dual word of a boundary word: from each letter, jump past its inverse
/// pairing and continue until the walk returns to the start.
pub fn dualize(w: &[Letter]) -> Result<Word> {
    if !is_boundary(w) {
        return Err(GraphError::Structural(format!(
            "bad boundary word: {}",
            path_to_string(w)
        )));
    }
    let mut dw = Vec::new();
    if w.is_empty() {
        return Ok(dw);
    }
    let len = w.len();
    let mut i = 0;
    loop {
        let ch = w[i];
        dw.push(ch);
        // is_boundary guarantees the partner exists
        let Some(j) = next_cyclic(w, i, ch.inverse()) else {
            break;
        };
        i = (j + 1) % len;
        if i == 0 {
            break;
        }
    }
    Ok(dw)
}

/// Relator cycles of a boundary word (one per cycle of the dual walk).
pub fn relations(bd: &[Letter]) -> Vec<Word> {
    let n = bd.len();
    let mut visited = vec![false; n];
    let mut rels = Vec::new();
    for j in 0..n {
        if visited[j] {
            continue;
        }
        let mut rel = Vec::new();
        let mut i = j;
        while !visited[i] {
            visited[i] = true;
            let c = bd[i];
            rel.push(c);
            match next_cyclic(bd, i, c.inverse()) {
                Some(p) => i = (p + 1) % n,
                None => break,
            }
        }
        rels.push(rel);
    }
    rels
}

/// True iff the cyclic reductions of `w1` and `w2` agree up to rotation.
pub fn is_cyclically_conjugate(w1: &[Letter], w2: &[Letter]) -> bool {
    let a = tighten_cyclic(w1);
    let b = tighten_cyclic(w2);
    if a.len() != b.len() {
        return false;
    }
    let len = a.len();
    if len == 0 {
        return true;
    }
    (0..len).any(|i| (0..len).all(|j| a[j] == b[(i + j) % len]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn w(s: &str) -> Word {
        parse_path(s).unwrap()
    }

    #[test]
    fn labels_round_trip_past_z() {
        assert_eq!(label(0, false), "a");
        assert_eq!(label(25, true), "Z");
        assert_eq!(label(26, false), "z0");
        assert_eq!(label(41, true), "Z15");
        let p = w("azz0Z15B");
        assert_eq!(
            p,
            vec![
                Letter::fwd(0),
                Letter::fwd(25),
                Letter::fwd(26),
                Letter::inv(41),
                Letter::inv(1)
            ]
        );
        assert_eq!(path_to_string(&p), "azz0Z15B");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_path("a-b").is_err());
        assert!(parse_path("b3").is_err());
    }

    #[test]
    fn parse_rejects_huge_numbered_labels() {
        for s in ["z18446744073709551615", "Z99999999999999999999999", "z32741"] {
            assert!(matches!(parse_path(s), Err(GraphError::Parse { .. })), "{s}");
        }
        assert_eq!(parse_path("z32740").unwrap(), vec![Letter::fwd(MAX_INDEX - 1)]);
    }

    #[test]
    fn tighten_cancels_nested_pairs() {
        assert_eq!(tighten(&w("abBA")), Vec::<Letter>::new());
        assert_eq!(tighten(&w("cabBAd")), w("cd"));
        assert_eq!(tighten_cyclic(&w("AbcBa")), w("c"));
        assert_eq!(tighten_cyclic(&w("aA")), Vec::<Letter>::new());
    }

    #[test]
    fn split_and_replace_handle_inverses() {
        // e=a, n=c: a ↦ ac, A ↦ CA
        assert_eq!(split_letter(&w("aBA"), 0, 2), w("acBCA"));
        assert_eq!(replace_letter(&w("aB"), Letter::fwd(1), &w("ab")), w("aBA"));
        assert_eq!(reverse_letter(&w("abA"), 0), w("Aba"));
        assert_eq!(remove_edge(&w("abAc"), 0), w("bc"));
    }

    #[test]
    fn boundary_words_and_duals() {
        // commutator boundary of a once-punctured torus
        let bd = w("abAB");
        assert!(is_boundary(&bd));
        assert!(!is_boundary(&w("abA")));
        assert!(!is_boundary(&w("aabA")));
        let dual = dualize(&bd).unwrap();
        assert_eq!(dual.len(), 4);
        assert_eq!(relations(&bd).len(), 1);
        assert!(dualize(&w("ab")).is_err());
    }

    #[test]
    fn conjugacy_up_to_rotation() {
        assert!(is_cyclically_conjugate(&w("abc"), &w("bca")));
        assert!(is_cyclically_conjugate(&w("Xabcx"), &w("cab")));
        assert!(!is_cyclically_conjugate(&w("abc"), &w("acb")));
        assert!(is_cyclically_conjugate(&[], &w("aA")));
    }

    fn arb_word(max_edge: usize, max_len: usize) -> impl Strategy<Value = Word> {
        prop::collection::vec((0..max_edge, any::<bool>()), 0..max_len)
            .prop_map(|v| v.into_iter().map(|(i, inv)| Letter::new(i, inv)).collect())
    }

    proptest! {
        #[test]
        fn tighten_is_idempotent(p in arb_word(4, 24)) {
            let t = tighten(&p);
            prop_assert_eq!(tighten(&t), t.clone());
            prop_assert!(t.windows(2).all(|x| x[0].inverse() != x[1]));
        }

        #[test]
        fn reverse_is_involution(p in arb_word(40, 24)) {
            prop_assert_eq!(reverse(&reverse(&p)), p);
        }

        #[test]
        fn path_strings_round_trip(p in arb_word(60, 16)) {
            prop_assert_eq!(parse_path(&path_to_string(&p)).unwrap(), p);
        }

        #[test]
        fn cyclic_tightening_is_conjugate(p in arb_word(3, 20), k in 0usize..20) {
            let t = tighten_cyclic(&p);
            let r = if t.is_empty() { 0 } else { k % t.len() };
            let mut rotated = t[r..].to_vec();
            rotated.extend_from_slice(&t[..r]);
            prop_assert!(is_cyclically_conjugate(&p, &rotated));
        }
    }
}
