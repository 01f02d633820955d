//! Plain-text and LaTeX rendering of graph maps, and the matching parser.
//!
//! Format
//! ```text
//! 2 // number of edges
//! 1 // number of vertices
//! // format: edge: (initial, terminal vertex) --> image
//! a: (v0, v0) --> b
//! b: (v0, v0) --> ab
//! abAB // fixed word
//!
//! label: example
//!
//! marking:
//! 1 // number of loops
//! // format: label: loop
//! x: a
//! ```
//! `//` starts a comment; punctuation only separates tokens. `_` stands for
//! an empty path.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use super::{GraphMap, MarkedLoop};
use crate::error::{GraphError, Result};
use crate::word::{self, MAX_INDEX};

const LABEL_TAG: &str = "label";
const MARKING_TAG: &str = "marking";
const EMPTY: &str = "_";
const RULE: &str =
    "% ------------------------------------------------------------------------\n";

fn path_or_empty(w: &[word::Letter]) -> String {
    if w.is_empty() {
        EMPTY.to_string()
    } else {
        word::path_to_string(w)
    }
}

impl fmt::Display for GraphMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} // number of edges", self.edges())?;
        writeln!(f, "{} // number of vertices", self.vertices)?;
        writeln!(f, "// format: edge: (initial, terminal vertex) --> image")?;
        for i in 0..self.edges() {
            write!(
                f,
                "{}: ({}, {}) --> ",
                word::label(i, false),
                word::vertex_label(self.start[i]),
                word::vertex_label(self.end[i])
            )?;
            if self.im[i].is_empty() {
                writeln!(f, "{EMPTY} // empty image")?;
            } else {
                writeln!(f, "{}", word::path_to_string(&self.im[i]))?;
            }
        }
        if !self.fix.is_empty() {
            writeln!(f, "{} // fixed word", word::path_to_string(&self.fix))?;
        }
        if !self.label.is_empty() {
            write!(f, "\n{LABEL_TAG}: {}\n", self.label)?;
        }
        write!(f, "\n{}", self.show_marking())
    }
}

impl GraphMap {
    /// The marking block of the text format.
    pub fn show_marking(&self) -> String {
        let Some(marks) = &self.marking else {
            return "// no marking\n".to_string();
        };
        let mut s = format!(
            "{MARKING_TAG}:\n{} // number of loops\n// format: label: loop\n",
            marks.len()
        );
        for m in marks {
            let _ = writeln!(s, "{}: {}", m.label, path_or_empty(&m.path));
        }
        s
    }

    /// The induced vertex map, one `v<i> --> v<j>` line per vertex.
    pub fn show_vertex_map(&self) -> String {
        let mut s = String::from("// induced map on vertices\n");
        for (i, v) in self.vertex_map().into_iter().enumerate() {
            let _ = writeln!(s, "{} --> {}", word::vertex_label(i), word::vertex_label(v));
        }
        s
    }

    /// LaTeX `eqnarray*` rendering of the map (and its marking, if any).
    pub fn to_latex(&self) -> String {
        let mut s = String::from(RULE);
        s.push_str("\\begin{eqnarray*}\n");
        for i in 0..self.edges() {
            let image = if self.im[i].is_empty() {
                "(\\text{empty image})".to_string()
            } else {
                word::path_to_latex(&self.im[i])
            };
            let _ = writeln!(
                s,
                "{}: ({}, {}) & \\rightarrow & {image}\\\\",
                word::latex_label(i, false),
                word::vertex_latex_label(self.start[i]),
                word::vertex_latex_label(self.end[i]),
            );
        }
        if !self.fix.is_empty() {
            let _ = writeln!(s, "\\sigma & = & {} \\\\", word::path_to_latex(&self.fix));
        }
        s.push_str("\\end{eqnarray*}\n");
        s.push_str(RULE);
        s.push('\n');
        if self.marking.is_some() {
            s.push_str(&self.marking_to_latex());
        }
        s
    }

    pub fn marking_to_latex(&self) -> String {
        let mut s = String::from(RULE);
        let Some(marks) = &self.marking else {
            s.push_str("\\text{No marking}\n");
            return s;
        };
        s.push_str("\\begin{eqnarray*}\\\\\n");
        for m in marks {
            let _ = writeln!(s, "& {}: & {}\\\\", m.label, word::path_to_latex(&m.path));
        }
        s.push_str("\\end{eqnarray*}\n");
        s.push_str(RULE);
        s
    }

    /// Parse the text format and check the good-map invariant.
    pub fn parse(text: &str) -> Result<Self> {
        let g = Self::parse_unchecked(text)?;
        g.validate()?;
        Ok(g)
    }

    /// Parse the text format without checking continuity or the fixed word.
    pub fn parse_unchecked(text: &str) -> Result<Self> {
        let mut tok = Tokenizer::new(text);
        let ne = tok.next_int()?;
        if ne > MAX_INDEX {
            return Err(GraphError::parse(tok.line, format!("too many edges: {ne}")));
        }
        let nv = tok.next_int()?;
        if nv > 2 * ne.max(1) {
            return Err(GraphError::parse(tok.line, format!("too many vertices: {nv}")));
        }
        let mut g = GraphMap {
            vertices: nv,
            ..GraphMap::default()
        };
        for i in 0..ne {
            let s = tok.next_string()?;
            if s != word::label(i, false) {
                return Err(GraphError::parse(tok.line, format!("bad edge label: {s}")));
            }
            let vertex = |tok: &mut Tokenizer| -> Result<usize> {
                let s = tok.next_string()?;
                match word::parse_vertex(&s) {
                    Some(v) if v < nv => Ok(v),
                    _ => Err(GraphError::parse(tok.line, format!("bad vertex: {s}"))),
                }
            };
            let s0 = vertex(&mut tok)?;
            let e0 = vertex(&mut tok)?;
            let image = tok.next_path()?;
            g.start.push(s0);
            g.end.push(e0);
            g.im.push(image);
        }
        let mut s = tok.try_next_string();
        if let Some(w) = s.as_deref() {
            if w != LABEL_TAG && w != MARKING_TAG {
                g.fix = parse_path_at(w, tok.line)?;
                s = tok.try_next_string();
            }
        }
        while let Some(tag) = s {
            match tag.as_str() {
                LABEL_TAG => g.label = tok.rest_of_line(LABEL_TAG),
                MARKING_TAG => {
                    let n = tok.next_int()?;
                    let mut marks = Vec::with_capacity(n);
                    for _ in 0..n {
                        let label = tok.next_string()?;
                        let path = tok.next_path()?;
                        marks.push(MarkedLoop { label, path });
                    }
                    g.marking = Some(marks);
                }
                other => {
                    return Err(GraphError::parse(
                        tok.line,
                        format!("unexpected token: {other}"),
                    ))
                }
            }
            s = tok.try_next_string();
        }
        Ok(g)
    }
}

impl FromStr for GraphMap {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        GraphMap::parse(s)
    }
}

fn parse_path_at(s: &str, line: usize) -> Result<word::Word> {
    if s == EMPTY {
        return Ok(Vec::new());
    }
    word::parse_path(s).map_err(|e| match e {
        GraphError::Parse { msg, .. } => GraphError::parse(line, msg),
        other => other,
    })
}

/// Splits input into alphanumeric tokens, skipping `//` comments and all
/// punctuation. Numbers are tokens that start with a digit.
struct Tokenizer {
    tokens: Vec<(usize, String)>,
    /// Each input line with its comment stripped.
    code: Vec<String>,
    pos: usize,
    line: usize,
}

impl Tokenizer {
    fn new(text: &str) -> Self {
        let mut tokens = Vec::new();
        let mut lines = Vec::new();
        for (n, raw) in text.lines().enumerate() {
            let code = raw.split("//").next().unwrap_or("");
            lines.push(code.to_string());
            let mut cur = String::new();
            for ch in code.chars() {
                if ch.is_ascii_alphanumeric() || ch == '_' {
                    cur.push(ch);
                } else if !cur.is_empty() {
                    tokens.push((n + 1, std::mem::take(&mut cur)));
                }
            }
            if !cur.is_empty() {
                tokens.push((n + 1, cur));
            }
        }
        Self {
            tokens,
            code: lines,
            pos: 0,
            line: 1,
        }
    }

    /// The text following `tag` on the current line, trimmed and without a
    /// leading `:`. Remaining tokens on that line are consumed.
    fn rest_of_line(&mut self, tag: &str) -> String {
        let line = self.line;
        while self.tokens.get(self.pos).is_some_and(|(l, _)| *l == line) {
            self.pos += 1;
        }
        let code = self.code.get(line - 1).map(String::as_str).unwrap_or("");
        let rest = code.trim_start().strip_prefix(tag).unwrap_or("").trim_start();
        rest.strip_prefix(':').unwrap_or(rest).trim().to_string()
    }

    fn advance(&mut self, want_number: bool) -> Option<String> {
        while let Some((line, t)) = self.tokens.get(self.pos) {
            self.pos += 1;
            self.line = *line;
            let is_number = t.starts_with(|c: char| c.is_ascii_digit());
            if is_number == want_number {
                return Some(t.clone());
            }
        }
        None
    }

    fn next_int(&mut self) -> Result<usize> {
        let t = self
            .advance(true)
            .ok_or_else(|| GraphError::parse(self.line, "unexpected end of input"))?;
        t.parse()
            .map_err(|_| GraphError::parse(self.line, format!("bad number: {t}")))
    }

    fn try_next_string(&mut self) -> Option<String> {
        self.advance(false)
    }

    fn next_string(&mut self) -> Result<String> {
        self.advance(false)
            .ok_or_else(|| GraphError::parse(self.line, "unexpected end of input"))
    }

    fn next_path(&mut self) -> Result<word::Word> {
        let s = self.next_string()?;
        parse_path_at(&s, self.line)
    }
}
