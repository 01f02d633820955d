//! Graph maps: self-maps of finite graphs given by edge-path images.
//!
//! Purpose
//! - Hold a topological representative of an outer automorphism of a free
//!   group (graph, images, optional fixed word and marking).
//! - Provide the surgery the train-track engine is built from (subdivide,
//!   collapse, contract, fold, join) while keeping images, the fixed word,
//!   and marked loops consistent.
//! - Read and write the plain-text exchange format; emit LaTeX.
//!
//! Notes
//! - Operations return `Result`; precondition violations are
//!   `GraphError::Invariant`, discontinuities are `GraphError::Structural`.
//! - Vertices are plain indices `0..vertices()`; edges are `0..edges()` and
//!   their oriented forms are `word::Letter`s.
//!
//! References
//! - M. Bestvina, M. Handel, "Train tracks and automorphisms of free groups",
//!   Ann. of Math. 135 (1992).

mod algebra;
mod surgery;
mod text;
mod types;

pub use algebra::SpanningTree;
pub use types::{GraphMap, MarkedLoop};

#[cfg(test)]
mod tests;
