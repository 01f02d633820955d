use super::algebra::nielsen_less;
use super::*;
use crate::error::{ErrorKind, GraphError};
use crate::word::{parse_path, Letter};
use proptest::prelude::*;

fn w(s: &str) -> Vec<Letter> {
    parse_path(s).unwrap()
}

fn golden() -> GraphMap {
    GraphMap::parse(
        "2 // number of edges\n1 // number of vertices\n\
         a: (v0, v0) --> b\nb: (v0, v0) --> ab\n",
    )
    .unwrap()
}

/// Identity on a theta-like graph: a: v0->v1, b: v1->v0, c: v0->v0.
fn two_vertex_identity() -> GraphMap {
    let mut g = GraphMap::new();
    g.add_edge(0, 1, w("a")).unwrap();
    g.add_edge(1, 0, w("b")).unwrap();
    g.add_edge(0, 0, w("c")).unwrap();
    g
}

#[test]
fn parse_reads_golden_map() {
    let g = golden();
    assert_eq!(g.edges(), 2);
    assert_eq!(g.vertices(), 1);
    assert_eq!(g.rank(), 2);
    assert_eq!(g.image(0), w("b").as_slice());
    assert_eq!(g.image(1), w("ab").as_slice());
    assert_eq!(g.size(), 3);
    assert!(g.is_good_map());
}

#[test]
fn display_then_parse_preserves_everything() {
    let mut g = golden();
    g.set_label("golden");
    g.set_marking(vec![MarkedLoop::new("x", w("a")), MarkedLoop::new("y", w("b"))]);
    let text = g.to_string();
    assert!(text.contains("label: golden"));
    assert!(text.contains("marking:"));
    let h: GraphMap = text.parse().unwrap();
    assert_eq!(h, g);
    assert_eq!(h.label(), "golden");
    assert_eq!(h.marking(), g.marking());
}

#[test]
fn path_like_labels_survive_the_text_format() {
    let mut g = golden();
    g.set_label("maps/golden run 2.map");
    let h: GraphMap = g.to_string().parse().unwrap();
    assert_eq!(h, g);
    assert_eq!(h.label(), "maps/golden run 2.map");

    g.set_label("a//b\nc");
    assert_eq!(g.label(), "a/b c");
    let h: GraphMap = g.to_string().parse().unwrap();
    assert_eq!(h.label(), "a/b c");
}

#[test]
fn display_writes_placeholder_for_empty_image() {
    let mut g = GraphMap::new();
    g.add_edge(0, 1, Vec::new()).unwrap();
    let text = g.to_string();
    assert!(text.contains("a: (v0, v1) --> _ // empty image"));
    let h = GraphMap::parse(&text).unwrap();
    assert!(h.image(0).is_empty());
}

#[test]
fn parse_rejects_bad_input() {
    let bad_label = GraphMap::parse("1\n1\nb: (v0, v0) --> a\n").unwrap_err();
    assert!(matches!(bad_label, GraphError::Parse { .. }));
    assert_eq!(bad_label.kind(), ErrorKind::Structural);

    let truncated = GraphMap::parse("2\n1\na: (v0, v0) --> a\n").unwrap_err();
    assert!(matches!(truncated, GraphError::Parse { .. }));

    let discontinuous =
        GraphMap::parse("2\n2\na: (v0, v1) --> a\nb: (v1, v0) --> aa\n").unwrap_err();
    assert!(matches!(discontinuous, GraphError::Structural(_)));

    // the unchecked parser accepts it
    assert!(GraphMap::parse_unchecked("2\n2\na: (v0, v1) --> a\nb: (v1, v0) --> aa\n").is_ok());
}

#[test]
fn fixed_word_must_be_preserved() {
    let text = "2\n1\na: (v0, v0) --> b\nb: (v0, v0) --> ab\nab // fixed word\n";
    let err = GraphMap::parse(text).unwrap_err();
    assert!(matches!(err, GraphError::Structural(_)));
}

#[test]
fn split_edge_subdivides_and_rewrites_images() {
    let mut g = golden();
    let n = g.split_edge(1, 1).unwrap();
    assert_eq!(n, 2);
    assert_eq!(g.edges(), 3);
    assert_eq!(g.vertices(), 2);
    assert_eq!(g.image(0), w("bc").as_slice());
    assert_eq!(g.image(1), w("a").as_slice());
    assert_eq!(g.image(2), w("bc").as_slice());
    assert_eq!((g.start(1), g.end(1)), (0, 1));
    assert_eq!((g.start(2), g.end(2)), (1, 0));
    assert!(g.is_good_map());
    assert_eq!(g.split_edge(1, 5).unwrap_err().kind(), ErrorKind::Invariant);
}

#[test]
fn reverse_edge_twice_is_identity() {
    let g0 = two_vertex_identity();
    let mut g = g0.clone();
    g.reverse_edge(0).unwrap();
    assert_eq!((g.start(0), g.end(0)), (1, 0));
    assert_eq!(g.image(0), w("a").as_slice());
    assert!(g.is_good_map());
    g.reverse_edge(0).unwrap();
    assert_eq!(g, g0);
}

#[test]
fn contract_edge_keeps_homotopy_type() {
    let mut g = two_vertex_identity();
    g.contract_edge(0).unwrap();
    assert_eq!(g.edges(), 2);
    assert_eq!(g.vertices(), 1);
    assert_eq!(g, GraphMap::identity_rose(2).unwrap());
}

#[test]
fn contract_edge_rejects_loops() {
    let mut g = two_vertex_identity();
    let err = g.contract_edge(2).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Invariant);
}

#[test]
fn contract_edge_reports_detached_fixed_word() {
    let mut g = GraphMap::new();
    g.add_edge(0, 1, w("a")).unwrap();
    g.add_edge(0, 0, w("b")).unwrap();
    g.set_fix(w("aA"));
    let err = g.contract_edge(0).unwrap_err();
    assert!(matches!(err, GraphError::Structural(_)));
}

#[test]
fn rose_contracts_to_one_vertex() {
    let mut g = two_vertex_identity();
    g.rose().unwrap();
    assert_eq!(g.vertices(), 1);
    assert_eq!(g.edges(), 2);
    assert!(g.is_good_map());
}

#[test]
fn elementary_fold_identifies_equal_edges() {
    let mut g = GraphMap::new();
    g.add_edge(0, 1, w("c")).unwrap();
    g.add_edge(0, 1, w("c")).unwrap();
    g.add_edge(0, 1, w("c")).unwrap();
    g.elementary_fold(0, 1).unwrap();
    assert_eq!(g.edges(), 2);
    assert_eq!(g.vertices(), 2);
    assert_eq!(g.image(0), w("b").as_slice());
    assert_eq!(g.image(1), w("b").as_slice());

    let mut h = golden();
    assert_eq!(h.elementary_fold(0, 1).unwrap_err().kind(), ErrorKind::Invariant);
}

#[test]
fn join_edges_merges_across_valence_two_vertex() {
    let mut g = golden();
    g.split_edge(1, 1).unwrap();
    let e = g.join_edges(1, 2).unwrap();
    assert_eq!(e, 1);
    assert_eq!(g, golden());
}

#[test]
fn collapse_and_remove_edge_renumber() {
    let mut g = two_vertex_identity();
    g.collapse_edge(0).unwrap();
    assert_eq!(g.vertices(), 1);
    assert_eq!(g.edges(), 2);
    assert_eq!(g.image(0), w("a").as_slice());

    let mut h = two_vertex_identity();
    h.remove_edge(2).unwrap();
    assert_eq!((h.edges(), h.vertices()), (2, 2));
    let mut k = two_vertex_identity();
    k.remove_edge(0).unwrap();
    assert_eq!((k.edges(), k.vertices()), (2, 1));
}

#[test]
fn identify_and_swap_vertices() {
    let mut g = two_vertex_identity();
    g.swap_vertices(0, 1).unwrap();
    assert_eq!((g.start(0), g.end(0)), (1, 0));
    assert_eq!((g.start(2), g.end(2)), (1, 1));
    g.identify_vertices(0, 1).unwrap();
    assert_eq!(g.vertices(), 1);
    assert!(g.swap_vertices(0, 3).is_err());
}

#[test]
fn tighten_reduces_images_and_fixed_word() {
    let mut g = GraphMap::identity_rose(2).unwrap();
    g.set_image(0, w("abBa")).unwrap();
    g.set_fix(w("bAaB"));
    assert!(g.tighten());
    assert_eq!(g.image(0), w("aa").as_slice());
    assert!(g.fix().is_empty());
    assert!(!g.tighten());
}

#[test]
fn tighten_vertex_strips_common_prefix() {
    let mut g = GraphMap::identity_rose(2).unwrap();
    g.set_image(0, w("baB")).unwrap();
    g.set_image(1, w("baaB")).unwrap();
    assert!(g.tighten_vertex());
    assert_eq!(g.image(0), w("a").as_slice());
    assert_eq!(g.image(1), w("aa").as_slice());
    assert!(!g.tighten_vertex());
}

#[test]
fn derivative_and_vertex_queries() {
    let g = golden();
    assert_eq!(g.derivative(Letter::fwd(1)), Some(Letter::fwd(0)));
    assert_eq!(g.derivative(Letter::inv(1)), Some(Letter::inv(1)));
    assert_eq!(g.valence(0), 4);
    assert_eq!(g.star_of_vertex(0), w("aAbB"));
    assert_eq!(g.vertex_map(), vec![0]);
    let ab = g.abelianized();
    assert_eq!(ab.a[(0, 1)], 1);
    assert_eq!(ab.a[(1, 1)], 1);
    assert_eq!(ab.a[(0, 0)], 0);
}

#[test]
fn compose_applies_argument_first() {
    let mut g = golden();
    let h = golden();
    g.compose(&h).unwrap();
    assert_eq!(g.image(0), w("ab").as_slice());
    assert_eq!(g.image(1), w("bab").as_slice());
    let other = two_vertex_identity();
    assert!(g.compose(&other).is_err());
}

#[test]
fn invert_golden_map() {
    let g = golden();
    let mut inv = g.clone();
    assert!(inv.invert().unwrap());
    assert_eq!(inv.image(0), w("bA").as_slice());
    assert_eq!(inv.image(1), w("a").as_slice());
    let mut id = g.clone();
    id.compose(&inv).unwrap();
    assert_eq!(id, GraphMap::identity_rose(2).unwrap());
}

#[test]
fn invert_threads_tree_paths() {
    let g = two_vertex_identity();
    let mut inv = g.clone();
    assert!(inv.invert().unwrap());
    assert_eq!(inv, g);
}

#[test]
fn non_automorphism_is_detected() {
    let mut g = GraphMap::identity_rose(2).unwrap();
    g.set_image(0, w("aa")).unwrap();
    assert!(!g.is_automorphism().unwrap());
    assert!(golden().is_automorphism().unwrap());
}

#[test]
fn spanning_tree_paths_connect_vertices() {
    let g = two_vertex_identity();
    let t = g.spanning_tree(None).unwrap();
    assert_eq!(t.in_tree, vec![true, false, false]);
    assert_eq!(t.paths[0][1], w("a"));
    assert_eq!(t.paths[1][0], w("A"));

    let mut split = GraphMap::new();
    split.add_edge(0, 0, w("a")).unwrap();
    split.add_edge(1, 1, w("b")).unwrap();
    assert!(split.spanning_tree(None).is_err());
}

#[test]
fn identity_from_boundary_words() {
    let g = GraphMap::identity_from_boundary(&w("abAB")).unwrap();
    assert_eq!(g.edges(), 2);
    assert!(g.is_good_map());
    assert!(!g.fix().is_empty());

    let h = GraphMap::identity_from_fixed(&w("abAB")).unwrap();
    assert_eq!(h.vertices(), 1);
    assert_eq!(h.fix(), w("abAB").as_slice());
    assert!(h.is_good_map());

    assert!(GraphMap::identity_from_fixed(&w("aab")).is_err());
}

#[test]
fn latex_lists_every_edge() {
    let mut g = golden();
    g.set_marking(vec![MarkedLoop::new("x", w("a"))]);
    let tex = g.to_latex();
    assert!(tex.contains("\\begin{eqnarray*}"));
    assert_eq!(tex.matches("\\rightarrow").count(), 2);
    assert!(tex.contains("& x: &"));
}

#[test]
fn nielsen_order_prefers_shorter_then_smaller_halves() {
    assert!(nielsen_less(&w("a"), &w("ab")));
    assert!(!nielsen_less(&w("ab"), &w("a")));
    assert!(!nielsen_less(&w("ab"), &w("ab")));
    assert!(nielsen_less(&w("ab"), &w("bb")) || nielsen_less(&w("bb"), &w("ab")));
}

fn letter2() -> impl Strategy<Value = Letter> {
    (0usize..2, any::<bool>()).prop_map(|(i, inv)| Letter::new(i, inv))
}

proptest! {
    #[test]
    fn map_word_is_a_homomorphism(
        u in prop::collection::vec(letter2(), 0..12),
        v in prop::collection::vec(letter2(), 0..12),
    ) {
        let g = golden();
        let mut uv = u.clone();
        uv.extend_from_slice(&v);
        let mut expect = g.map_word(&u);
        expect.extend(g.map_word(&v));
        prop_assert_eq!(g.map_word(&uv), expect);
    }

    #[test]
    fn nielsen_order_is_total_on_distinct_words(
        u in prop::collection::vec(letter2(), 1..6),
        v in prop::collection::vec(letter2(), 1..6),
    ) {
        let a = crate::word::tighten(&u);
        let b = crate::word::tighten(&v);
        prop_assert!(!(nielsen_less(&a, &b) && nielsen_less(&b, &a)));
    }
}

#[test]
fn empty_graph_has_rank_zero() {
    let mut g = GraphMap::new();
    assert_eq!(g.rank(), 0);
    assert!(g.invert().unwrap());
    assert_eq!(GraphMap::identity_rose(0).unwrap().rank(), 0);
    assert_eq!(two_vertex_identity().rank(), 2);
}

#[test]
fn identity_rose_has_identity_transition_matrix() {
    for n in 0..5 {
        let g = GraphMap::identity_rose(n).unwrap();
        assert_eq!(g.transition_matrix(), crate::matrix::IntMatrix::identity(n));
    }
}
