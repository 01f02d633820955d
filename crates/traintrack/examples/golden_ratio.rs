//! Golden-ratio automorphism `a -> BA, b -> abb` on the rose.
//!
//! Purpose
//! - Show the full pipeline on a map that is not yet a train track: parse,
//!   run the engine with an event callback, then print the train track, its
//!   growth rate, and its gates.
//!
//! Run with `cargo run -p traintrack --example golden_ratio`.

use traintrack::prelude::*;

const INPUT: &str = "\
2 // number of edges
1 // number of vertices
a: (v0, v0) --> BA
b: (v0, v0) --> abb

label: golden
";

fn main() -> Result<(), GraphError> {
    let g = GraphMap::parse(INPUT)?;
    let mut t = TrainTrack::new(g);
    let mut rounds = 0;
    let outcome = t.run(
        |e| {
            if let Event::Progress(lambda) = e {
                rounds += 1;
                println!("round {rounds}: growth {lambda:.6}");
            }
        },
        None,
    )?;
    print!("{}", t.graph());
    match outcome {
        Outcome::TrainTrack { growth_rate } => {
            println!("train track, growth rate {growth_rate:.9}");
            println!("char poly: {}", poly_string(&t.char_poly()?));
            let gates = Gates::new(&t);
            println!("pseudo-Anosov: {}", gates.is_pseudo_anosov());
            print!("{gates}");
        }
        Outcome::Reducible => println!("map is not irreducible"),
        Outcome::Stopped => println!("stopped"),
    }
    Ok(())
}
