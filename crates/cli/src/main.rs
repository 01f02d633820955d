use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;
use traintrack::api::*;

mod batch;
mod provenance;

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Train tracks for free-group automorphisms", version = traintrack::VERSION)]
struct Cmd {
    /// Log engine steps at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Only log warnings
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Turn a map into a train track and print it with its invariants
    Train {
        /// Map file, `-` for stdin
        #[arg(long, default_value = "-")]
        input: String,
        /// Also write the resulting map here, with a provenance sidecar
        #[arg(long)]
        out: Option<PathBuf>,
        /// Keep the marking of the input
        #[arg(long)]
        marking: bool,
        /// Print the gates and infinitesimal edges
        #[arg(long)]
        gates: bool,
        /// Report every round on stderr
        #[arg(long)]
        steps: bool,
        #[arg(long)]
        max_iterations: Option<usize>,
    },
    /// Print stars, transition and homology matrices, and the rose
    Matrices {
        #[arg(long, default_value = "-")]
        input: String,
    },
    /// Print a random automorphism of the rose
    Random {
        #[arg(long, default_value_t = 3)]
        rank: usize,
        #[arg(long, default_value_t = 12)]
        moves: usize,
        #[arg(long, default_value_t = 64)]
        max_len: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 0)]
        index: u64,
    },
    /// Run the engine on many maps and write a CSV or Parquet summary
    Batch {
        #[arg(long, num_args = 1.., required = true)]
        inputs: Vec<String>,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        max_iterations: Option<usize>,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = if cmd.verbose {
        Level::DEBUG
    } else if cmd.quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    match cmd.action {
        Action::Train {
            input,
            out,
            marking,
            gates,
            steps,
            max_iterations,
        } => train(&input, out.as_deref(), marking, gates, steps, max_iterations),
        Action::Matrices { input } => matrices(&input),
        Action::Random {
            rank,
            moves,
            max_len,
            seed,
            index,
        } => random(RandomCfg { rank, moves, max_len }, RandomReplay { seed, index }),
        Action::Batch {
            inputs,
            out,
            max_iterations,
        } => run_batch(&inputs, &out, max_iterations),
        Action::Report => report(),
    }
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut s = String::new();
        std::io::stdin()
            .read_to_string(&mut s)
            .context("reading map from stdin")?;
        Ok(s)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("reading {input}"))
    }
}

fn train_cfg(max_iterations: Option<usize>) -> TrainCfg {
    TrainCfg {
        max_iterations,
        ..TrainCfg::default()
    }
}

fn train(
    input: &str,
    out: Option<&Path>,
    marking: bool,
    show_gates: bool,
    steps: bool,
    max_iterations: Option<usize>,
) -> Result<()> {
    let mut g = GraphMap::parse(&read_input(input)?).with_context(|| format!("parsing {input}"))?;
    if g.label().is_empty() && input != "-" {
        g.set_label(input);
    }
    if !marking {
        g.unmark();
    }
    tracing::info!(input, edges = g.edges(), vertices = g.vertices(), "train");

    let mut t = TrainTrack::with_cfg(g, train_cfg(max_iterations));
    let mut rounds = 0usize;
    let outcome = t.run(
        |e| match e {
            Event::Progress(growth) if steps => {
                rounds += 1;
                eprintln!("round {rounds}: growth rate {growth:.9}");
            }
            Event::Change if steps => eprint!("."),
            _ => {}
        },
        None,
    )?;
    if steps {
        eprintln!();
    }

    println!("{}", t.graph());
    match outcome {
        Outcome::TrainTrack { growth_rate } => {
            let gates = Gates::new(&t);
            if gates.is_pseudo_anosov() {
                println!("// pseudo-Anosov growth rate: {growth_rate:.9}\n");
            } else {
                println!("// non-pseudo-Anosov growth rate: {growth_rate:.9}\n");
            }
            println!("// characteristic polynomial: {}", poly_string(&t.char_poly()?));
            if show_gates {
                println!("// gates");
                println!("{gates}");
            }
        }
        Outcome::Reducible => println!("// map is not irreducible"),
        Outcome::Stopped => println!("// stopped after {rounds} rounds"),
    }
    println!("{}", t.graph().show_vertex_map());

    if let Some(out) = out {
        write_map(out, t.graph())?;
        let payload = provenance::Payload::new(json!({
            "command": "train",
            "marking": marking,
            "max_iterations": max_iterations,
            "outcome": format!("{outcome:?}"),
        }))
        .with_inputs([input.to_string()]);
        provenance::write_sidecar(out, payload)?;
    }
    Ok(())
}

fn write_map(out: &Path, g: &GraphMap) -> Result<()> {
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(out, g.to_string()).with_context(|| format!("writing {}", out.display()))
}

fn print_matrix(title: &str, m: &IntMatrix) {
    println!("// ----- {title} -----");
    println!("{m}");
    println!("// Maple");
    println!("{}", m.to_maple());
    println!("// Mathematica");
    println!("{}", m.to_mathematica());
    println!("// MATLAB");
    println!("{}", m.to_matlab());
}

fn matrices(input: &str) -> Result<()> {
    let mut g = GraphMap::parse(&read_input(input)?).with_context(|| format!("parsing {input}"))?;
    println!("// traintrack {}\n", traintrack::VERSION);
    println!("// --------- original graph ---------");
    println!("{g}");
    println!("// ----------- stars of vertices -----------");
    for v in 0..g.vertices() {
        println!("star of vertex {v}: {}", path_to_string(&g.star_of_vertex(v)));
    }
    println!();
    print_matrix("transition matrix", &g.transition_matrix());
    print_matrix("homology", &g.abelianized());

    println!("// --------- rose ---------");
    g.rose()?;
    println!("{g}");
    print_matrix("homology", &g.abelianized());
    Ok(())
}

fn random(cfg: RandomCfg, tok: RandomReplay) -> Result<()> {
    tracing::info!(rank = cfg.rank, moves = cfg.moves, seed = tok.seed, index = tok.index, "random");
    let g = random_automorphism(cfg, tok)?;
    print!("{g}");
    Ok(())
}

fn run_batch(inputs: &[String], out: &Path, max_iterations: Option<usize>) -> Result<()> {
    let rows = batch::run_files(inputs, train_cfg(max_iterations))?;
    let mut df = batch::to_frame(&rows)?;
    tracing::info!(rows = df.height(), cols = df.width(), out = %out.display(), "batch summary");
    batch::write_table(&mut df, out)?;
    let failed = rows.iter().filter(|r| r.outcome == "error").count();
    let payload = provenance::Payload::new(json!({
        "command": "batch",
        "max_iterations": max_iterations,
        "failed": failed,
        "rows": rows,
    }))
    .with_inputs(inputs.iter().cloned());
    provenance::write_sidecar(out, payload)?;
    Ok(())
}

fn report() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&provenance::describe())?);
    Ok(())
}
