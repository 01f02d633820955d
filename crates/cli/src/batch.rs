//! Batch runs: one engine run per input file, summarized as a table.

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;
use std::fs::{self, File};
use std::path::Path;
use traintrack::api::*;

/// One line of the summary table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Row {
    pub file: String,
    pub edges: u32,
    pub vertices: u32,
    /// `train_track`, `reducible`, `stopped`, or `error`.
    pub outcome: String,
    pub growth_rate: Option<f64>,
    pub char_poly: Option<String>,
    pub error: Option<String>,
}

impl Row {
    fn failed(file: &str, err: impl std::fmt::Display) -> Self {
        Self {
            file: file.to_string(),
            edges: 0,
            vertices: 0,
            outcome: "error".to_string(),
            growth_rate: None,
            char_poly: None,
            error: Some(err.to_string()),
        }
    }
}

/// Run the engine on one serialized map. Parse and engine errors end up in
/// the row instead of aborting the batch.
pub fn summarize(file: &str, text: &str, cfg: TrainCfg) -> Row {
    let mut g = match GraphMap::parse(text) {
        Ok(g) => g,
        Err(e) => {
            tracing::warn!(file, error = %e, "skipping unreadable map");
            return Row::failed(file, e);
        }
    };
    g.unmark();
    let mut t = TrainTrack::with_cfg(g, cfg);
    let outcome = match t.run(|_| {}, None) {
        Ok(o) => o,
        Err(e) => return Row::failed(file, e),
    };
    let (name, growth_rate, char_poly) = match outcome {
        Outcome::TrainTrack { growth_rate } => (
            "train_track",
            Some(growth_rate),
            t.char_poly().ok().map(|p| poly_string(&p)),
        ),
        Outcome::Reducible => ("reducible", None, None),
        Outcome::Stopped => ("stopped", None, None),
    };
    tracing::info!(file, outcome = name, growth = ?growth_rate, "batch item");
    Row {
        file: file.to_string(),
        edges: t.graph().edges() as u32,
        vertices: t.graph().vertices() as u32,
        outcome: name.to_string(),
        growth_rate,
        char_poly,
        error: None,
    }
}

pub fn run_files(inputs: &[String], cfg: TrainCfg) -> Result<Vec<Row>> {
    inputs
        .iter()
        .map(|path| {
            let text = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
            Ok(summarize(path, &text, cfg))
        })
        .collect()
}

pub fn to_frame(rows: &[Row]) -> PolarsResult<DataFrame> {
    df!(
        "file" => rows.iter().map(|r| r.file.clone()).collect::<Vec<_>>(),
        "edges" => rows.iter().map(|r| r.edges).collect::<Vec<_>>(),
        "vertices" => rows.iter().map(|r| r.vertices).collect::<Vec<_>>(),
        "outcome" => rows.iter().map(|r| r.outcome.clone()).collect::<Vec<_>>(),
        "growth_rate" => rows.iter().map(|r| r.growth_rate).collect::<Vec<_>>(),
        "char_poly" => rows.iter().map(|r| r.char_poly.clone()).collect::<Vec<_>>(),
        "error" => rows.iter().map(|r| r.error.clone()).collect::<Vec<_>>()
    )
}

/// Write CSV, or Parquet when the extension says so.
pub fn write_table(df: &mut DataFrame, out: &Path) -> Result<()> {
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
    match out.extension().and_then(|e| e.to_str()) {
        Some("parquet") => {
            ParquetWriter::new(file).finish(df)?;
        }
        _ => {
            let mut file = file;
            CsvWriter::new(&mut file).finish(df)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const GOLDEN: &str = "2\n1\na: (v0, v0) --> BA\nb: (v0, v0) --> abb\n";
    const IDENTITY: &str = "2\n1\na: (v0, v0) --> a\nb: (v0, v0) --> b\n";

    #[test]
    fn summarize_reports_outcomes() {
        let row = summarize("golden", GOLDEN, TrainCfg::default());
        assert_eq!(row.outcome, "train_track");
        assert!((row.growth_rate.unwrap() - 1.618_033_988_749_895).abs() < 1e-6);
        assert_eq!(row.char_poly.as_deref(), Some("x^2-x-1"));

        let row = summarize("identity", IDENTITY, TrainCfg::default());
        assert_eq!(row.outcome, "reducible");
        assert_eq!(row.growth_rate, None);

        let row = summarize("broken", "2\n1\na: (v0, v0) --> c\n", TrainCfg::default());
        assert_eq!(row.outcome, "error");
        assert!(row.error.is_some());
    }

    #[test]
    fn batch_writes_csv_table() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("golden.map");
        let b = dir.path().join("identity.map");
        fs::write(&a, GOLDEN).unwrap();
        fs::write(&b, IDENTITY).unwrap();
        let inputs = vec![
            a.to_string_lossy().into_owned(),
            b.to_string_lossy().into_owned(),
        ];
        let rows = run_files(&inputs, TrainCfg::default()).unwrap();
        let mut df = to_frame(&rows).unwrap();
        assert_eq!(df.shape(), (2, 7));

        let out = dir.path().join("out/summary.csv");
        write_table(&mut df, &out).unwrap();
        let back = LazyCsvReader::new(&out)
            .with_infer_schema_length(Some(100))
            .finish()
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(back.height(), 2);
        let text = fs::read_to_string(&out).unwrap();
        assert!(text.starts_with("file,edges,vertices,outcome,growth_rate,char_poly,error"));
        assert!(text.contains("train_track"));
        assert!(text.contains("reducible"));
    }

    #[test]
    fn batch_writes_parquet_table() {
        let dir = tempdir().unwrap();
        let rows = vec![summarize("golden", GOLDEN, TrainCfg::default())];
        let mut df = to_frame(&rows).unwrap();
        let out = dir.path().join("summary.parquet");
        write_table(&mut df, &out).unwrap();
        assert!(fs::metadata(&out).unwrap().len() > 0);
    }
}
