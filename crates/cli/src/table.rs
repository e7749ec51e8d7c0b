//! Tabular I/O with polars: input entries and exported hull tables.
//!
//! Input CSV columns: `id, a, b, c, energy` (atom counts, eV/atom). Rows with
//! missing values are dropped, as are unknown extra columns.
//! Output columns: `u, v, energy, distance, raw_distance, id, on_hull`.
//! Format follows the extension: `.parquet` or CSV otherwise.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;
use ternhull::formation::{Composition, Entry};
use ternhull::report::PointReport;

pub fn read_entries(path: &Path) -> Result<Vec<Entry>> {
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .finish()
        .and_then(|lf| lf.collect())
        .with_context(|| format!("reading {}", path.display()))?;
    entries_from_frame(&df)
}

pub fn entries_from_frame(df: &DataFrame) -> Result<Vec<Entry>> {
    let ids = df.column("id")?.cast(&DataType::String)?;
    let ids = ids.str()?;
    let numeric = |name: &str| -> Result<Float64Chunked> {
        let s = df
            .column(name)
            .with_context(|| format!("missing column `{name}`"))?
            .cast(&DataType::Float64)?;
        Ok(s.f64()?.clone())
    };
    let (a, b, c, e) = (numeric("a")?, numeric("b")?, numeric("c")?, numeric("energy")?);

    let mut out = Vec::with_capacity(df.height());
    let mut dropped = 0usize;
    for (((id, a), (b, c)), e) in ids
        .into_iter()
        .zip(a.into_iter())
        .zip(b.into_iter().zip(c.into_iter()))
        .zip(e.into_iter())
    {
        match (id, a, b, c, e) {
            (Some(id), Some(a), Some(b), Some(c), Some(e)) => {
                out.push(Entry::new(id, [a, b, c], e));
            }
            _ => dropped += 1,
        }
    }
    if dropped > 0 {
        tracing::warn!(dropped, "rows with missing values dropped");
    }
    Ok(out)
}

pub fn entries_frame(entries: &[Entry]) -> PolarsResult<DataFrame> {
    let ids: Vec<String> = entries.iter().map(|e| e.id.clone()).collect();
    let col = |k: usize| -> Vec<f64> { entries.iter().map(|e| e.counts[k]).collect() };
    let energy: Vec<f64> = entries.iter().map(|e| e.energy).collect();
    df!(
        "id" => ids,
        "a" => col(0),
        "b" => col(1),
        "c" => col(2),
        "energy" => energy,
    )
}

/// One row per report row; `comps` is indexed like the hull points.
pub fn report_frame<'a>(
    comps: &[Composition],
    rows: impl Iterator<Item = &'a PointReport>,
) -> PolarsResult<DataFrame> {
    let rows: Vec<&PointReport> = rows.collect();
    let pick = |f: &dyn Fn(&PointReport) -> f64| -> Vec<f64> { rows.iter().map(|r| f(r)).collect() };
    let u = pick(&|r| comps[r.index].fractions[1]);
    let v = pick(&|r| comps[r.index].fractions[2]);
    let energy = pick(&|r| comps[r.index].energy);
    let distance = pick(&|r| r.distance);
    let raw = pick(&|r| r.raw);
    let ids: Vec<String> = rows.iter().map(|r| comps[r.index].id.clone()).collect();
    let on_hull: Vec<bool> = rows.iter().map(|r| r.on_hull).collect();
    df!(
        "u" => u,
        "v" => v,
        "energy" => energy,
        "distance" => distance,
        "raw_distance" => raw,
        "id" => ids,
        "on_hull" => on_hull,
    )
}

pub fn write_frame(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("parquet") => {
            ParquetWriter::new(file).finish(df)?;
        }
        _ => CsvWriter::new(file).include_header(true).finish(df)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn entries_roundtrip_through_csv_and_drop_nulls() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("in.csv");
        std::fs::write(
            &path,
            "id,a,b,c,energy\n1,1,0,0,-4.0\n2,0,1,0,-5.5\n3,0,0,1,\n4,1,1,1,-4.3\n",
        )
        .unwrap();
        let entries = read_entries(&path).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2], Entry::new("4", [1.0, 1.0, 1.0], -4.3));
    }

    #[test]
    fn missing_column_is_reported() {
        let df = df!("id" => ["1"], "a" => [1.0], "b" => [0.0], "energy" => [-1.0]).unwrap();
        let err = entries_from_frame(&df).unwrap_err();
        assert!(format!("{err:#}").contains("`c`"));
    }

    #[test]
    fn report_frame_has_export_columns() {
        let comps = vec![Composition {
            id: "7".into(),
            fractions: [0.5, 0.25, 0.25],
            energy: -12.0,
        }];
        let rows = [PointReport {
            index: 0,
            distance: 0.0,
            raw: f64::INFINITY,
            on_hull: true,
        }];
        let df = report_frame(&comps, rows.iter()).unwrap();
        let names: Vec<&str> = df.get_column_names().iter().map(|s| s.as_str()).collect();
        assert_eq!(
            names,
            ["u", "v", "energy", "distance", "raw_distance", "id", "on_hull"]
        );
        assert_eq!(df.height(), 1);
    }
}
