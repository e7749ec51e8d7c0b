mod provenance;
mod table;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use ternhull::api::{
    compute_distances_par, draw_entries, formation_points, keep_non_positive, reference_states,
    Composition, DistanceCfg, DistancePolicy, Hull, HullReport, SampleCfg, SampleReplay,
};
use ternhull::cfg::PROBLEM_TOL;
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;

use crate::provenance::{write_sidecar, Payload};

#[derive(Parser)]
#[command(name = "ternhull")]
#[command(about = "Ternary convex hulls and energy above hull")]
struct Cmd {
    /// Optional run tag; propagated to sidecars and logs
    #[arg(long)]
    tag: Option<String>,

    /// Log at debug level
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Build the hull of an entry table and export energies above hull
    Hull(HullArgs),
    /// Write a synthetic ternary entry table
    Generate(GenerateArgs),
    /// Print a small provenance JSON block
    Report,
}

#[derive(Args, Debug, Clone)]
struct HullArgs {
    /// CSV with columns id,a,b,c,energy (atom counts, eV/atom)
    #[arg(long)]
    input: PathBuf,
    /// Output table; `.parquet` or CSV
    #[arg(long)]
    out: PathBuf,
    /// Keep rows with distance <= dmax (meV/atom); `inf` keeps everything
    #[arg(long, default_value_t = 100.0)]
    dmax: f64,
    /// Facet selection: `lowest` or `contained`
    #[arg(long, default_value = "lowest")]
    policy: DistancePolicy,
    /// Vertical, boundary and inclusion tolerance
    #[arg(long, default_value_t = PROBLEM_TOL)]
    tol: f64,
    /// Evaluate distances on the rayon pool
    #[arg(long)]
    parallel: bool,
    /// Component labels used in logs
    #[arg(long, value_delimiter = ',', default_value = "A,B,C")]
    labels: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct GenerateArgs {
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(long, default_value_t = 0)]
    index: u64,
    /// Entries besides the three references
    #[arg(long, default_value_t = 200)]
    count: usize,
    #[arg(long, default_value_t = 8)]
    max_atoms: u32,
    #[arg(long)]
    out: PathBuf,
}

#[derive(Debug, Serialize)]
struct HullSummary {
    entries: usize,
    kept: usize,
    vertices: Vec<String>,
    facets: usize,
    exported: usize,
    problems: usize,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = if cmd.verbose { Level::DEBUG } else { Level::INFO };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .init();
    match cmd.action {
        Action::Hull(args) => hull(&args, cmd.tag).map(|_| ()),
        Action::Generate(args) => generate(&args, cmd.tag),
        Action::Report => report(cmd.tag),
    }
}

fn hull(args: &HullArgs, tag: Option<String>) -> Result<HullSummary> {
    tracing::info!(input = %args.input.display(), out = %args.out.display(), policy = ?args.policy, tag = ?tag, "hull");
    let summary = run_hull(args)?;
    let params = json!({
        "dmax": args.dmax,
        "policy": format!("{:?}", args.policy),
        "tol": args.tol,
        "parallel": args.parallel,
        "labels": args.labels,
        "summary": summary,
    });
    let payload = Payload::new(params)?.with_input(&args.input).with_tag(tag);
    let sidecar = write_sidecar(&args.out, &payload)?;
    tracing::debug!(sidecar = %sidecar.display(), "provenance written");
    Ok(summary)
}

fn run_hull(args: &HullArgs) -> Result<HullSummary> {
    if args.labels.len() != 3 {
        bail!("expected 3 component labels, got {}", args.labels.len());
    }
    if args.dmax.is_nan() {
        bail!("dmax must be a number");
    }

    let entries = table::read_entries(&args.input)?;
    tracing::info!(rows = entries.len(), "entries read");
    let refs = reference_states(&entries).context("locating reference states")?;
    for (label, &r) in args.labels.iter().zip(&refs) {
        tracing::info!(component = %label, id = %entries[r].id, energy = entries[r].energy, "reference state");
    }

    let comps = keep_non_positive(formation_points(&entries, refs)?);
    let points: Vec<_> = comps.iter().map(Composition::point).collect();
    let hull = Hull::build(&points).context("building hull")?;
    let vertices: Vec<String> = hull.vertices().iter().map(|&i| comps[i].id.clone()).collect();
    tracing::info!(vertices = ?vertices, facets = hull.facets().len(), "hull built");

    let cfg = DistanceCfg::uniform(args.tol);
    let report = if args.parallel {
        let raw = compute_distances_par(hull.points(), hull.facets(), args.policy, &cfg);
        HullReport::from_raw(&hull, &raw, &cfg)
    } else {
        HullReport::new(&hull, args.policy, &cfg)
    };
    for p in &report.problems {
        tracing::warn!(
            id = %comps[p.index].id,
            u = p.composition.x,
            v = p.composition.y,
            distance = p.distance,
            facets = ?p.containing_facets,
            "problematic point"
        );
    }

    let mut df = table::report_frame(&comps, report.within(args.dmax))?;
    let exported = df.height();
    table::write_frame(&mut df, &args.out)?;
    tracing::info!(exported, dmax = args.dmax, "table written");

    Ok(HullSummary {
        entries: entries.len(),
        kept: comps.len(),
        vertices,
        facets: hull.facets().len(),
        exported,
        problems: report.problems.len(),
    })
}

fn generate(args: &GenerateArgs, tag: Option<String>) -> Result<()> {
    let cfg = SampleCfg {
        count: args.count,
        max_atoms: args.max_atoms,
        ..SampleCfg::default()
    };
    let tok = SampleReplay {
        seed: args.seed,
        index: args.index,
    };
    let entries = draw_entries(cfg, tok)?;
    let mut df = table::entries_frame(&entries)?;
    table::write_frame(&mut df, &args.out)?;
    tracing::info!(rows = entries.len(), out = %args.out.display(), "dataset written");

    let params = json!({
        "seed": args.seed,
        "index": args.index,
        "count": args.count,
        "max_atoms": args.max_atoms,
    });
    write_sidecar(&args.out, &Payload::new(params)?.with_tag(tag))?;
    Ok(())
}

fn report(tag: Option<String>) -> Result<()> {
    let payload = Payload::new(json!({}))?.with_tag(tag);
    let doc = provenance::document(&payload, &[] as &[&Path]);
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
