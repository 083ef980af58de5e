use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use treegrant::{
    cache, export,
    report::{LabelCount, Summary},
    Pipeline, PipelineConfig, RuleLemmatizer,
};

/// Join grant applications with their NLP annotations and print the
/// dashboard figures.
#[derive(Debug, Parser)]
#[command(name = "treegrant", version)]
struct Cli {
    /// Grant application table (CSV).
    #[arg(long, value_name = "CSV")]
    projects: PathBuf,

    /// NLP annotation table (CSV).
    #[arg(long, value_name = "CSV")]
    annotations: PathBuf,

    /// Pipeline configuration (.yaml, .yml or .json).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only report on these organizations. Repeatable.
    #[arg(long = "org", value_name = "NAME")]
    orgs: Vec<String>,

    /// Also write the enriched table as JSON.
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Also write the enriched table as Parquet.
    #[arg(long, value_name = "PATH")]
    parquet: Option<PathBuf>,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // ─── 2) configuration ────────────────────────────────────────────
    let cfg = match &cli.config {
        Some(path) => PipelineConfig::from_path(path)?,
        None => PipelineConfig::default(),
    };
    let pipeline = Pipeline::new(cfg);
    info!(fingerprint = %pipeline.fingerprint(), "pipeline ready");

    // ─── 3) build (or reuse) the enriched table ──────────────────────
    let output = cache::global()
        .get_or_build(&pipeline, &cli.projects, &cli.annotations)
        .context("building enriched table")?;

    // ─── 4) optional exports ─────────────────────────────────────────
    if let Some(path) = &cli.json {
        export::write_json(&output, path)?;
    }
    if let Some(path) = &cli.parquet {
        export::write_parquet(&output, path)?;
    }

    // ─── 5) report ───────────────────────────────────────────────────
    let view = output.table.filter_organizations(&cli.orgs);
    let summary = Summary::compute(&view, pipeline.normalizers(), &RuleLemmatizer);
    let report = &output.report;

    println!("Build");
    println!("  join columns:          {}", report.join_columns.join(", "));
    println!("  project rows:          {}", report.project_rows);
    println!(
        "  annotation rows:       {} ({} after de-duplication)",
        report.annotation_rows, report.annotation_rows_deduped
    );
    println!("  conflicting keys:      {}", report.conflicting_keys.len());
    println!("  unmatched projects:    {}", report.unmatched_projects);
    println!("  dropped rows:          {}", report.dropped.len());
    println!("  enriched rows:         {}", report.enriched_rows);
    println!();

    let m = &summary.metrics;
    println!("Key metrics ({} projects)", view.len());
    println!("  trees to be planted:   {}", m.total_trees);
    println!("  organizations:         {}", m.organizations);
    println!("  cities:                {}", m.cities);
    println!("  states:                {}", m.states);
    println!();

    print_counts("Species (more than one project)", &summary.species);
    print_counts("Impact categories", &summary.categories);
    println!(
        "  {} of {} projects ({:.1}%) span more than one category",
        summary.multi_goal.multi_category, summary.multi_goal.projects, summary.multi_goal.percent
    );
    println!();

    println!("Trees per category");
    for row in &summary.trees_per_category {
        println!("  {:<28} {}", row.label, row.trees);
    }
    println!();

    print_counts("Tree types", &summary.tree_types);
    Ok(())
}

fn print_counts(title: &str, rows: &[LabelCount]) {
    println!("{title}");
    if rows.is_empty() {
        println!("  (none)");
    }
    for row in rows {
        println!("  {:<28} {}", row.label, row.count);
    }
    println!();
}
