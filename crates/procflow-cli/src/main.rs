//! Procflow CLI
//!
//! Command-line host for the process-flow visual:
//! - `render`: fetch a table in segments, aggregate it and emit DOT or JSON
//! - `paths`: list the ranked path variants of a table
//! - `settings`: show the enumerated visual settings and their defaults

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use procflow_cli::binding::ColumnBinding;
use procflow_cli::render::{path_report, render_dot, render_json, render_path_text, RenderFormat};
use procflow_cli::source::{load_table, PagedTable, TableFormat};
use procflow_cli::viewport::Viewport;
use procflow_cli::visual::aggregate_table;
use procflow_cli::{Visual, VisualSettings};

const LOG_ENV: &str = "PROCFLOW_LOG";
const MAX_ISSUES_SHOWN: usize = 10;

#[derive(Parser)]
#[command(name = "procflow")]
#[command(author, version, about = "Procflow: process-flow graphs from case tables")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate a table into a process-flow graph and render it.
    Render {
        /// Input table (CSV with a header row, or a `{columns, rows}` JSON table).
        input: PathBuf,

        /// Output format: dot|json.
        #[arg(long, default_value = "dot")]
        format: String,

        /// Write to a file instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Bind a role to a column, e.g. `--bind caseId="Order No"`. Repeatable.
        #[arg(long = "bind", value_name = "ROLE=COLUMN")]
        bind: Vec<String>,

        /// Hide edges whose percentage of cases is below this (0..=100).
        #[arg(long)]
        threshold: Option<f64>,

        /// Settings JSON (`{"relationships": {"percentageThreshold": 20}}`).
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Rows per host segment.
        #[arg(long, default_value_t = 30_000)]
        segment_rows: usize,

        /// Host memory ceiling in rows; fetching stops before exceeding it.
        #[arg(long)]
        max_rows: Option<usize>,

        /// Viewport used for the fit transform, WIDTHxHEIGHT.
        #[arg(long, default_value = "1280x720")]
        viewport: String,

        /// Input format: csv|json (default: from the file extension).
        #[arg(long)]
        input_format: Option<String>,
    },

    /// List path variants, most frequent first. Rank 1 is the happy path.
    Paths {
        input: PathBuf,

        #[arg(long = "bind", value_name = "ROLE=COLUMN")]
        bind: Vec<String>,

        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,

        /// Show at most this many variants.
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long)]
        input_format: Option<String>,
    },

    /// Show the visual settings with their current and default values.
    Settings {
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Only enumerate this settings object (relationships|view).
        #[arg(long)]
        object: Option<String>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            input,
            format,
            out,
            bind,
            threshold,
            settings,
            segment_rows,
            max_rows,
            viewport,
            input_format,
        } => cmd_render(RenderArgs {
            input: &input,
            format: RenderFormat::parse(&format)?,
            out: out.as_deref(),
            bind: &bind,
            threshold,
            settings: settings.as_deref(),
            segment_rows,
            max_rows,
            viewport: Viewport::parse(&viewport)?,
            input_format: input_format.as_deref(),
        }),
        Commands::Paths {
            input,
            bind,
            json,
            limit,
            input_format,
        } => cmd_paths(&input, &bind, json, limit, input_format.as_deref()),
        Commands::Settings { settings, object } => cmd_settings(settings.as_deref(), object.as_deref()),
    }
}

struct RenderArgs<'a> {
    input: &'a Path,
    format: RenderFormat,
    out: Option<&'a Path>,
    bind: &'a [String],
    threshold: Option<f64>,
    settings: Option<&'a Path>,
    segment_rows: usize,
    max_rows: Option<usize>,
    viewport: Viewport,
    input_format: Option<&'a str>,
}

fn table_format(input: &Path, explicit: Option<&str>) -> Result<TableFormat> {
    match explicit {
        Some(f) => TableFormat::parse(f),
        None => Ok(TableFormat::from_path(input)),
    }
}

fn load_settings(path: Option<&Path>) -> Result<VisualSettings> {
    Ok(match path {
        Some(p) => VisualSettings::load(p)?,
        None => VisualSettings::default(),
    })
}

fn cmd_render(args: RenderArgs<'_>) -> Result<()> {
    let binding = ColumnBinding::with_overrides(args.bind)?;
    let table = load_table(args.input, table_format(args.input, args.input_format)?, &binding)?;

    let mut settings = load_settings(args.settings)?;
    if let Some(t) = args.threshold {
        settings = settings.with_threshold(t)?;
    }

    let mut source = PagedTable::new(table, args.segment_rows, args.max_rows);
    let mut visual = Visual::new(settings);
    let outcome = visual.update(&mut source, args.viewport)?;

    for issue in outcome.issues.iter().take(MAX_ISSUES_SHOWN) {
        eprintln!("{} {issue}", "warn".yellow().bold());
    }
    if outcome.issues.len() > MAX_ISSUES_SHOWN {
        eprintln!(
            "{} ... {} more data-quality issue(s)",
            "warn".yellow().bold(),
            outcome.issues.len() - MAX_ISSUES_SHOWN
        );
    }

    let rendered = match args.format {
        RenderFormat::Dot => render_dot(&outcome.graph),
        RenderFormat::Json => render_json(&outcome)?,
    };

    let status = if outcome.fetch.is_partial() {
        outcome.status.yellow().bold()
    } else {
        "ok".green().bold()
    };
    match args.out {
        Some(path) => {
            fs::write(path, rendered)?;
            eprintln!("{} {}", "wrote".green().bold(), path.display().to_string().bold());
        }
        None => print!("{rendered}"),
    }
    eprintln!(
        "{} {} nodes, {} edges ({} hidden), {} cases, {} path variant(s)",
        status,
        outcome.graph.nodes.len(),
        outcome.graph.edges.len(),
        outcome.graph.summary.filtered_edges,
        outcome.graph.summary.cases,
        outcome.graph.summary.path_variants
    );
    if !outcome.fetch.is_partial() {
        eprintln!("{}", outcome.status.dimmed());
    }
    Ok(())
}

fn cmd_paths(
    input: &Path,
    bind: &[String],
    json: bool,
    limit: Option<usize>,
    input_format: Option<&str>,
) -> Result<()> {
    let binding = ColumnBinding::with_overrides(bind)?;
    let table = load_table(input, table_format(input, input_format)?, &binding)?;
    let (model, issues) = aggregate_table(&table)?;
    if !issues.is_empty() {
        eprintln!("{} {} data-quality issue(s)", "warn".yellow().bold(), issues.len());
    }

    let report = path_report(&model, limit);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_path_text(&report));
    }
    Ok(())
}

fn cmd_settings(path: Option<&Path>, object: Option<&str>) -> Result<()> {
    let settings = load_settings(path)?;
    let props = match object {
        Some(o) => settings.enumerate(o),
        None => settings.enumerate_all(),
    };
    if props.is_empty() {
        eprintln!("{} no settings object `{}`", "warn".yellow().bold(), object.unwrap_or(""));
        return Ok(());
    }
    for p in props {
        let marker = if p.value == p.default { "" } else { " (changed)" };
        println!(
            "{}.{} = {}  [default {}]{}",
            p.object,
            p.property.bold(),
            p.value,
            p.default,
            marker.yellow()
        );
    }
    Ok(())
}
