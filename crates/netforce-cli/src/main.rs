//! netforce CLI - force-directed layout of graphs described in JSON.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use netforce_layout::{run_layout, svg, LayoutContext};
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

mod config;
mod graph_file;

use config::{AlgorithmKind, Config};
use graph_file::GraphFile;

/// netforce - lay out graphs with a Barnes-Hut force simulation.
///
/// Positions are written as JSON (`{"vertex": [x, y]}`).
#[derive(Parser, Debug)]
#[command(
    name = "netforce",
    author,
    version,
    about = "netforce: force-directed graph layout",
    long_about = None
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// JSON layout configuration (partial documents are fine).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Force model, overriding the configuration.
    #[arg(short, long, global = true, value_enum)]
    algorithm: Option<AlgorithmKind>,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Lay out a graph file.
    Layout {
        /// Graph description in JSON.
        graph: PathBuf,

        /// Maximum number of iterations.
        #[arg(long)]
        max_iterations: Option<usize>,

        /// Wall-clock budget in seconds.
        #[arg(long)]
        timeout: Option<f64>,

        /// Seed for random initial placement.
        #[arg(long)]
        seed: Option<u64>,

        /// Write positions here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write a debug SVG.
        #[arg(long)]
        svg: Option<PathBuf>,
    },

    /// Print the effective configuration as JSON.
    Params,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing based on verbosity; RUST_LOG adds to it
    let level = if cli.quiet {
        LevelFilter::ERROR
    } else if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(kind) = cli.algorithm {
        config.set_algorithm(kind);
    }

    match cli.command {
        Commands::Layout {
            graph,
            max_iterations,
            timeout,
            seed,
            output,
            svg,
        } => {
            if let Some(n) = max_iterations {
                config.layout.simulation.max_iterations = n;
            }
            if let Some(t) = timeout {
                config.layout.simulation.timeout_seconds = Some(t);
            }
            if let Some(seed) = seed {
                config.set_seed(seed);
            }
            lay_out_file(&config, &graph, output.as_deref(), svg.as_deref())?;
        }

        Commands::Params => {
            config.layout.validate()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn lay_out_file(
    config: &Config,
    graph_path: &Path,
    output: Option<&Path>,
    svg_path: Option<&Path>,
) -> Result<()> {
    let file = GraphFile::read(graph_path)?;
    let mut context = LayoutContext::new(&file.graph());
    context.apply_request(file.request());
    let (context, stats) = run_layout(context, &config.layout)
        .with_context(|| format!("Layout of {} failed", graph_path.display()))?;
    let positions = context.positions();

    info!(
        vertices = positions.len(),
        iterations = stats.iterations,
        stop_reason = ?stats.stop_reason,
        energy = stats.energy,
        "layout done"
    );

    let json = graph_file::positions_json(&positions)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write positions to {}", path.display()))?;
            println!(
                "Wrote {} positions to {} ({} iterations, {:?})",
                positions.len(),
                path.display(),
                stats.iterations,
                stats.stop_reason
            );
        }
        None => println!("{json}"),
    }

    if let Some(path) = svg_path {
        svg::write_svg(path, context.vertex_edges(), &positions, |v| v.clone())
            .with_context(|| format!("Failed to write SVG to {}", path.display()))?;
    }

    Ok(())
}
