//! `hookpath` - critical path analysis for hook phases.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use hookpath::logging::{init_logging, VERBOSITY_DEBUG, VERBOSITY_SILENT};
use hookpath::{load_catalog, AnalyzerConfig, HookAnalyzer, PhaseAnalysisResult, DEFAULT_PHASE};

#[derive(Parser, Debug)]
#[command(name = "hookpath")]
#[command(about = "Critical path and execution order analysis for hook phases", long_about = None)]
struct Cli {
    /// Phase to analyze
    #[arg(long, default_value = DEFAULT_PHASE)]
    phase: String,

    /// Hook manifest (JSON)
    #[arg(long, default_value = "hooks.json")]
    manifest: PathBuf,

    /// Historical duration metrics (JSON)
    #[arg(long)]
    metrics: Option<PathBuf>,

    /// Analyze every phase in the manifest, sorted by name
    #[arg(long)]
    all_phases: bool,

    /// Verbose logging
    #[arg(long)]
    debug: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn print_result(result: &PhaseAnalysisResult, pretty: bool) -> Result<()> {
    let json = if pretty {
        result.to_json_pretty()?
    } else {
        result.to_json()?
    };
    println!("{}", json);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug)?;

    let verbosity = if cli.debug {
        VERBOSITY_DEBUG
    } else {
        VERBOSITY_SILENT
    };
    let config = AnalyzerConfig::default().with_verbosity(verbosity);
    let catalog = load_catalog(&cli.manifest, cli.metrics.as_deref(), &config)?;
    let analyzer = HookAnalyzer::new(Arc::new(catalog), config);

    if cli.all_phases {
        for result in analyzer.analyze_all_phases() {
            print_result(&result, cli.pretty)?;
        }
    } else {
        print_result(&analyzer.analyze_phase(&cli.phase), cli.pretty)?;
    }

    Ok(())
}
