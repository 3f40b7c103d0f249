//! Critical path analysis and execution ordering for hook phases.
//!
//! Hooks are named units of work grouped into phases, with dependencies
//! between them. For one phase this crate computes the critical path
//! (forward and backward passes, slack) and suggests an execution order that
//! keeps critical hooks moving while fitting slack-rich hooks around them.
//!
//! ```no_run
//! use std::sync::Arc;
//! use hookpath::{load_catalog, AnalyzerConfig, HookAnalyzer};
//!
//! let config = AnalyzerConfig::default();
//! let catalog = load_catalog("hooks.json".as_ref(), None, &config)?;
//! let analyzer = HookAnalyzer::new(Arc::new(catalog), config);
//! let report = analyzer.analyze_phase("pre-commit");
//! println!("{}", report.to_json()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Allow clippy warning triggered by PyO3 macro expansion
#![cfg_attr(feature = "python", allow(clippy::useless_conversion))]

pub mod analyzer;
mod config;
pub mod critical_path;
mod error;
pub mod estimator;
pub mod graph;
pub mod interner;
pub mod loader;
pub mod logging;
mod models;
pub mod scheduler;
pub mod sorting;

#[cfg(feature = "python")]
mod python;

pub use analyzer::HookAnalyzer;
pub use config::{AnalyzerConfig, DEFAULT_PHASE};
pub use critical_path::{calculate_critical_path, CriticalPathResult, HookTiming};
pub use error::LoadError;
pub use estimator::DurationEstimator;
pub use graph::PhaseGraph;
pub use loader::{catalog_from_json, load_catalog, parse_manifest, parse_metrics};
pub use logging::{Diagnostic, DiagnosticKind, Diagnostics};
pub use models::{
    ExcludedHook, ExclusionReason, HistoricalSample, Hook, HookCatalog, HookMetrics,
    OptimizationCandidate, PhaseAnalysisResult,
};
pub use scheduler::{suggest_order, OrderPlan, Placement};
pub use sorting::{topological_order, TopoOrder};
