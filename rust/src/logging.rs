//! Logging macros and per-run diagnostics.
//!
//! Verbosity levels:
//! - 0: SILENT (warnings only)
//! - 1: CHANGES (pass results, ordering decisions)
//! - 2: CHECKS (readiness checks, skip reasons)
//! - 3: DEBUG (full algorithm internals)
//!
//! Warnings raised during an analysis go through a [`Diagnostics`] handle
//! owned by that analysis call, so concurrent calls never share log state
//! and every warning is also returned to the caller.

use serde::Serialize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_CHANGES: u8 = 1;
pub const VERBOSITY_CHECKS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log at CHANGES level (verbosity >= 1).
#[macro_export]
macro_rules! log_changes {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHANGES {
            tracing::info!($($arg)*);
        }
    };
}

/// Log at CHECKS level (verbosity >= 2).
#[macro_export]
macro_rules! log_checks {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHECKS {
            tracing::debug!($($arg)*);
        }
    };
}

/// Log at DEBUG level (verbosity >= 3).
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            tracing::trace!($($arg)*);
        }
    };
}

/// Filter used when `RUST_LOG` is unset. `log_debug!` emits at trace level,
/// so debug mode has to let trace events through.
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "hookpath=trace"
    } else {
        "hookpath=info"
    }
}

/// Install the stderr subscriber used by the binary.
///
/// `RUST_LOG` wins when set; otherwise [`default_directive`].
pub fn init_logging(debug: bool) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .try_init()?;

    Ok(())
}

/// Category of a recoverable problem found during analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    EmptyPhase,
    ForwardCycle,
    BackwardCycle,
    OrderingCycle,
    SchedulingDeadlock,
    DuplicateHook,
    InvalidHook,
}

/// A warning recorded during one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hook: Option<String>,
    pub message: String,
}

/// Diagnostics handle scoped to a single analysis run.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    phase: String,
    verbosity: u8,
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new(phase: &str, verbosity: u8) -> Self {
        Self {
            phase: phase.to_string(),
            verbosity,
            records: Vec::new(),
        }
    }

    #[inline]
    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    pub fn phase(&self) -> &str {
        &self.phase
    }

    /// Emit a warning event and record it for the caller.
    pub fn warn(&mut self, kind: DiagnosticKind, hook: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(phase = %self.phase, hook = hook.unwrap_or("-"), ?kind, "{}", message);
        self.records.push(Diagnostic {
            kind,
            hook: hook.map(str::to_string),
            message,
        });
    }

    /// Record warnings raised before this run (while loading the catalog).
    /// They were logged when they happened and are not emitted again.
    pub fn carry(&mut self, earlier: &[Diagnostic]) {
        self.records.extend_from_slice(earlier);
    }

    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.records.iter().filter(|d| d.kind == kind).count()
    }

    pub fn into_records(self) -> Vec<Diagnostic> {
        self.records
    }
}
