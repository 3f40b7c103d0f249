//! Manifest and historical metrics loading.
//!
//! Inputs are parsed into typed structures once; graph code never sees raw
//! JSON. Missing or malformed files degrade to empty tables.

use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::path::Path;

use crate::config::AnalyzerConfig;
use crate::error::LoadError;
use crate::logging::{Diagnostic, DiagnosticKind};
use crate::models::{HistoricalSample, Hook, HookCatalog};

#[derive(Deserialize)]
struct RawManifest {
    #[serde(default)]
    hooks: Vec<RawHook>,
}

#[derive(Deserialize)]
struct RawHook {
    name: Option<String>,
    phase: Option<String>,
    #[serde(default, rename = "dependsOn")]
    depends_on: Vec<String>,
    /// Milliseconds.
    timeout: Option<f64>,
}

#[derive(Deserialize)]
struct RawMetrics {
    #[serde(default)]
    hooks: Vec<RawSample>,
}

#[derive(Deserialize)]
struct RawSample {
    name: String,
    duration_ms: Option<f64>,
    p95_duration_ms: Option<f64>,
}

/// Validated manifest content.
#[derive(Clone, Debug, Default)]
pub struct ParsedManifest {
    pub hooks: Vec<Hook>,
    /// Entries skipped during validation.
    pub warnings: Vec<Diagnostic>,
}

/// Parse a manifest document. Entries without a `name` or `phase` are
/// skipped with a warning.
pub fn parse_manifest(json: &str, default_timeout_ms: f64) -> Result<ParsedManifest, LoadError> {
    let raw: RawManifest = serde_json::from_str(json)?;
    let mut parsed = ParsedManifest {
        hooks: Vec::with_capacity(raw.hooks.len()),
        warnings: Vec::new(),
    };

    for (position, entry) in raw.hooks.into_iter().enumerate() {
        let (name, phase) = match (entry.name, entry.phase) {
            (Some(name), Some(phase)) if !name.is_empty() => (name, phase),
            (name, _) => {
                let message = format!(
                    "Manifest entry {} skipped: 'name' and 'phase' are required",
                    position
                );
                tracing::warn!("{}", message);
                parsed.warnings.push(Diagnostic {
                    kind: DiagnosticKind::InvalidHook,
                    hook: name,
                    message,
                });
                continue;
            }
        };

        parsed.hooks.push(Hook {
            name,
            phase,
            depends_on: entry.depends_on,
            timeout_ms: entry.timeout.unwrap_or(default_timeout_ms),
        });
    }

    Ok(parsed)
}

/// Parse a historical metrics document into a name-keyed sample table.
pub fn parse_metrics(json: &str) -> Result<FxHashMap<String, HistoricalSample>, LoadError> {
    let raw: RawMetrics = serde_json::from_str(json)?;
    Ok(raw
        .hooks
        .into_iter()
        .map(|s| {
            (
                s.name,
                HistoricalSample {
                    duration_ms: s.duration_ms,
                    p95_duration_ms: s.p95_duration_ms,
                },
            )
        })
        .collect())
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_manifest(path: &Path, default_timeout_ms: f64) -> Result<ParsedManifest, LoadError> {
    let content = read_file(path)?;
    parse_manifest(&content, default_timeout_ms).map_err(|e| e.at_path(path.to_path_buf()))
}

pub fn read_metrics(path: &Path) -> Result<FxHashMap<String, HistoricalSample>, LoadError> {
    let content = read_file(path)?;
    parse_metrics(&content).map_err(|e| e.at_path(path.to_path_buf()))
}

/// Build a catalog from in-memory documents.
///
/// A malformed manifest yields an empty catalog; malformed metrics yield an
/// empty sample table. Both are logged.
pub fn catalog_from_json(
    manifest_json: &str,
    metrics_json: Option<&str>,
    config: &AnalyzerConfig,
) -> HookCatalog {
    let manifest = parse_manifest(manifest_json, config.default_timeout_ms).unwrap_or_else(|e| {
        tracing::error!("Could not parse manifest, continuing without hooks: {}", e);
        ParsedManifest::default()
    });
    let samples = match metrics_json {
        Some(json) => parse_metrics(json).unwrap_or_else(|e| {
            tracing::error!("Could not parse metrics, continuing without history: {}", e);
            FxHashMap::default()
        }),
        None => FxHashMap::default(),
    };
    HookCatalog::new(manifest.hooks, samples).with_load_warnings(manifest.warnings)
}

/// Load the manifest and optional metrics files into a catalog.
///
/// Missing or unparseable files are logged and replaced by empty tables.
/// Any other I/O failure (permissions, reading a directory) is returned.
pub fn load_catalog(
    manifest_path: &Path,
    metrics_path: Option<&Path>,
    config: &AnalyzerConfig,
) -> Result<HookCatalog, LoadError> {
    let manifest = match read_manifest(manifest_path, config.default_timeout_ms) {
        Ok(manifest) => manifest,
        Err(e) if e.is_not_found() || e.is_malformed() => {
            tracing::error!("{}; continuing without hooks", e);
            ParsedManifest::default()
        }
        Err(e) => return Err(e),
    };

    let samples = match metrics_path {
        None => FxHashMap::default(),
        Some(path) => match read_metrics(path) {
            Ok(samples) => samples,
            Err(e) if e.is_not_found() => {
                tracing::debug!("No historical metrics at {}", path.display());
                FxHashMap::default()
            }
            Err(e) if e.is_malformed() => {
                tracing::error!("{}; continuing without history", e);
                FxHashMap::default()
            }
            Err(e) => return Err(e),
        },
    };

    tracing::debug!(
        hooks = manifest.hooks.len(),
        samples = samples.len(),
        "Loaded analysis inputs"
    );

    Ok(HookCatalog::new(manifest.hooks, samples).with_load_warnings(manifest.warnings))
}
