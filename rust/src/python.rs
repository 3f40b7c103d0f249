//! Python bindings, built with the `python` feature.

use pyo3::prelude::*;
use std::sync::Arc;

use crate::analyzer::HookAnalyzer;
use crate::config::{AnalyzerConfig, DEFAULT_PHASE};
use crate::loader::catalog_from_json;
use crate::models::PhaseAnalysisResult;

/// Phase analysis report (read-only).
#[pyclass(name = "PhaseReport", frozen)]
#[derive(Clone, Debug)]
pub struct PyPhaseReport {
    #[pyo3(get)]
    pub phase: String,
    #[pyo3(get)]
    pub critical_path: Vec<String>,
    #[pyo3(get)]
    pub critical_path_length: f64,
    #[pyo3(get)]
    pub total_hooks: usize,
    #[pyo3(get)]
    pub critical_hooks: usize,
    #[pyo3(get)]
    pub speedup_potential: f64,
    #[pyo3(get)]
    pub optimal_order: Vec<String>,
    #[pyo3(get)]
    pub parallelizable_count: usize,
    /// (name, duration_ms, slack_ms)
    #[pyo3(get)]
    pub optimization_candidates: Vec<(String, f64, f64)>,
    #[pyo3(get)]
    pub excluded: Vec<String>,
    #[pyo3(get)]
    pub warnings: Vec<String>,
    json: String,
}

impl PyPhaseReport {
    fn from_result(result: &PhaseAnalysisResult) -> PyResult<Self> {
        let json = result
            .to_json()
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;
        Ok(Self {
            phase: result.phase.clone(),
            critical_path: result.critical_path.clone(),
            critical_path_length: result.critical_path_length,
            total_hooks: result.total_hooks,
            critical_hooks: result.critical_hooks,
            speedup_potential: result.speedup_potential,
            optimal_order: result.optimal_order.clone(),
            parallelizable_count: result.parallelizable_count,
            optimization_candidates: result
                .optimization_candidates
                .iter()
                .map(|c| (c.name.clone(), c.duration_ms, c.slack_ms))
                .collect(),
            excluded: result.excluded.iter().map(|e| e.name.clone()).collect(),
            warnings: result.warnings.iter().map(|w| w.message.clone()).collect(),
            json,
        })
    }
}

#[pymethods]
impl PyPhaseReport {
    /// Full report, including per-hook metrics, as a JSON string.
    fn to_json(&self) -> String {
        self.json.clone()
    }

    fn __repr__(&self) -> String {
        format!(
            "PhaseReport(phase={:?}, total_hooks={}, critical_path_length={}, speedup_potential={:.3})",
            self.phase, self.total_hooks, self.critical_path_length, self.speedup_potential
        )
    }
}

fn make_analyzer(manifest_json: &str, metrics_json: Option<&str>, verbosity: u8) -> HookAnalyzer {
    let config = AnalyzerConfig::default().with_verbosity(verbosity);
    let catalog = catalog_from_json(manifest_json, metrics_json, &config);
    HookAnalyzer::new(Arc::new(catalog), config)
}

/// Analyze one phase of a hook manifest.
///
/// # Arguments
/// * `manifest_json` - Manifest document (`{"hooks": [...]}`)
/// * `phase` - Phase to analyze
/// * `metrics_json` - Optional historical metrics document
/// * `verbosity` - 0=silent .. 3=debug
#[pyfunction]
#[pyo3(signature = (manifest_json, phase=DEFAULT_PHASE.to_string(), metrics_json=None, verbosity=0))]
fn analyze_phase(
    manifest_json: &str,
    phase: String,
    metrics_json: Option<&str>,
    verbosity: u8,
) -> PyResult<PyPhaseReport> {
    let analyzer = make_analyzer(manifest_json, metrics_json, verbosity);
    PyPhaseReport::from_result(&analyzer.analyze_phase(&phase))
}

/// Analyze every phase of a hook manifest, in sorted phase order.
#[pyfunction]
#[pyo3(signature = (manifest_json, metrics_json=None, verbosity=0))]
fn analyze_all_phases(
    manifest_json: &str,
    metrics_json: Option<&str>,
    verbosity: u8,
) -> PyResult<Vec<PyPhaseReport>> {
    let analyzer = make_analyzer(manifest_json, metrics_json, verbosity);
    analyzer
        .analyze_all_phases()
        .iter()
        .map(PyPhaseReport::from_result)
        .collect()
}

/// The hookpath Python module.
#[pymodule]
fn hookpath(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyPhaseReport>()?;
    m.add_function(wrap_pyfunction!(analyze_phase, m)?)?;
    m.add_function(wrap_pyfunction!(analyze_all_phases, m)?)?;
    Ok(())
}
