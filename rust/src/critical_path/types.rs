//! Types for critical path calculation.

use crate::interner::HookId;

/// Tolerance for treating slack as zero.
pub const SLACK_EPSILON: f64 = 1e-9;

/// Per-hook timing from the forward and backward passes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HookTiming {
    /// Earliest possible start time (from forward pass).
    pub earliest_start: f64,
    /// Earliest possible finish time (from forward pass).
    pub earliest_finish: f64,
    /// Latest allowable start time (from backward pass).
    pub latest_start: f64,
    /// Latest allowable finish time (from backward pass).
    pub latest_finish: f64,
    /// Slack = latest_start - earliest_start.
    pub slack: f64,
}

impl HookTiming {
    pub fn is_critical(&self) -> bool {
        self.slack.abs() < SLACK_EPSILON
    }

    pub fn has_slack(&self) -> bool {
        self.slack > SLACK_EPSILON
    }
}

/// Timing for a whole phase.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CriticalPathResult {
    /// Timing for each hook, indexed by [`HookId`].
    pub timings: Vec<HookTiming>,
    /// Project end time: the longest earliest finish in the phase.
    pub critical_path_length: f64,
    /// Zero-slack hooks in dependency order.
    pub critical_path: Vec<HookId>,
    /// Zero-slack hooks dropped from `critical_path` because of a cycle.
    pub excluded: Vec<HookId>,
    /// Sum of slack over hooks with positive slack.
    pub total_positive_slack: f64,
    pub speedup_potential: f64,
}

impl CriticalPathResult {
    #[inline]
    pub fn timing(&self, id: HookId) -> &HookTiming {
        &self.timings[id as usize]
    }

    pub fn slack_vec(&self) -> Vec<f64> {
        self.timings.iter().map(|t| t.slack).collect()
    }

    pub fn is_critical(&self, id: HookId) -> bool {
        self.timing(id).is_critical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_timing_critical() {
        let timing = HookTiming {
            earliest_start: 0.0,
            earliest_finish: 5.0,
            latest_start: 0.0,
            latest_finish: 5.0,
            slack: 0.0,
        };
        assert!(timing.is_critical());
        assert!(!timing.has_slack());

        let timing_with_slack = HookTiming {
            earliest_start: 0.0,
            earliest_finish: 5.0,
            latest_start: 2.0,
            latest_finish: 7.0,
            slack: 2.0,
        };
        assert!(!timing_with_slack.is_critical());
        assert!(timing_with_slack.has_slack());
    }
}
