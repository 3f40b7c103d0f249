//! Critical path method over a phase graph.
//!
//! A forward pass computes earliest starts, a backward pass latest starts;
//! hooks with zero slack form the critical path.

mod calculation;
mod types;

pub use calculation::{backward_pass, calculate_critical_path, forward_pass, speedup_potential};
pub use types::{CriticalPathResult, HookTiming, SLACK_EPSILON};
