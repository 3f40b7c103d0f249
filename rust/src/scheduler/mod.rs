//! Suggested execution order for a phase.
//!
//! Critical hooks keep their dependency order; non-critical hooks are list
//! scheduled around them by slack and duration.

mod core;
mod state;

pub use core::{suggest_order, OrderPlan, Placement};
pub use state::OrderState;
