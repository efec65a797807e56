//! Deterministic position lifecycle management.
//!
//! Runs as a long-lived service that polls open positions on a fixed
//! interval, evaluates each against its strategy's exit rules, and issues
//! closes. One failing position never halts the cycle. No discretionary
//! logic in the exit path — every rule is mechanical.

pub mod breakout;
pub mod dispatch;
pub mod iron_condor;
pub mod momentum;
pub mod service;
pub mod session;
pub mod single_leg;

pub use dispatch::evaluate_exit;
pub use service::{CycleOutcome, Monitor};
