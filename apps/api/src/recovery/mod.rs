// Recovery tracking: readiness score calculation and per-day persistence.

pub mod calculator;
pub mod handlers;
pub mod store;
