// In crates/risk/src/lib.rs

pub mod error;
pub mod measures;

// Re-export public types
pub use error::{Error, Result};
pub use measures::{
    conditional_value_at_risk, expected_shortfall, percentile, tail_risk, value_at_risk, TailRisk,
};
