// In crates/options/src/lib.rs

pub mod backtest;
pub mod black_scholes;
pub mod chain;
pub mod implied;

// Re-export the most important types for easy access from other crates.
pub use backtest::{
    CoveredCall, OptionEquityPoint, OptionStrategyMetrics, Straddle, backtest_covered_call,
    backtest_straddle,
};
pub use black_scholes::{Greeks, OptionParams, SensitivityPoint};
pub use chain::{ChainAnalysis, ChainContext, OptionChainRow, analyze_chain};
pub use implied::implied_volatility;
