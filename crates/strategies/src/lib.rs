// In crates/strategies/src/lib.rs

use core_types::{PriceSeries, Signal};

pub mod buy_and_hold;
pub mod ema_crossover;
pub mod error;
pub mod factory;
pub mod indicators;
pub mod momentum;
pub mod rsi;
pub mod sma_crossover;
pub mod types;

pub use error::{Error, Result};
pub use factory::{create_strategy, generate};

/// The universal interface for a signal generator.
///
/// A strategy maps a price history to a long/flat `Signal` with exactly one value per bar.
/// Strategies hold only their immutable settings: the same input always yields the same
/// signal, and the input series is never modified.
pub trait Strategy {
    /// The registry name of the strategy (the key accepted by the factory).
    fn name(&self) -> &'static str;

    fn generate(&self, series: &PriceSeries) -> Signal;
}
