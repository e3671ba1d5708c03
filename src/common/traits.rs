//! Trait definitions for the trading terminal boundary

use rust_decimal::Decimal;

use super::errors::Result;
use super::types::{AccountInfo, InstrumentConstraints, Quote, Side};

/// Prices a single lot-sized trade
///
/// Implementations return `None` when the combination cannot be priced
/// (unknown instrument, non-positive lot or price). They never panic.
#[cfg_attr(test, mockall::automock)]
pub trait PricingOracle {
    /// Margin required to open `lot` on `side` at `price`
    fn margin_for_lot(
        &self,
        side: Side,
        instrument: &str,
        lot: Decimal,
        price: Decimal,
    ) -> Option<Decimal>;

    /// Profit realized by a trade opened at `entry_price` and closed at `target_price`
    fn profit_for_lot(
        &self,
        side: Side,
        instrument: &str,
        lot: Decimal,
        entry_price: Decimal,
        target_price: Decimal,
    ) -> Option<Decimal>;
}

/// Supplies the instrument universe and per-instrument market facts
#[cfg_attr(test, mockall::automock)]
pub trait InstrumentProvider {
    /// Tradable instruments, in the order they should be reported
    fn list_tradable_instruments(&self) -> Vec<String>;

    /// Current bid/ask, or `None` when there is no tick
    fn current_quote(&self, instrument: &str) -> Option<Quote>;

    /// Static lot constraints, or `None` when the instrument is not tradable
    fn static_constraints(&self, instrument: &str) -> Option<InstrumentConstraints>;
}

/// A connection to a broker terminal
///
/// Acquire it through [`crate::terminal::TerminalSession`] so that
/// `shutdown` is guaranteed to run.
pub trait TradingTerminal: PricingOracle + InstrumentProvider {
    /// Initialize the connection
    fn connect(&mut self) -> Result<()>;

    /// Account and broker identity
    fn account_info(&self) -> Option<AccountInfo>;

    /// Release the connection
    fn shutdown(&mut self);

    /// Check if the terminal is currently connected
    fn is_connected(&self) -> bool;
}
