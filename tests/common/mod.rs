//! Common test utilities and fixtures

#![allow(dead_code)]

use grid_margin_analyzer::{InstrumentConstraints, InstrumentProvider, PricingOracle, Quote, Side};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Path to the sample configuration shipped with the crate
pub const SAMPLE_CONFIG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml");

/// One instrument of a [`ScriptedMarket`]
#[derive(Debug, Clone)]
pub struct ScriptedInstrument {
    pub symbol: String,
    pub quote: Option<Quote>,
    pub constraints: Option<InstrumentConstraints>,
    /// Margin per lot when buying; `None` means the oracle cannot price it
    pub buy_margin_per_lot: Option<Decimal>,
    /// Margin per lot when selling
    pub sell_margin_per_lot: Option<Decimal>,
    /// Profit per lot per unit of favorable price move
    pub profit_per_lot: Decimal,
}

impl ScriptedInstrument {
    /// A tradable FX-like instrument with the same margin on both sides
    pub fn fx(symbol: &str, margin_per_lot: Decimal) -> Self {
        Self {
            symbol: symbol.to_string(),
            quote: Some(Quote::new(dec!(1.10000), dec!(1.10010))),
            constraints: Some(InstrumentConstraints::new(
                dec!(0.01),
                dec!(100),
                dec!(0.01),
                5,
            )),
            buy_margin_per_lot: Some(margin_per_lot),
            sell_margin_per_lot: Some(margin_per_lot),
            profit_per_lot: dec!(100000),
        }
    }

    pub fn without_tick(mut self) -> Self {
        self.quote = None;
        self
    }

    pub fn with_sides(mut self, buy: Option<Decimal>, sell: Option<Decimal>) -> Self {
        self.buy_margin_per_lot = buy;
        self.sell_margin_per_lot = sell;
        self
    }
}

/// Market whose margins scale linearly with lot size, per side
#[derive(Debug, Clone, Default)]
pub struct ScriptedMarket {
    pub instruments: Vec<ScriptedInstrument>,
}

impl ScriptedMarket {
    pub fn new(instruments: Vec<ScriptedInstrument>) -> Self {
        Self { instruments }
    }

    fn find(&self, symbol: &str) -> Option<&ScriptedInstrument> {
        self.instruments.iter().find(|i| i.symbol == symbol)
    }
}

impl PricingOracle for ScriptedMarket {
    fn margin_for_lot(
        &self,
        side: Side,
        instrument: &str,
        lot: Decimal,
        _price: Decimal,
    ) -> Option<Decimal> {
        if lot <= Decimal::ZERO {
            return None;
        }
        let spec = self.find(instrument)?;
        let per_lot = match side {
            Side::Buy => spec.buy_margin_per_lot,
            Side::Sell => spec.sell_margin_per_lot,
        }?;
        Some(per_lot * lot)
    }

    fn profit_for_lot(
        &self,
        _side: Side,
        instrument: &str,
        lot: Decimal,
        entry_price: Decimal,
        target_price: Decimal,
    ) -> Option<Decimal> {
        if lot <= Decimal::ZERO {
            return None;
        }
        let spec = self.find(instrument)?;
        Some((target_price - entry_price).abs() * lot * spec.profit_per_lot)
    }
}

impl InstrumentProvider for ScriptedMarket {
    fn list_tradable_instruments(&self) -> Vec<String> {
        self.instruments.iter().map(|i| i.symbol.clone()).collect()
    }

    fn current_quote(&self, instrument: &str) -> Option<Quote> {
        self.find(instrument)?.quote
    }

    fn static_constraints(&self, instrument: &str) -> Option<InstrumentConstraints> {
        self.find(instrument)?.constraints.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_margin_scales_with_lot() {
        let market = ScriptedMarket::new(vec![ScriptedInstrument::fx("EURUSD", dec!(1100))]);
        assert_eq!(
            market.margin_for_lot(Side::Buy, "EURUSD", dec!(0.5), dec!(1.1)),
            Some(dec!(550))
        );
        assert!(market
            .margin_for_lot(Side::Buy, "EURUSD", Decimal::ZERO, dec!(1.1))
            .is_none());
    }
}
