use rust_decimal::Decimal;
use tracing::debug;

use crate::common::traits::PricingOracle;
use crate::sizing::types::{PositionContext, PositionSnapshot};

/// Computes margin, margin ratio and grid profit for a candidate lot
pub struct PositionEvaluator<'a, O: PricingOracle + ?Sized> {
    oracle: &'a O,
}

impl<'a, O: PricingOracle + ?Sized> PositionEvaluator<'a, O> {
    pub fn new(oracle: &'a O) -> Self {
        Self { oracle }
    }

    /// Evaluate `lot` in the given context
    ///
    /// Returns an unavailable snapshot (no margin, no ratio) when the oracle
    /// cannot price the margin or prices it at zero or below. The caller
    /// must then skip this side.
    pub fn evaluate(&self, ctx: &PositionContext<'_>, lot: Decimal) -> PositionSnapshot {
        let margin = match self
            .oracle
            .margin_for_lot(ctx.side, ctx.instrument, lot, ctx.price)
        {
            Some(margin) if margin > Decimal::ZERO => margin,
            other => {
                debug!(
                    "{} {} lot {}: margin unavailable ({:?})",
                    ctx.instrument, ctx.side, lot, other
                );
                return PositionSnapshot::unavailable(lot);
            }
        };

        let Some(margin_ratio) = margin.checked_div(ctx.capital) else {
            debug!(
                "{} {} lot {}: margin ratio overflowed",
                ctx.instrument, ctx.side, lot
            );
            return PositionSnapshot::unavailable(lot);
        };

        let offset = ctx.distance.price_offset(ctx.constraints);
        let target_price = ctx.side.target_price(ctx.price, offset);
        let profit_per_trade =
            self.oracle
                .profit_for_lot(ctx.side, ctx.instrument, lot, ctx.price, target_price);
        let total_profit = profit_per_trade
            .and_then(|profit| profit.checked_mul(Decimal::from(ctx.distance.trade_count)));

        PositionSnapshot {
            lot,
            margin: Some(margin),
            margin_ratio: Some(margin_ratio),
            profit_per_trade,
            total_profit,
        }
    }
}
