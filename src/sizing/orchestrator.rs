use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::common::traits::{InstrumentProvider, PricingOracle};
use crate::common::types::{InstrumentConstraints, Quote, Side};
use crate::sizing::adjuster::LotAdjuster;
use crate::sizing::evaluator::PositionEvaluator;
use crate::sizing::types::{
    CapitalParameters, InstrumentResult, PositionContext, RunParameters, RunReport, SideAnalysis,
    TradeDistance,
};

/// Walks the instrument universe and builds the run report
///
/// Instruments are processed one at a time, in provider order. Each
/// instrument result is built from scratch; nothing carries over.
pub struct AnalysisOrchestrator<'a, P, O>
where
    P: InstrumentProvider + ?Sized,
    O: PricingOracle + ?Sized,
{
    provider: &'a P,
    oracle: &'a O,
    currency: String,
}

impl<'a, P, O> AnalysisOrchestrator<'a, P, O>
where
    P: InstrumentProvider + ?Sized,
    O: PricingOracle + ?Sized,
{
    pub fn new(provider: &'a P, oracle: &'a O, currency: impl Into<String>) -> Self {
        Self {
            provider,
            oracle,
            currency: currency.into(),
        }
    }

    /// Analyze every tradable instrument
    ///
    /// `params` must already be validated with [`RunParameters::validate`].
    #[instrument(skip(self), fields(currency = %self.currency))]
    pub fn run(&self, params: &RunParameters) -> RunReport {
        let capital = params.capital_parameters();
        let distance = params.trade_distance();
        let instruments = self.provider.list_tradable_instruments();
        info!("Analyzing {} instruments", instruments.len());

        let mut results = Vec::new();
        for symbol in &instruments {
            let Some(constraints) = self.provider.static_constraints(symbol) else {
                debug!("{} - Skipped", symbol);
                continue;
            };
            let Some(quote) = self.provider.current_quote(symbol) else {
                debug!("{} - No tick data available", symbol);
                continue;
            };

            let result =
                self.analyze_instrument(symbol, &quote, &constraints, &capital, distance);
            if result.has_analysis() {
                results.push(result);
            } else {
                debug!("{} - No side could be priced", symbol);
            }
        }

        info!(
            "Analysis complete: {} of {} instruments reported",
            results.len(),
            instruments.len()
        );

        RunReport {
            parameters: *params,
            results,
            generated_at: Utc::now(),
        }
    }

    fn analyze_instrument(
        &self,
        symbol: &str,
        quote: &Quote,
        constraints: &InstrumentConstraints,
        capital: &CapitalParameters,
        distance: TradeDistance,
    ) -> InstrumentResult {
        let analyze = |side: Side| {
            let ctx = PositionContext {
                side,
                instrument: symbol,
                price: side.entry_price(quote),
                distance,
                constraints,
                capital: capital.capital,
            };
            self.analyze_side(&ctx, capital)
        };

        InstrumentResult {
            symbol: symbol.to_string(),
            capital: capital.capital,
            currency: self.currency.clone(),
            buy: analyze(Side::Buy),
            sell: analyze(Side::Sell),
        }
    }

    fn analyze_side(
        &self,
        ctx: &PositionContext<'_>,
        capital: &CapitalParameters,
    ) -> Option<SideAnalysis> {
        let initial = PositionEvaluator::new(self.oracle).evaluate(ctx, capital.initial_lot);
        if !initial.is_evaluable() {
            return None;
        }

        let adjustment = LotAdjuster::new(self.oracle).adjust(&initial, capital, ctx);
        debug!(
            "{} {}: lot {} -> {} ({:?})",
            ctx.instrument, ctx.side, initial.lot, adjustment.adjusted_lot, adjustment.kind
        );

        Some(SideAnalysis {
            initial,
            adjustment,
        })
    }
}
