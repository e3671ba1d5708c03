use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, warn};

use crate::common::traits::PricingOracle;
use crate::sizing::evaluator::PositionEvaluator;
use crate::sizing::types::{
    AdjustmentOutcome, AdjustmentType, CapitalParameters, PositionContext, PositionSnapshot,
};

/// Lower acceptance edge, as a fraction of `min_ratio`
pub const ACCEPT_LOWER_SLACK: Decimal = dec!(0.95);
/// Upper acceptance edge, as a fraction of `max_ratio`
pub const ACCEPT_UPPER_SLACK: Decimal = dec!(1.05);

/// Resizes out-of-band positions back toward the capital band
///
/// One-shot proportional estimate, snapped to the broker lot step, then
/// accepted if the re-evaluated ratio falls inside the band widened by
/// [`ACCEPT_LOWER_SLACK`] / [`ACCEPT_UPPER_SLACK`]. There is no second pass.
pub struct LotAdjuster<'a, O: PricingOracle + ?Sized> {
    evaluator: PositionEvaluator<'a, O>,
}

impl<'a, O: PricingOracle + ?Sized> LotAdjuster<'a, O> {
    pub fn new(oracle: &'a O) -> Self {
        Self {
            evaluator: PositionEvaluator::new(oracle),
        }
    }

    /// Decide whether `initial` needs resizing and try to resize it
    pub fn adjust(
        &self,
        initial: &PositionSnapshot,
        capital: &CapitalParameters,
        ctx: &PositionContext<'_>,
    ) -> AdjustmentOutcome {
        let mut outcome = AdjustmentOutcome::unchanged(initial);

        // Callers skip unpriced sides; nothing to decide without a ratio
        let (Some(margin), Some(ratio)) = (initial.margin, initial.margin_ratio) else {
            return outcome;
        };

        if capital.in_band(ratio) {
            return outcome;
        }
        let (kind, target_ratio) = if ratio > capital.max_ratio {
            (AdjustmentType::Reduce, capital.max_ratio)
        } else {
            (AdjustmentType::Increase, capital.min_ratio)
        };
        outcome.required = true;
        outcome.kind = kind;
        outcome.target_ratio = Some(target_ratio);

        if margin <= Decimal::ZERO {
            outcome.note("Cannot adjust: margin is zero or negative");
            return outcome;
        }

        let Some(ideal_lot) = capital
            .capital
            .checked_mul(target_ratio)
            .and_then(|target_margin| target_margin.checked_div(margin))
            .and_then(|scale_factor| initial.lot.checked_mul(scale_factor))
        else {
            warn!(
                "{} {}: scaling lot {} by margin {} overflowed",
                ctx.instrument, ctx.side, initial.lot, margin
            );
            outcome.note("Cannot adjust: scaling overflowed");
            return outcome;
        };

        let Some(adjusted_lot) = ctx.constraints.quantize_lot(ideal_lot) else {
            outcome.note("Invalid volume step");
            return outcome;
        };

        debug!(
            "{} {}: ratio {} outside [{}, {}], ideal lot {} snapped to {}",
            ctx.instrument,
            ctx.side,
            ratio,
            capital.min_ratio,
            capital.max_ratio,
            ideal_lot,
            adjusted_lot
        );

        let candidate = self.evaluator.evaluate(ctx, adjusted_lot);
        let (Some(adjusted_margin), Some(_)) = (candidate.margin, candidate.profit_per_trade)
        else {
            warn!(
                "{} {}: could not price adjusted lot {}",
                ctx.instrument, ctx.side, adjusted_lot
            );
            outcome.note("Margin/profit calculation failed for adjusted lot");
            return outcome;
        };

        let Some(adjusted_ratio) = capital.ratio_of(adjusted_margin) else {
            outcome.note("Margin/profit calculation failed for adjusted lot");
            return outcome;
        };
        let lower = capital.min_ratio * ACCEPT_LOWER_SLACK;
        let upper = capital.max_ratio * ACCEPT_UPPER_SLACK;

        if adjusted_ratio >= lower && adjusted_ratio <= upper {
            outcome.commit(&candidate);
            outcome.note(format!(
                "Lot adjusted to {:.2} for {:.1}% capital usage",
                adjusted_lot.round_dp(2),
                as_percent(adjusted_ratio)
            ));
        } else {
            warn!(
                "{} {}: adjusted lot {} lands at ratio {}, outside [{}, {}]",
                ctx.instrument, ctx.side, adjusted_lot, adjusted_ratio, lower, upper
            );
            outcome.note(format!(
                "Unable to find viable adjustment within constraints (would be {:.1}%)",
                as_percent(adjusted_ratio)
            ));
        }

        outcome
    }
}

/// Ratio as a percentage rounded to one decimal; `{:.1}` alone truncates a `Decimal`
fn as_percent(ratio: Decimal) -> Decimal {
    ratio
        .checked_mul(Decimal::ONE_HUNDRED)
        .unwrap_or(Decimal::MAX)
        .round_dp(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::traits::MockPricingOracle;
    use crate::common::types::{InstrumentConstraints, Side};
    use crate::sizing::types::TradeDistance;

    /// Oracle whose margin and profit scale linearly with lot size
    struct LinearOracle {
        margin_per_lot: Decimal,
        profit_per_lot: Decimal,
    }

    impl PricingOracle for LinearOracle {
        fn margin_for_lot(&self, _: Side, _: &str, lot: Decimal, _: Decimal) -> Option<Decimal> {
            (lot > Decimal::ZERO).then(|| lot * self.margin_per_lot)
        }

        fn profit_for_lot(
            &self,
            _: Side,
            _: &str,
            lot: Decimal,
            _: Decimal,
            _: Decimal,
        ) -> Option<Decimal> {
            (lot > Decimal::ZERO).then(|| lot * self.profit_per_lot)
        }
    }

    fn capital() -> CapitalParameters {
        CapitalParameters {
            capital: dec!(50000),
            initial_lot: dec!(0.5),
            min_ratio: dec!(0.2),
            max_ratio: dec!(0.5),
        }
    }

    fn fx_constraints() -> InstrumentConstraints {
        InstrumentConstraints::new(dec!(0.01), dec!(100), dec!(0.01), 5)
    }

    fn context<'a>(constraints: &'a InstrumentConstraints) -> PositionContext<'a> {
        PositionContext {
            side: Side::Buy,
            instrument: "XAUUSD",
            price: dec!(2000),
            distance: TradeDistance::new(430, 3),
            constraints,
            capital: dec!(50000),
        }
    }

    fn snapshot(lot: Decimal, margin: Decimal) -> PositionSnapshot {
        PositionSnapshot {
            lot,
            margin: Some(margin),
            margin_ratio: Some(margin / dec!(50000)),
            profit_per_trade: Some(dec!(100)),
            total_profit: Some(dec!(300)),
        }
    }

    fn adjust_with(
        oracle: &LinearOracle,
        initial: &PositionSnapshot,
        constraints: &InstrumentConstraints,
    ) -> AdjustmentOutcome {
        LotAdjuster::new(oracle).adjust(initial, &capital(), &context(constraints))
    }

    #[test]
    fn test_in_band_needs_no_adjustment() {
        // Never consulted while the ratio sits in band
        let mut oracle = MockPricingOracle::new();
        oracle.expect_margin_for_lot().never();
        oracle.expect_profit_for_lot().never();

        let constraints = fx_constraints();
        for margin in [dec!(10000), dec!(17500), dec!(25000)] {
            let initial = snapshot(dec!(0.5), margin);
            let outcome =
                LotAdjuster::new(&oracle).adjust(&initial, &capital(), &context(&constraints));

            assert!(!outcome.required);
            assert_eq!(outcome.kind, AdjustmentType::None);
            assert_eq!(outcome.target_ratio, None);
            assert_eq!(outcome, AdjustmentOutcome::unchanged(&initial));
        }
    }

    #[test]
    fn test_reduce_to_max_ratio() {
        let oracle = LinearOracle {
            margin_per_lot: dec!(60000),
            profit_per_lot: dec!(430),
        };
        let constraints = fx_constraints();
        let initial = snapshot(dec!(0.5), dec!(30000));

        let outcome = adjust_with(&oracle, &initial, &constraints);

        assert!(outcome.required);
        assert!(outcome.accepted);
        assert_eq!(outcome.kind, AdjustmentType::Reduce);
        assert_eq!(outcome.target_ratio, Some(dec!(0.5)));
        assert_eq!(outcome.adjusted_lot, dec!(0.42));
        assert_eq!(outcome.adjusted_margin, Some(dec!(25200)));
        assert_eq!(outcome.adjusted_profit_per_trade, Some(dec!(180.60)));
        assert_eq!(outcome.adjusted_total_profit, Some(dec!(541.80)));
        assert_eq!(
            outcome.rationale,
            vec!["Lot adjusted to 0.42 for 50.4% capital usage".to_string()]
        );
    }

    #[test]
    fn test_increase_to_min_ratio() {
        let oracle = LinearOracle {
            margin_per_lot: dec!(2000),
            profit_per_lot: dec!(43),
        };
        let constraints = fx_constraints();
        let initial = snapshot(dec!(0.5), dec!(1000));

        let outcome = adjust_with(&oracle, &initial, &constraints);

        assert_eq!(outcome.kind, AdjustmentType::Increase);
        assert_eq!(outcome.target_ratio, Some(dec!(0.2)));
        assert!(outcome.accepted);
        assert_eq!(outcome.adjusted_lot, dec!(5));
        assert_eq!(outcome.adjusted_margin, Some(dec!(10000)));
        assert_eq!(outcome.adjusted_total_profit, Some(dec!(645)));
    }

    #[test]
    fn test_zero_margin_guard() {
        let oracle = LinearOracle {
            margin_per_lot: dec!(1000),
            profit_per_lot: dec!(1),
        };
        let constraints = fx_constraints();
        let initial = snapshot(dec!(0.5), dec!(0));

        let outcome = adjust_with(&oracle, &initial, &constraints);

        assert!(outcome.required);
        assert!(!outcome.accepted);
        assert_eq!(outcome.kind, AdjustmentType::Increase);
        assert_eq!(outcome.adjusted_lot, initial.lot);
        assert_eq!(outcome.adjusted_margin, initial.margin);
        assert_eq!(
            outcome.rationale,
            vec!["Cannot adjust: margin is zero or negative".to_string()]
        );
    }

    #[test]
    fn test_invalid_volume_step_guard() {
        let oracle = LinearOracle {
            margin_per_lot: dec!(60000),
            profit_per_lot: dec!(1),
        };
        let mut constraints = fx_constraints();
        constraints.volume_step = Decimal::ZERO;
        let initial = snapshot(dec!(0.5), dec!(30000));

        let outcome = adjust_with(&oracle, &initial, &constraints);

        assert!(outcome.required);
        assert!(!outcome.accepted);
        assert_eq!(outcome.adjusted_lot, dec!(0.5));
        assert_eq!(outcome.adjusted_total_profit, initial.total_profit);
        assert_eq!(outcome.rationale, vec!["Invalid volume step".to_string()]);
    }

    #[test]
    fn test_rejects_when_clamped_outside_tolerance() {
        // Minimum lot alone already blows through the band
        let oracle = LinearOracle {
            margin_per_lot: dec!(500000),
            profit_per_lot: dec!(10),
        };
        let constraints = InstrumentConstraints::new(dec!(0.1), dec!(10), dec!(0.1), 2);
        let initial = snapshot(dec!(0.5), dec!(250000));

        let outcome = adjust_with(&oracle, &initial, &constraints);

        assert!(outcome.required);
        assert!(!outcome.accepted);
        assert_eq!(outcome.kind, AdjustmentType::Reduce);
        assert_eq!(outcome.adjusted_lot, dec!(0.5));
        assert_eq!(outcome.adjusted_margin, Some(dec!(250000)));
        assert_eq!(
            outcome.rationale,
            vec!["Unable to find viable adjustment within constraints (would be 100.0%)".to_string()]
        );
    }

    #[test]
    fn test_accepts_inside_widened_band() {
        // 0.0099 ideal snaps to 0.01 -> ratio 0.505, inside max * 1.05
        let oracle = LinearOracle {
            margin_per_lot: dec!(2525000),
            profit_per_lot: dec!(10),
        };
        let constraints = fx_constraints();
        let initial = snapshot(dec!(0.02), dec!(50500));

        let outcome = adjust_with(&oracle, &initial, &constraints);

        assert!(outcome.accepted);
        assert_eq!(outcome.adjusted_lot, dec!(0.01));
        assert_eq!(outcome.adjusted_margin, Some(dec!(25250)));
    }

    #[test]
    fn test_rationale_rounds_percentage() {
        // 0.42 × 60073 = 25230.66 -> 50.46132%
        let oracle = LinearOracle {
            margin_per_lot: dec!(60073),
            profit_per_lot: dec!(430),
        };
        let constraints = fx_constraints();
        let initial = snapshot(dec!(0.5), dec!(30036.5));

        let outcome = adjust_with(&oracle, &initial, &constraints);

        assert!(outcome.accepted);
        assert_eq!(outcome.adjusted_margin, Some(dec!(25230.66)));
        assert_eq!(
            outcome.rationale,
            vec!["Lot adjusted to 0.42 for 50.5% capital usage".to_string()]
        );
    }

    #[test]
    fn test_rejects_increase_clamped_below_tolerance() {
        // Ideal 2 lots clamps to the 1 lot maximum: 10% < 0.2 × 0.95
        let oracle = LinearOracle {
            margin_per_lot: dec!(5000),
            profit_per_lot: dec!(10),
        };
        let constraints = InstrumentConstraints::new(dec!(0.01), dec!(1), dec!(0.01), 5);
        let initial = snapshot(dec!(0.5), dec!(2500));

        let outcome = adjust_with(&oracle, &initial, &constraints);

        assert!(outcome.required);
        assert!(!outcome.accepted);
        assert_eq!(outcome.kind, AdjustmentType::Increase);
        assert_eq!(outcome.adjusted_lot, dec!(0.5));
        assert_eq!(outcome.adjusted_margin, Some(dec!(2500)));
        assert_eq!(outcome.adjusted_total_profit, initial.total_profit);
        assert_eq!(
            outcome.rationale,
            vec!["Unable to find viable adjustment within constraints (would be 10.0%)".to_string()]
        );
    }

    #[test]
    fn test_tolerance_edges_are_inclusive() {
        // Clamped at volume_max, lands exactly on 0.2 × 0.95
        let oracle = LinearOracle {
            margin_per_lot: dec!(9500),
            profit_per_lot: dec!(10),
        };
        let constraints = InstrumentConstraints::new(dec!(0.01), dec!(1), dec!(0.01), 5);
        let outcome = adjust_with(&oracle, &snapshot(dec!(0.5), dec!(4750)), &constraints);

        assert!(outcome.accepted);
        assert_eq!(outcome.kind, AdjustmentType::Increase);
        assert_eq!(outcome.adjusted_lot, dec!(1));
        assert_eq!(
            outcome.rationale,
            vec!["Lot adjusted to 1.00 for 19.0% capital usage".to_string()]
        );

        // Clamped at volume_min, lands exactly on 0.5 × 1.05
        let oracle = LinearOracle {
            margin_per_lot: dec!(26250),
            profit_per_lot: dec!(10),
        };
        let constraints = InstrumentConstraints::new(dec!(1), dec!(10), dec!(0.01), 5);
        let outcome = adjust_with(&oracle, &snapshot(dec!(2), dec!(52500)), &constraints);

        assert!(outcome.accepted);
        assert_eq!(outcome.kind, AdjustmentType::Reduce);
        assert_eq!(outcome.adjusted_lot, dec!(1));
        assert_eq!(outcome.adjusted_margin, Some(dec!(26250)));
        assert_eq!(
            outcome.rationale,
            vec!["Lot adjusted to 1.00 for 52.5% capital usage".to_string()]
        );
    }

    #[test]
    fn test_tiny_margin_scaling_overflow() {
        let mut oracle = MockPricingOracle::new();
        oracle.expect_margin_for_lot().never();
        oracle.expect_profit_for_lot().never();

        let constraints = fx_constraints();
        let initial = PositionSnapshot {
            lot: dec!(0.5),
            margin: Some(dec!(0.0000000000000000000000000001)),
            margin_ratio: Some(Decimal::ZERO),
            profit_per_trade: Some(dec!(100)),
            total_profit: Some(dec!(300)),
        };
        let outcome =
            LotAdjuster::new(&oracle).adjust(&initial, &capital(), &context(&constraints));

        assert!(outcome.required);
        assert!(!outcome.accepted);
        assert_eq!(outcome.kind, AdjustmentType::Increase);
        assert_eq!(outcome.adjusted_lot, dec!(0.5));
        assert_eq!(
            outcome.rationale,
            vec!["Cannot adjust: scaling overflowed".to_string()]
        );
    }

    #[test]
    fn test_adjusted_lot_pricing_failure() {
        let mut oracle = MockPricingOracle::new();
        oracle.expect_margin_for_lot().return_const(Some(dec!(25000)));
        oracle.expect_profit_for_lot().return_const(None::<Decimal>);

        let constraints = fx_constraints();
        let initial = snapshot(dec!(0.5), dec!(30000));
        let outcome =
            LotAdjuster::new(&oracle).adjust(&initial, &capital(), &context(&constraints));

        assert!(outcome.required);
        assert!(!outcome.accepted);
        assert_eq!(outcome.adjusted_lot, dec!(0.5));
        assert_eq!(
            outcome.rationale,
            vec!["Margin/profit calculation failed for adjusted lot".to_string()]
        );
    }

    #[test]
    fn test_adjusted_lot_respects_step_and_bounds() {
        let constraints = InstrumentConstraints::new(dec!(0.05), dec!(3), dec!(0.05), 2);

        for margin_per_lot in [dec!(1000), dec!(7777), dec!(33333), dec!(91000), dec!(400000)] {
            let oracle = LinearOracle {
                margin_per_lot,
                profit_per_lot: dec!(5),
            };
            let initial = snapshot(dec!(1), margin_per_lot);
            let outcome = adjust_with(&oracle, &initial, &constraints);

            if outcome.accepted {
                let lot = outcome.adjusted_lot;
                assert_eq!(lot % constraints.volume_step, Decimal::ZERO, "lot {}", lot);
                assert!(lot >= constraints.volume_min && lot <= constraints.volume_max);
            }
        }
    }

    #[test]
    fn test_second_pass_on_accepted_lot() {
        let oracle = LinearOracle {
            margin_per_lot: dec!(60000),
            profit_per_lot: dec!(430),
        };
        let constraints = fx_constraints();
        let first = adjust_with(&oracle, &snapshot(dec!(0.5), dec!(30000)), &constraints);
        assert!(first.accepted);

        // 50.4% is accepted under the widened band but still above the narrow one,
        // so another pass fires and lands on the same lot.
        let resized = snapshot(first.adjusted_lot, first.adjusted_margin.unwrap());
        let second = adjust_with(&oracle, &resized, &constraints);
        assert!(second.required);
        assert_eq!(second.adjusted_lot, first.adjusted_lot);

        // A lot that lands inside the narrow band is left alone
        let settled = snapshot(dec!(0.40), dec!(24000));
        let third = adjust_with(&oracle, &settled, &constraints);
        assert!(!third.required);
        assert_eq!(third.adjusted_lot, dec!(0.40));
    }
}
