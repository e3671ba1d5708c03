use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::errors::{AnalysisError, Result};
use crate::common::types::{InstrumentConstraints, Side};

/// Capital reference and target utilization band for a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapitalParameters {
    pub capital: Decimal,
    pub initial_lot: Decimal,
    pub min_ratio: Decimal,
    pub max_ratio: Decimal,
}

impl CapitalParameters {
    /// Margin ratio for `margin` against the capital reference
    ///
    /// `None` when the capital is zero or the quotient overflows.
    pub fn ratio_of(&self, margin: Decimal) -> Option<Decimal> {
        margin.checked_div(self.capital)
    }

    /// Whether `ratio` lies inside `[min_ratio, max_ratio]`
    pub fn in_band(&self, ratio: Decimal) -> bool {
        ratio >= self.min_ratio && ratio <= self.max_ratio
    }
}

/// Grid distance in points and number of grid trades, shared by every instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeDistance {
    pub points: u32,
    pub trade_count: u32,
}

impl TradeDistance {
    pub fn new(points: u32, trade_count: u32) -> Self {
        Self {
            points,
            trade_count,
        }
    }

    /// Absolute price offset for an instrument's precision
    pub fn price_offset(&self, constraints: &InstrumentConstraints) -> Decimal {
        constraints.points_to_price(self.points)
    }
}

/// Everything needed to price one side of one instrument
#[derive(Debug, Clone, Copy)]
pub struct PositionContext<'a> {
    pub side: Side,
    pub instrument: &'a str,
    pub price: Decimal,
    pub distance: TradeDistance,
    pub constraints: &'a InstrumentConstraints,
    pub capital: Decimal,
}

/// Result of evaluating one (side, lot) pair
///
/// A `None` margin means the pricing oracle could not price the lot;
/// such a snapshot is not evaluable and carries no ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub lot: Decimal,
    pub margin: Option<Decimal>,
    pub margin_ratio: Option<Decimal>,
    pub profit_per_trade: Option<Decimal>,
    pub total_profit: Option<Decimal>,
}

impl PositionSnapshot {
    /// Snapshot for a lot the oracle could not price
    pub fn unavailable(lot: Decimal) -> Self {
        Self {
            lot,
            margin: None,
            margin_ratio: None,
            profit_per_trade: None,
            total_profit: None,
        }
    }

    pub fn is_evaluable(&self) -> bool {
        self.margin.is_some()
    }
}

/// Direction of a lot adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentType {
    None,
    Reduce,
    Increase,
}

/// Outcome of checking a snapshot against the capital band
///
/// The adjusted fields hold the initial snapshot's values unless a
/// candidate lot was accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentOutcome {
    pub required: bool,
    #[serde(rename = "type")]
    pub kind: AdjustmentType,
    pub target_ratio: Option<Decimal>,
    /// True only when a candidate lot was committed
    pub accepted: bool,
    pub adjusted_lot: Decimal,
    pub adjusted_margin: Option<Decimal>,
    pub adjusted_profit_per_trade: Option<Decimal>,
    pub adjusted_total_profit: Option<Decimal>,
    /// Append-only explanation of what was tried
    #[serde(rename = "message")]
    pub rationale: Vec<String>,
}

impl AdjustmentOutcome {
    /// Outcome that keeps the initial snapshot unchanged
    pub fn unchanged(initial: &PositionSnapshot) -> Self {
        Self {
            required: false,
            kind: AdjustmentType::None,
            target_ratio: None,
            accepted: false,
            adjusted_lot: initial.lot,
            adjusted_margin: initial.margin,
            adjusted_profit_per_trade: initial.profit_per_trade,
            adjusted_total_profit: initial.total_profit,
            rationale: Vec::new(),
        }
    }

    /// Append a line to the rationale log
    pub fn note(&mut self, message: impl Into<String>) {
        self.rationale.push(message.into());
    }

    /// Commit an evaluated candidate as the adjusted position
    pub fn commit(&mut self, candidate: &PositionSnapshot) {
        self.accepted = true;
        self.adjusted_lot = candidate.lot;
        self.adjusted_margin = candidate.margin;
        self.adjusted_profit_per_trade = candidate.profit_per_trade;
        self.adjusted_total_profit = candidate.total_profit;
    }
}

/// Initial snapshot and its adjustment for one side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideAnalysis {
    pub initial: PositionSnapshot,
    pub adjustment: AdjustmentOutcome,
}

/// Per-instrument result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentResult {
    pub symbol: String,
    pub capital: Decimal,
    pub currency: String,
    pub buy: Option<SideAnalysis>,
    pub sell: Option<SideAnalysis>,
}

impl InstrumentResult {
    /// Whether at least one side produced an evaluable position
    pub fn has_analysis(&self) -> bool {
        self.buy.is_some() || self.sell.is_some()
    }

    pub fn side(&self, side: Side) -> Option<&SideAnalysis> {
        match side {
            Side::Buy => self.buy.as_ref(),
            Side::Sell => self.sell.as_ref(),
        }
    }
}

/// The six scalar inputs of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunParameters {
    #[serde(default = "default_initial_lot")]
    pub initial_lot: Decimal,
    /// Grid distance in points
    #[serde(default = "default_distance")]
    pub distance: u32,
    #[serde(default = "default_trades_no")]
    pub trades_no: u32,
    #[serde(default = "default_capital")]
    pub capital: Decimal,
    #[serde(default = "default_min_ratio")]
    pub min_ratio: Decimal,
    #[serde(default = "default_max_ratio")]
    pub max_ratio: Decimal,
}

impl Default for RunParameters {
    fn default() -> Self {
        Self {
            initial_lot: default_initial_lot(),
            distance: default_distance(),
            trades_no: default_trades_no(),
            capital: default_capital(),
            min_ratio: default_min_ratio(),
            max_ratio: default_max_ratio(),
        }
    }
}

fn default_initial_lot() -> Decimal {
    Decimal::new(5, 1)
}

fn default_distance() -> u32 {
    430
}

fn default_trades_no() -> u32 {
    3
}

fn default_capital() -> Decimal {
    Decimal::from(50_000)
}

fn default_min_ratio() -> Decimal {
    Decimal::new(2, 1)
}

fn default_max_ratio() -> Decimal {
    Decimal::new(5, 1)
}

impl RunParameters {
    /// Check the invariants the sizing core relies on
    pub fn validate(&self) -> Result<()> {
        if self.initial_lot <= Decimal::ZERO {
            return Err(AnalysisError::InvalidParameter(format!(
                "initial lot must be positive, got {}",
                self.initial_lot
            )));
        }
        if self.distance == 0 {
            return Err(AnalysisError::InvalidParameter(
                "distance must be positive".to_string(),
            ));
        }
        if self.trades_no == 0 {
            return Err(AnalysisError::InvalidParameter(
                "trade count must be positive".to_string(),
            ));
        }
        if self.capital <= Decimal::ZERO {
            return Err(AnalysisError::InvalidParameter(format!(
                "capital must be positive, got {}",
                self.capital
            )));
        }
        if self.min_ratio < Decimal::ZERO || self.min_ratio >= self.max_ratio {
            return Err(AnalysisError::InvalidParameter(format!(
                "ratio band must satisfy 0 <= min < max, got [{}, {}]",
                self.min_ratio, self.max_ratio
            )));
        }
        Ok(())
    }

    pub fn capital_parameters(&self) -> CapitalParameters {
        CapitalParameters {
            capital: self.capital,
            initial_lot: self.initial_lot,
            min_ratio: self.min_ratio,
            max_ratio: self.max_ratio,
        }
    }

    pub fn trade_distance(&self) -> TradeDistance {
        TradeDistance::new(self.distance, self.trades_no)
    }
}

/// Run-level report: echoed parameters and per-instrument results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub parameters: RunParameters,
    pub results: Vec<InstrumentResult>,
    pub generated_at: DateTime<Utc>,
}

impl RunReport {
    pub fn result_for(&self, symbol: &str) -> Option<&InstrumentResult> {
        self.results.iter().find(|r| r.symbol == symbol)
    }
}
