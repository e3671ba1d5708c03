//! Sizing module: margin evaluation and lot adjustment
//!
//! This module holds the only real decision logic in the crate.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  AnalysisOrchestrator                                       │
//! │    for each tradable instrument (provider order):           │
//! │      - skip if not tradable or no tick                      │
//! │      - BUY at ask, SELL at bid                              │
//! └─────────────────────────────────────────────────────────────┘
//!        │ per side
//!        ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  PositionEvaluator                                          │
//! │    margin, margin / capital, profit per trade, × trades     │
//! │    unpriced margin → side skipped                           │
//! └─────────────────────────────────────────────────────────────┘
//!        │ snapshot
//!        ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  LotAdjuster                                                │
//! │    ratio > max → reduce, ratio < min → increase             │
//! │    ideal = lot × capital × target / margin                  │
//! │    snap to volume step, clamp to [min, max]                 │
//! │    re-evaluate, accept inside [min × 0.95, max × 1.05]      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`PositionEvaluator`]: prices one lot through a [`PricingOracle`]
//! - [`LotAdjuster`]: one-shot proportional resize with tolerance acceptance
//! - [`AnalysisOrchestrator`]: assembles the [`RunReport`]
//!
//! [`PricingOracle`]: crate::common::traits::PricingOracle

mod adjuster;
mod evaluator;
mod orchestrator;
mod types;

pub use adjuster::{LotAdjuster, ACCEPT_LOWER_SLACK, ACCEPT_UPPER_SLACK};
pub use evaluator::PositionEvaluator;
pub use orchestrator::AnalysisOrchestrator;
pub use types::{
    AdjustmentOutcome, AdjustmentType, CapitalParameters, InstrumentResult, PositionContext,
    PositionSnapshot, RunParameters, RunReport, SideAnalysis, TradeDistance,
};
