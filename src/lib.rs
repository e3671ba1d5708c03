//! GridMarginAnalyzer Library
//!
//! Estimates the margin consumption and projected profit of a multi-trade
//! grid position per instrument, and resizes the lot when margin usage
//! falls outside a target band of a fixed capital amount.

pub mod common;
pub mod config;
pub mod output;
pub mod sizing;
pub mod terminal;

// Re-export commonly used types
pub use common::errors::{AnalysisError, Result};
pub use common::traits::{InstrumentProvider, PricingOracle, TradingTerminal};
pub use common::types::{AccountInfo, InstrumentConstraints, Quote, Side};
pub use config::types::AppConfig;
pub use output::{extract_framed, frame_json, Frame};
pub use terminal::{SimulatedTerminal, TerminalSession};

// Sizing types
pub use sizing::{
    AdjustmentOutcome, AdjustmentType, AnalysisOrchestrator, CapitalParameters, InstrumentResult,
    LotAdjuster, PositionContext, PositionEvaluator, PositionSnapshot, RunParameters, RunReport,
    SideAnalysis, TradeDistance,
};
