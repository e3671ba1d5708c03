//! Configuration types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::types::{AccountInfo, InstrumentConstraints, Quote};
use crate::sizing::RunParameters;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default run parameters, overridable from the command line
    #[serde(default)]
    pub run: RunParameters,
    /// Simulated terminal contents
    pub terminal: TerminalConfig,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

/// Account and instrument table served by the simulated terminal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalConfig {
    pub account: AccountInfo,
    /// Instruments in the order they are reported
    #[serde(default)]
    pub instruments: Vec<InstrumentConfig>,
}

/// One instrument of the simulated terminal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentConfig {
    pub symbol: String,
    /// Shown in market watch and selectable for trading
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Current bid; no tick unless both bid and ask are set
    #[serde(default)]
    pub bid: Option<Decimal>,
    /// Current ask
    #[serde(default)]
    pub ask: Option<Decimal>,
    /// Price digits
    pub digits: u32,
    pub volume_min: Decimal,
    pub volume_max: Decimal,
    pub volume_step: Decimal,
    /// Units per lot
    #[serde(default = "default_contract_size")]
    pub contract_size: Decimal,
    /// Instrument leverage; the account leverage applies when absent
    #[serde(default)]
    pub leverage: Option<u32>,
    /// Conversion applied to `lot × contract_size × price` for margin
    #[serde(default = "default_rate")]
    pub margin_rate: Decimal,
    /// Conversion from quote currency to account currency
    #[serde(default = "default_rate")]
    pub profit_rate: Decimal,
}

impl InstrumentConfig {
    pub fn quote(&self) -> Option<Quote> {
        match (self.bid, self.ask) {
            (Some(bid), Some(ask)) => Some(Quote::new(bid, ask)),
            _ => None,
        }
    }

    pub fn constraints(&self) -> InstrumentConstraints {
        InstrumentConstraints::new(
            self.volume_min,
            self.volume_max,
            self.volume_step,
            self.digits,
        )
    }
}

fn default_visible() -> bool {
    true
}

fn default_contract_size() -> Decimal {
    Decimal::from(100_000)
}

fn default_rate() -> Decimal {
    Decimal::ONE
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
