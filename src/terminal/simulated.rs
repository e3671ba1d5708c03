//! Configuration-backed trading terminal
//!
//! Serves a fixed instrument table and prices trades with a linear
//! margin model:
//!
//! - margin = lot × contract_size × price × margin_rate / leverage
//! - profit = (exit − entry) × lot × contract_size × profit_rate, sign by side

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::common::errors::{AnalysisError, Result};
use crate::common::traits::{InstrumentProvider, PricingOracle, TradingTerminal};
use crate::common::types::{AccountInfo, InstrumentConstraints, Quote, Side};
use crate::config::types::{InstrumentConfig, TerminalConfig};

/// Deterministic terminal driven by [`TerminalConfig`]
#[derive(Debug, Clone)]
pub struct SimulatedTerminal {
    account: AccountInfo,
    instruments: Vec<InstrumentConfig>,
    connected: bool,
}

impl SimulatedTerminal {
    pub fn new(config: TerminalConfig) -> Self {
        Self {
            account: config.account,
            instruments: config.instruments,
            connected: false,
        }
    }

    fn find(&self, symbol: &str) -> Option<&InstrumentConfig> {
        if !self.connected {
            return None;
        }
        self.instruments.iter().find(|i| i.symbol == symbol)
    }

    fn leverage_for(&self, instrument: &InstrumentConfig) -> u32 {
        instrument.leverage.unwrap_or(self.account.leverage)
    }
}

impl PricingOracle for SimulatedTerminal {
    fn margin_for_lot(
        &self,
        _side: Side,
        instrument: &str,
        lot: Decimal,
        price: Decimal,
    ) -> Option<Decimal> {
        if lot <= Decimal::ZERO || price <= Decimal::ZERO {
            return None;
        }
        let spec = self.find(instrument)?;
        let leverage = self.leverage_for(spec);
        if leverage == 0 {
            return None;
        }

        lot.checked_mul(spec.contract_size)?
            .checked_mul(price)?
            .checked_mul(spec.margin_rate)?
            .checked_div(Decimal::from(leverage))
    }

    fn profit_for_lot(
        &self,
        side: Side,
        instrument: &str,
        lot: Decimal,
        entry_price: Decimal,
        target_price: Decimal,
    ) -> Option<Decimal> {
        if lot <= Decimal::ZERO || entry_price <= Decimal::ZERO {
            return None;
        }
        let spec = self.find(instrument)?;

        let move_in_favor = match side {
            Side::Buy => target_price.checked_sub(entry_price)?,
            Side::Sell => entry_price.checked_sub(target_price)?,
        };
        move_in_favor
            .checked_mul(lot)?
            .checked_mul(spec.contract_size)?
            .checked_mul(spec.profit_rate)
    }
}

impl InstrumentProvider for SimulatedTerminal {
    fn list_tradable_instruments(&self) -> Vec<String> {
        if !self.connected {
            return Vec::new();
        }
        self.instruments
            .iter()
            .filter(|i| i.visible)
            .map(|i| i.symbol.clone())
            .collect()
    }

    fn current_quote(&self, instrument: &str) -> Option<Quote> {
        self.find(instrument)?.quote()
    }

    fn static_constraints(&self, instrument: &str) -> Option<InstrumentConstraints> {
        self.find(instrument)
            .filter(|i| i.visible)
            .map(InstrumentConfig::constraints)
    }
}

impl TradingTerminal for SimulatedTerminal {
    fn connect(&mut self) -> Result<()> {
        if self.account.currency.trim().is_empty() {
            return Err(AnalysisError::TerminalInitialization(
                "account currency is not configured".to_string(),
            ));
        }
        if !self.connected {
            info!(
                "Connected to {} ({}), {} instruments",
                self.account.broker,
                self.account.server,
                self.instruments.len()
            );
        }
        self.connected = true;
        Ok(())
    }

    fn account_info(&self) -> Option<AccountInfo> {
        self.connected.then(|| self.account.clone())
    }

    fn shutdown(&mut self) {
        if self.connected {
            debug!("Shutting down simulated terminal");
        }
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
