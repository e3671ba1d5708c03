//! Unified types shared by the terminal and the sizing core

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Price a position on this side is opened at
    pub fn entry_price(&self, quote: &Quote) -> Decimal {
        match self {
            Side::Buy => quote.ask,
            Side::Sell => quote.bid,
        }
    }

    /// Move `price` by `offset` in the profitable direction
    pub fn target_price(&self, price: Decimal, offset: Decimal) -> Decimal {
        match self {
            Side::Buy => price + offset,
            Side::Sell => price - offset,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Current top-of-book for an instrument
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub bid: Decimal,
    pub ask: Decimal,
}

impl Quote {
    pub fn new(bid: Decimal, ask: Decimal) -> Self {
        Self { bid, ask }
    }
}

/// Broker lot constraints and price precision for one instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConstraints {
    /// Smallest tradable lot
    pub volume_min: Decimal,
    /// Largest tradable lot
    pub volume_max: Decimal,
    /// Lot granularity
    pub volume_step: Decimal,
    /// Number of decimal digits in a quoted price
    pub price_digits: u32,
}

impl InstrumentConstraints {
    pub fn new(
        volume_min: Decimal,
        volume_max: Decimal,
        volume_step: Decimal,
        price_digits: u32,
    ) -> Self {
        Self {
            volume_min,
            volume_max,
            volume_step,
            price_digits,
        }
    }

    /// `10^price_digits`, the number of points in one whole price unit
    pub fn price_multiplier(&self) -> Decimal {
        10u64
            .checked_pow(self.price_digits)
            .map(Decimal::from)
            .unwrap_or(Decimal::MAX)
    }

    /// Convert a distance in points into an absolute price offset
    pub fn points_to_price(&self, points: u32) -> Decimal {
        Decimal::from(points) / self.price_multiplier()
    }

    /// Snap a raw lot to the nearest step, then clamp to `[volume_min, volume_max]`
    ///
    /// Midpoints round away from zero. Returns `None` when the step is not
    /// positive or the division by the step overflows.
    pub fn quantize_lot(&self, raw_lot: Decimal) -> Option<Decimal> {
        if self.volume_step <= Decimal::ZERO {
            return None;
        }

        let steps = raw_lot
            .checked_div(self.volume_step)?
            .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
        let snapped = steps.checked_mul(self.volume_step)?;

        Some(snapped.min(self.volume_max).max(self.volume_min).normalize())
    }
}

/// Trading account and broker identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Broker company name
    #[serde(default = "default_broker")]
    pub broker: String,
    /// Trade server the terminal is attached to
    #[serde(default = "default_server")]
    pub server: String,
    #[serde(default)]
    pub login: u64,
    /// Deposit currency, echoed in every instrument result
    pub currency: String,
    #[serde(default)]
    pub balance: Decimal,
    #[serde(default)]
    pub equity: Decimal,
    #[serde(default)]
    pub margin: Decimal,
    #[serde(default)]
    pub margin_free: Decimal,
    /// Account leverage (1:N)
    #[serde(default = "default_leverage")]
    pub leverage: u32,
}

fn default_broker() -> String {
    "Unknown Broker".to_string()
}

fn default_server() -> String {
    "Unknown Server".to_string()
}

fn default_leverage() -> u32 {
    100
}
