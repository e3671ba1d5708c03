//! Scoped terminal acquisition

use std::ops::{Deref, DerefMut};
use std::time::Instant;
use tracing::{debug, info};

use crate::common::errors::Result;
use crate::common::traits::TradingTerminal;

/// Guard that owns a connected terminal and shuts it down on drop
///
/// # Example
///
/// ```ignore
/// let session = TerminalSession::open(SimulatedTerminal::new(config.terminal))?;
/// let account = session.account_info();
/// // terminal released when `session` goes out of scope
/// ```
pub struct TerminalSession<T: TradingTerminal> {
    terminal: T,
    opened_at: Instant,
}

impl<T: TradingTerminal> TerminalSession<T> {
    /// Connect `terminal` and wrap it
    pub fn open(mut terminal: T) -> Result<Self> {
        terminal.connect()?;
        debug!("Terminal session opened");
        Ok(Self {
            terminal,
            opened_at: Instant::now(),
        })
    }
}

impl<T: TradingTerminal> Deref for TerminalSession<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.terminal
    }
}

impl<T: TradingTerminal> DerefMut for TerminalSession<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.terminal
    }
}

impl<T: TradingTerminal> Drop for TerminalSession<T> {
    fn drop(&mut self) {
        self.terminal.shutdown();
        info!(
            "Terminal session closed after {:?}",
            self.opened_at.elapsed()
        );
    }
}
