//! Trading terminal implementations

pub mod session;
pub mod simulated;

pub use session::TerminalSession;
pub use simulated::SimulatedTerminal;
