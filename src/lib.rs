//! Cross-venue swap engine
//!
//! Discovers token swap quotes from multiple venues, ranks them by
//! guaranteed output, and executes either a plain swap or, when the gap
//! between the two best venues is wide enough, an atomic flash-loan
//! arbitrage bundle submitted through a private relay.
//!
//! # Execution model
//!
//! - Venue adapters fail soft: a venue outage drops its quote, never the request
//! - Amounts cross settlement boundaries as integers in token smallest units
//! - A bundle reaches the relay only after a clean simulation
//! - Flash-loan failures fall back to direct execution of the best quote

pub mod chain;
pub mod config;
pub mod engine;
pub mod execution;
pub mod quotes;
pub mod wallet;

mod error;

// Re-export commonly used types
pub use config::{EngineConfig, Network, RpcConfig};
pub use engine::SwapEngine;
pub use error::{Error, Result};
pub use execution::Transaction;
pub use quotes::{Quote, SwapParams, Venue};
pub use wallet::SecureWallet;
