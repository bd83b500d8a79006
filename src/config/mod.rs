//! Configuration for the swap engine

pub mod rpc;

use crate::{Error, Result};
use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::path::Path;

// Re-export RPC config
pub use rpc::RpcConfig;

/// Default max slippage in basis points (0.50%)
pub const DEFAULT_SLIPPAGE_BPS: u16 = 50;

/// Supported blockchain networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Ethereum,
    Arbitrum,
    Optimism,
    Base,
    Polygon,
}

impl Network {
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Ethereum => 1,
            Network::Arbitrum => 42161,
            Network::Optimism => 10,
            Network::Base => 8453,
            Network::Polygon => 137,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Network::Ethereum => "ethereum",
            Network::Arbitrum => "arbitrum",
            Network::Optimism => "optimism",
            Network::Base => "base",
            Network::Polygon => "polygon",
        }
    }

    pub fn parse(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "ethereum" | "mainnet" => Ok(Network::Ethereum),
            "arbitrum" => Ok(Network::Arbitrum),
            "optimism" => Ok(Network::Optimism),
            "base" => Ok(Network::Base),
            "polygon" => Ok(Network::Polygon),
            other => Err(Error::InvalidArgument(format!("unknown network: {other}"))),
        }
    }
}

/// Well-known contract addresses
pub mod contracts {
    use super::*;

    /// Aave V3 Pool on Ethereum mainnet
    pub const AAVE_V3_POOL: Address = address!("87870bca3f3fd6335c3f4ce8392d69350b4fa4e2");
}

fn default_slippage_bps() -> u16 {
    DEFAULT_SLIPPAGE_BPS
}

fn default_rfq_endpoint() -> String {
    "https://api.bebop.xyz".to_string()
}

fn default_relay_url() -> String {
    "https://relay.flashbots.net".to_string()
}

fn default_pool_address() -> Address {
    contracts::AAVE_V3_POOL
}

/// Engine configuration
///
/// Every field has a working default except `executor_address`: the deployed
/// flash-loan receiver is deployment-specific and must be supplied before the
/// arbitrage path can run. Direct swaps work without it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Max slippage in basis points when the caller does not supply one
    #[serde(default = "default_slippage_bps")]
    pub default_slippage_bps: u16,
    /// RFQ venue quote endpoint base URL
    #[serde(default = "default_rfq_endpoint")]
    pub rfq_endpoint: String,
    /// Private relay endpoint for bundle submission
    #[serde(default = "default_relay_url")]
    pub relay_url: String,
    /// Lending pool used for flash loans
    #[serde(default = "default_pool_address")]
    pub pool_address: Address,
    /// Deployed arbitrage executor contract (flash-loan receiver)
    #[serde(default)]
    pub executor_address: Option<Address>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_slippage_bps: default_slippage_bps(),
            rfq_endpoint: default_rfq_endpoint(),
            relay_url: default_relay_url(),
            pool_address: default_pool_address(),
            executor_address: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    /// The arbitrage executor address, required for the flash-loan path
    pub fn executor(&self) -> Result<Address> {
        self.executor_address
            .ok_or_else(|| Error::Config("arbitrage executor address not configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_parse_accepts_aliases() {
        assert_eq!(Network::parse("ethereum").unwrap(), Network::Ethereum);
        assert_eq!(Network::parse("mainnet").unwrap(), Network::Ethereum);
        assert_eq!(Network::parse("Arbitrum").unwrap(), Network::Arbitrum);
        assert!(Network::parse("solana").is_err());
    }

    #[test]
    fn network_chain_ids() {
        assert_eq!(Network::Ethereum.chain_id(), 1);
        assert_eq!(Network::Arbitrum.chain_id(), 42161);
        assert_eq!(Network::Optimism.chain_id(), 10);
        assert_eq!(Network::Base.chain_id(), 8453);
        assert_eq!(Network::Polygon.chain_id(), 137);
    }

    #[test]
    fn config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.default_slippage_bps, 50);
        assert_eq!(config.pool_address, contracts::AAVE_V3_POOL);
        assert!(config.executor_address.is_none());
        assert!(config.executor().is_err());
    }

    #[test]
    fn config_deserialize_partial() {
        let parsed: EngineConfig = serde_json::from_value(serde_json::json!({
            "executor_address": "0x0000000000000000000000000000000000000001"
        }))
        .expect("parse config");
        assert_eq!(parsed.relay_url, "https://relay.flashbots.net");
        assert!(parsed.executor().is_ok());
    }

    #[test]
    fn config_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"default_slippage_bps\": 100}}").unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.default_slippage_bps, 100);
        assert_eq!(config.rfq_endpoint, "https://api.bebop.xyz");

        assert!(EngineConfig::from_file(Path::new("/nonexistent.json")).is_err());
    }
}
