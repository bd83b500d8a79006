//! RPC endpoint configuration
//!
//! Endpoint precedence per chain:
//! 1. Per-chain env var (`ETH_RPC_URL`, `ARBITRUM_RPC_URL`, ...)
//! 2. URL derived from `ALCHEMY_API_KEY`
//! 3. Public fallback (rate limited, for testing only)

use crate::config::Network;
use std::collections::HashMap;

/// Provider API key environment variable
const ALCHEMY_API_KEY_ENV: &str = "ALCHEMY_API_KEY";

struct ChainEndpoint {
    network: Network,
    env_var: &'static str,
    alchemy_subdomain: &'static str,
    public_url: &'static str,
}

const ENDPOINTS: &[ChainEndpoint] = &[
    ChainEndpoint {
        network: Network::Ethereum,
        env_var: "ETH_RPC_URL",
        alchemy_subdomain: "eth-mainnet",
        public_url: "https://eth.llamarpc.com",
    },
    ChainEndpoint {
        network: Network::Arbitrum,
        env_var: "ARBITRUM_RPC_URL",
        alchemy_subdomain: "arb-mainnet",
        public_url: "https://arb1.arbitrum.io/rpc",
    },
    ChainEndpoint {
        network: Network::Optimism,
        env_var: "OPTIMISM_RPC_URL",
        alchemy_subdomain: "opt-mainnet",
        public_url: "https://mainnet.optimism.io",
    },
    ChainEndpoint {
        network: Network::Base,
        env_var: "BASE_RPC_URL",
        alchemy_subdomain: "base-mainnet",
        public_url: "https://mainnet.base.org",
    },
    ChainEndpoint {
        network: Network::Polygon,
        env_var: "POLYGON_RPC_URL",
        alchemy_subdomain: "polygon-mainnet",
        public_url: "https://polygon-rpc.com",
    },
];

/// RPC configuration for multiple chains
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// RPC URLs indexed by chain ID
    urls: HashMap<u64, String>,
}

impl RpcConfig {
    /// Resolve RPC endpoints from environment variables
    pub fn from_env() -> Self {
        let alchemy_key = std::env::var(ALCHEMY_API_KEY_ENV).ok();
        let mut urls = HashMap::new();

        for entry in ENDPOINTS {
            let url = match std::env::var(entry.env_var) {
                Ok(url) => {
                    tracing::debug!(chain = entry.network.name(), "using per-chain RPC URL");
                    url
                }
                Err(_) => match &alchemy_key {
                    Some(key) => {
                        format!("https://{}.g.alchemy.com/v2/{}", entry.alchemy_subdomain, key)
                    }
                    None => {
                        tracing::debug!(
                            chain = entry.network.name(),
                            "no RPC configured, using public endpoint (rate limited)"
                        );
                        entry.public_url.to_string()
                    }
                },
            };
            urls.insert(entry.network.chain_id(), url);
        }

        Self { urls }
    }

    /// Create with explicit RPC URLs
    pub fn with_urls(urls: HashMap<u64, String>) -> Self {
        Self { urls }
    }

    /// Get the RPC URL for a chain
    pub fn get(&self, chain_id: u64) -> Option<&str> {
        self.urls.get(&chain_id).map(|s| s.as_str())
    }

    /// Check whether a chain is configured
    pub fn has_chain(&self, chain_id: u64) -> bool {
        self.urls.contains_key(&chain_id)
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
