//! Chain-state access and transaction submission
//!
//! Thin wrapper over an alloy HTTP provider: ERC-20 reads (decimals,
//! allowance), head block and fee queries, and signed sends with receipt
//! waits. A provider is built per call from the configured RPC URL; no
//! connection state is shared between requests.

use crate::config::{Network, RpcConfig};
use crate::execution::PreparedCall;
use crate::wallet::SecureWallet;
use crate::{Error, Result};
use alloy::primitives::{Address, B256, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::sol;
use std::sync::Arc;

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function decimals() external view returns (uint8);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// Headroom applied over `eth_estimateGas`
const GAS_BUFFER_PERCENT: u64 = 20;

/// Read and write access to one chain, bound to one signer
#[derive(Debug)]
pub struct ChainClient {
    network: Network,
    rpc_url: String,
    wallet: Arc<SecureWallet>,
}

impl ChainClient {
    pub fn new(rpc: &RpcConfig, network: Network, wallet: Arc<SecureWallet>) -> Result<Self> {
        let rpc_url = rpc
            .get(network.chain_id())
            .ok_or_else(|| Error::Config(format!("no RPC URL configured for {}", network.name())))?
            .to_string();

        Ok(Self {
            network,
            rpc_url,
            wallet,
        })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn chain_id(&self) -> u64 {
        self.network.chain_id()
    }

    /// The signer address used for sends and quote requests
    pub fn sender(&self) -> Address {
        self.wallet.address()
    }

    fn provider(&self) -> Result<impl Provider> {
        let url: url::Url = self
            .rpc_url
            .parse()
            .map_err(|e| Error::Config(format!("invalid RPC URL: {e}")))?;
        Ok(ProviderBuilder::new().connect_http(url))
    }

    fn signing_provider(&self) -> Result<impl Provider> {
        let url: url::Url = self
            .rpc_url
            .parse()
            .map_err(|e| Error::Config(format!("invalid RPC URL: {e}")))?;
        Ok(ProviderBuilder::new()
            .wallet(self.wallet.wallet().clone())
            .connect_http(url))
    }

    /// Token decimals, read live from the contract
    pub async fn token_decimals(&self, token: Address) -> Result<u8> {
        let provider = self.provider()?;
        IERC20::new(token, provider)
            .decimals()
            .call()
            .await
            .map_err(|e| Error::Rpc(format!("decimals({token}): {e}")))
    }

    /// Current ERC-20 allowance from `owner` to `spender`
    pub async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        let provider = self.provider()?;
        IERC20::new(token, provider)
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| Error::Rpc(format!("allowance({token}): {e}")))
    }

    pub async fn block_number(&self) -> Result<u64> {
        let provider = self.provider()?;
        provider
            .get_block_number()
            .await
            .map_err(|e| Error::Rpc(format!("block number: {e}")))
    }

    pub async fn nonce(&self, account: Address) -> Result<u64> {
        let provider = self.provider()?;
        provider
            .get_transaction_count(account)
            .await
            .map_err(|e| Error::Rpc(format!("nonce({account}): {e}")))
    }

    /// Fee estimate for next-block inclusion: `(max_fee, max_priority_fee)`,
    /// both above the current gas price so the bundle competes for the block.
    pub async fn fees(&self) -> Result<(u128, u128)> {
        let provider = self.provider()?;
        let gas_price = provider
            .get_gas_price()
            .await
            .map_err(|e| Error::Rpc(format!("gas price: {e}")))?;

        let priority = gas_price * 20 / 100;
        let max_fee = gas_price * 110 / 100 + priority;
        Ok((max_fee, priority))
    }

    /// Gas limit for a call, buffered over the node's estimate
    pub async fn estimate_gas(&self, call: &PreparedCall) -> Result<u64> {
        let provider = self.provider()?;
        let tx = TransactionRequest::default()
            .from(self.wallet.address())
            .to(call.to)
            .input(call.data.clone().into())
            .value(call.value);

        let estimate = provider
            .estimate_gas(tx)
            .await
            .map_err(|e| Error::Rpc(format!("gas estimate: {e}")))?;
        Ok(estimate + estimate * GAS_BUFFER_PERCENT / 100)
    }

    /// Sign and submit one call through the public mempool, waiting for its
    /// receipt. Nonce assignment is handled by the provider's wallet filler.
    pub async fn send_call(&self, call: &PreparedCall) -> Result<TransactionReceipt> {
        let provider = self.signing_provider()?;
        let tx = TransactionRequest::default()
            .from(self.wallet.address())
            .to(call.to)
            .input(call.data.clone().into())
            .value(call.value);

        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(|e| Error::Rpc(format!("send: {e}")))?;

        pending
            .get_receipt()
            .await
            .map_err(|e| Error::Rpc(format!("receipt: {e}")))
    }

    pub async fn receipt(&self, hash: B256) -> Result<Option<TransactionReceipt>> {
        let provider = self.provider()?;
        provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| Error::Rpc(format!("receipt({hash}): {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn test_wallet() -> Arc<SecureWallet> {
        Arc::new(
            SecureWallet::from_hex(
                "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
            )
            .unwrap(),
        )
    }

    #[test]
    fn new_requires_configured_chain() {
        let rpc = RpcConfig::with_urls(HashMap::new());
        let err = ChainClient::new(&rpc, Network::Ethereum, test_wallet()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn new_binds_network_and_sender() {
        let mut urls = HashMap::new();
        urls.insert(1, "https://eth.llamarpc.com".to_string());
        let rpc = RpcConfig::with_urls(urls);

        let client = ChainClient::new(&rpc, Network::Ethereum, test_wallet()).unwrap();
        assert_eq!(client.chain_id(), 1);
        assert_eq!(client.sender(), test_wallet().address());
    }
}
