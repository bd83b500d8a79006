//! Private bundle relay client
//!
//! Lifecycle per attempt: sign, simulate, submit, then included or missed.
//! Submission always targets the next block; inclusion is resolved by
//! receipt lookup once the target block has passed. A missed block fails
//! this attempt; retargeting is the caller's decision, never automatic.

use crate::chain::ChainClient;
use crate::execution::PreparedCall;
use crate::wallet::{SecureWallet, SignedTx};
use crate::{Error, Result};
use alloy::consensus::TxEip1559;
use alloy::primitives::{keccak256, TxKind, B256};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Poll cadence while waiting for the target block to pass
const INCLUSION_POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Upper bound on inclusion polling (a few mainnet blocks)
const INCLUSION_POLL_LIMIT: u32 = 30;

pub struct BundleRelay {
    endpoint: String,
    http: reqwest::Client,
    wallet: Arc<SecureWallet>,
    chain: Arc<ChainClient>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct SimulatedBundle {
    #[serde(default)]
    results: Vec<SimulatedTx>,
}

#[derive(Debug, Deserialize)]
struct SimulatedTx {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    revert: Option<String>,
}

/// Index of the first transaction the relay reports as reverting
fn first_revert(simulated: &SimulatedBundle) -> Option<usize> {
    simulated
        .results
        .iter()
        .position(|tx| tx.error.is_some() || tx.revert.is_some())
}

impl BundleRelay {
    pub fn new(
        endpoint: impl Into<String>,
        wallet: Arc<SecureWallet>,
        chain: Arc<ChainClient>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
            wallet,
            chain,
        }
    }

    /// Next submission target: current chain head + 1
    pub async fn next_target_block(&self) -> Result<u64> {
        Ok(self.chain.block_number().await? + 1)
    }

    /// Sign each call as an EIP-1559 transaction with consecutive nonces
    /// from the account's current transaction count.
    pub async fn sign_bundle(&self, calls: &[PreparedCall]) -> Result<Vec<SignedTx>> {
        let sender = self.chain.sender();
        let base_nonce = self.chain.nonce(sender).await?;
        let (max_fee_per_gas, max_priority_fee_per_gas) = self.chain.fees().await?;

        let mut signed = Vec::with_capacity(calls.len());
        for (offset, call) in calls.iter().enumerate() {
            let gas_limit = self.chain.estimate_gas(call).await?;
            let tx = TxEip1559 {
                chain_id: self.chain.chain_id(),
                nonce: base_nonce + offset as u64,
                gas_limit,
                max_fee_per_gas,
                max_priority_fee_per_gas,
                to: TxKind::Call(call.to),
                value: call.value,
                access_list: Default::default(),
                input: call.data.clone(),
            };
            signed.push(self.wallet.sign_call(tx)?);
        }

        Ok(signed)
    }

    /// Simulate the signed bundle against the next block's state.
    /// Profitable here means no transaction in the bundle reverts.
    pub async fn simulate(&self, bundle: &[SignedTx]) -> Result<bool> {
        let block = self.chain.block_number().await?;
        let result = self
            .call_relay(
                "eth_callBundle",
                json!([{
                    "txs": Self::raw_txs(bundle),
                    "blockNumber": format!("0x{:x}", block + 1),
                    "stateBlockNumber": "latest",
                }]),
            )
            .await?;

        let simulated: SimulatedBundle = serde_json::from_value(result)?;
        if let Some(index) = first_revert(&simulated) {
            tracing::warn!(index, "bundle simulation reported a revert");
            return Ok(false);
        }
        Ok(true)
    }

    /// Submit the signed bundle for one specific block
    pub async fn send(&self, bundle: &[SignedTx], target_block: u64) -> Result<()> {
        self.call_relay(
            "eth_sendBundle",
            json!([{
                "txs": Self::raw_txs(bundle),
                "blockNumber": format!("0x{:x}", target_block),
            }]),
        )
        .await?;

        tracing::info!(target_block, txs = bundle.len(), "bundle submitted to relay");
        Ok(())
    }

    /// Resolve inclusion for the target block. A missing receipt once the
    /// block has passed means the bundle was dropped.
    pub async fn await_inclusion(&self, bundle: &[SignedTx], target_block: u64) -> Result<B256> {
        let first = bundle
            .first()
            .ok_or_else(|| Error::InvalidArgument("empty bundle".to_string()))?;

        for _ in 0..INCLUSION_POLL_LIMIT {
            if self.chain.block_number().await? > target_block {
                break;
            }
            tokio::time::sleep(INCLUSION_POLL_INTERVAL).await;
        }

        match self.chain.receipt(first.hash).await? {
            Some(receipt) if receipt.block_number == Some(target_block) => {
                tracing::info!(hash = %first.hash, target_block, "bundle included");
                Ok(first.hash)
            }
            _ => Err(Error::BundleNotIncluded(target_block)),
        }
    }

    fn raw_txs(bundle: &[SignedTx]) -> Vec<String> {
        bundle.iter().map(SignedTx::raw_hex).collect()
    }

    /// Authenticated JSON-RPC call. The relay identifies searchers by a
    /// signature over the keccak hash of the exact request body, sent as
    /// `X-Flashbots-Signature: <address>:0x<sig>`.
    async fn call_relay(&self, method: &str, params: Value) -> Result<Value> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let body = request.to_string();
        let signature = self.auth_header(&body)?;

        let response = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("X-Flashbots-Signature", signature)
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Rpc(format!("relay returned {}", response.status())));
        }

        let parsed: RpcResponse = response.json().await?;
        if let Some(err) = parsed.error {
            return Err(Error::Rpc(format!("relay error {}: {}", err.code, err.message)));
        }

        parsed
            .result
            .ok_or_else(|| Error::Rpc(format!("{method}: empty relay response")))
    }

    fn auth_header(&self, body: &str) -> Result<String> {
        let digest = keccak256(body.as_bytes());
        let signature = self.wallet.sign_digest(digest)?;
        Ok(format!(
            "{}:0x{}",
            self.wallet.address(),
            alloy::hex::encode(signature.as_bytes())
        ))
    }
}
