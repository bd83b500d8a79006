//! Flash-loan bundling against an Aave V3 pool
//!
//! Wraps an ordered call sequence inside the pool's flash-loan entry point.
//! The pool calls the receiver contract back synchronously within the same
//! transaction, so atomicity is enforced by the chain itself: either the
//! whole arbitrage repays principal plus premium, or everything reverts.

use crate::execution::relay::BundleRelay;
use crate::execution::{ArbitrageBundle, PreparedCall};
use crate::{Error, Result};
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

sol! {
    interface IPool {
        function flashLoan(address receiverAddress, address[] calldata assets, uint256[] calldata amounts, uint256[] calldata interestRateModes, address onBehalfOf, bytes calldata params, uint16 referralCode) external;
    }

    interface IArbitrageExecutor {
        function executeArbitrage(bytes[] memory transactions) external;
    }
}

/// The pool's fixed flash-loan fee: 9 / 10000 = 0.09%
const PREMIUM_NUMERATOR: u64 = 9;
const PREMIUM_DENOMINATOR: u64 = 10_000;

/// Fixed premium on a borrowed amount, truncating integer math
pub fn premium(amount: U256) -> U256 {
    amount * U256::from(PREMIUM_NUMERATOR) / U256::from(PREMIUM_DENOMINATOR)
}

/// Loan terms passed to the callback-params builder
#[derive(Debug, Clone)]
pub struct FlashLoanTerms {
    pub assets: Vec<Address>,
    pub amounts: Vec<U256>,
    pub premiums: Vec<U256>,
    pub initiator: Address,
}

/// ABI-encode the atomic arbitrage payload executed inside the flash-loan
/// callback. Call order is preserved exactly.
pub fn encode_arbitrage_payload(bundle: &ArbitrageBundle) -> Bytes {
    IArbitrageExecutor::executeArbitrageCall {
        transactions: bundle.calls().iter().map(|call| call.data.clone()).collect(),
    }
    .abi_encode()
    .into()
}

pub struct FlashLoanBundler {
    /// Lending pool entry point
    pool: Address,
    /// Deployed receiver contract: borrows, runs the payload, repays
    executor: Address,
    relay: BundleRelay,
}

impl FlashLoanBundler {
    pub fn new(pool: Address, executor: Address, relay: BundleRelay) -> Self {
        Self {
            pool,
            executor,
            relay,
        }
    }

    /// Encode the single top-level `flashLoan` call. The executor contract
    /// is named as both receiver and on-behalf-of; interest rate modes are
    /// all zero (no debt left open).
    fn compose(&self, assets: &[Address], amounts: &[U256], params: Bytes) -> PreparedCall {
        let data = IPool::flashLoanCall {
            receiverAddress: self.executor,
            assets: assets.to_vec(),
            amounts: amounts.to_vec(),
            interestRateModes: vec![U256::ZERO; assets.len()],
            onBehalfOf: self.executor,
            params,
            referralCode: 0,
        }
        .abi_encode();

        PreparedCall {
            to: self.pool,
            data: data.into(),
            value: U256::ZERO,
        }
    }

    /// Borrow, run the callback payload, repay: one transaction, submitted
    /// through the private relay.
    ///
    /// The signed transaction is simulated first; a simulated revert
    /// discards the attempt before anything reaches the relay's builder.
    /// Every failure propagates. Falling back is the caller's policy, not
    /// this component's.
    pub async fn execute_flash_loan<F>(
        &self,
        assets: &[Address],
        amounts: &[U256],
        build_params: F,
    ) -> Result<B256>
    where
        F: FnOnce(&FlashLoanTerms) -> Bytes,
    {
        if assets.is_empty() || assets.len() != amounts.len() {
            return Err(Error::InvalidArgument(
                "flash loan needs one amount per asset".to_string(),
            ));
        }
        if amounts.iter().any(|amount| amount.is_zero()) {
            return Err(Error::InvalidArgument(
                "flash loan amounts must be positive".to_string(),
            ));
        }

        let terms = FlashLoanTerms {
            assets: assets.to_vec(),
            amounts: amounts.to_vec(),
            premiums: amounts.iter().copied().map(premium).collect(),
            initiator: self.executor,
        };
        let params = build_params(&terms);

        let call = self.compose(assets, amounts, params);
        let signed = self.relay.sign_bundle(std::slice::from_ref(&call)).await?;

        if !self.relay.simulate(&signed).await? {
            return Err(Error::SimulationRejected(
                "flash loan bundle would revert".to_string(),
            ));
        }

        let target_block = self.relay.next_target_block().await?;
        self.relay.send(&signed, target_block).await?;
        self.relay.await_inclusion(&signed, target_block).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainClient;
    use crate::config::{Network, RpcConfig};
    use crate::wallet::SecureWallet;
    use alloy::primitives::Bytes;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[test]
    fn premium_is_nine_basis_points_truncated() {
        assert_eq!(premium(U256::from(1_000_000u64)), U256::from(900u64));
        assert_eq!(premium(U256::from(10_000u64)), U256::from(9u64));
        // 9999 * 9 / 10000 = 8.9991, truncates to 8
        assert_eq!(premium(U256::from(9_999u64)), U256::from(8u64));
        assert_eq!(premium(U256::ZERO), U256::ZERO);
    }

    #[test]
    fn payload_embeds_every_call_in_order() {
        let mut bundle = ArbitrageBundle::new();
        for byte in [0x01u8, 0x02, 0x03] {
            bundle.push(PreparedCall {
                to: Address::from([byte; 20]),
                data: Bytes::from(vec![byte; 4]),
                value: U256::ZERO,
            });
        }

        let payload = encode_arbitrage_payload(&bundle);
        let decoded = IArbitrageExecutor::executeArbitrageCall::abi_decode(&payload).unwrap();

        assert_eq!(decoded.transactions.len(), 3);
        for (index, byte) in [0x01u8, 0x02, 0x03].into_iter().enumerate() {
            assert_eq!(decoded.transactions[index], Bytes::from(vec![byte; 4]));
        }
    }

    fn bundler() -> FlashLoanBundler {
        let wallet = Arc::new(
            SecureWallet::from_hex(
                "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
            )
            .unwrap(),
        );
        let mut urls = HashMap::new();
        urls.insert(1, "https://eth.llamarpc.com".to_string());
        let rpc = RpcConfig::with_urls(urls);
        let chain =
            Arc::new(ChainClient::new(&rpc, Network::Ethereum, Arc::clone(&wallet)).unwrap());
        let relay = BundleRelay::new("https://relay.flashbots.net", wallet, chain);

        FlashLoanBundler::new(Address::from([0xf0; 20]), Address::from([0xe0; 20]), relay)
    }

    #[test]
    fn compose_names_the_executor_as_receiver_and_on_behalf_of() {
        let bundler = bundler();
        let assets = vec![Address::from([0x01; 20])];
        let amounts = vec![U256::from(1_000_000u64)];

        let call = bundler.compose(&assets, &amounts, Bytes::from(vec![0xff]));
        assert_eq!(call.to, bundler.pool);
        assert_eq!(call.value, U256::ZERO);

        let decoded = IPool::flashLoanCall::abi_decode(&call.data).unwrap();
        assert_eq!(decoded.receiverAddress, bundler.executor);
        assert_eq!(decoded.onBehalfOf, bundler.executor);
        assert_eq!(decoded.assets, assets);
        assert_eq!(decoded.amounts, amounts);
        assert_eq!(decoded.interestRateModes, vec![U256::ZERO]);
        assert_eq!(decoded.referralCode, 0);
        assert_eq!(decoded.params, Bytes::from(vec![0xff]));
    }

    #[tokio::test]
    async fn rejects_empty_assets() {
        let err = bundler()
            .execute_flash_loan(&[], &[], |_| Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn rejects_zero_amounts() {
        let err = bundler()
            .execute_flash_loan(&[Address::from([0x01; 20])], &[U256::ZERO], |_| Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn rejects_mismatched_lengths() {
        let err = bundler()
            .execute_flash_loan(
                &[Address::from([0x01; 20])],
                &[U256::from(1u64), U256::from(2u64)],
                |_| Bytes::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
