//! Swap orchestration
//!
//! The top-level policy: gather quotes from every venue concurrently, rank
//! them, and pick the execution path. A wide enough gap between the two
//! best venues routes through the flash-loan arbitrage path; anything less,
//! or any failure along that path, executes the ranked quotes directly.
//! Exactly one path completes per request.

use crate::chain::ChainClient;
use crate::config::{EngineConfig, Network, RpcConfig};
use crate::execution::flashloan::{encode_arbitrage_payload, FlashLoanBundler};
use crate::execution::prepare::{PreparedStep, TransactionPreparer};
use crate::execution::relay::BundleRelay;
use crate::execution::{ArbitrageBundle, Transaction};
use crate::quotes::ranker::{is_arbitrage_opportunity, rank};
use crate::quotes::{
    collect_quotes, Quote, QuotePayload, QuoteSource, RfqAdapter, RoutingAdapter, SwapParams,
};
use crate::wallet::SecureWallet;
use crate::{Error, Result};
use alloy::primitives::U256;
use odos_sdk::OdosClient;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct SwapEngine {
    config: EngineConfig,
    rpc: RpcConfig,
    wallet: Arc<SecureWallet>,
    router: Arc<OdosClient>,
}

/// Per-request collaborators. Each swap owns its own set; nothing mutable
/// is shared between concurrent requests.
struct Execution {
    chain: Arc<ChainClient>,
    sources: Vec<Box<dyn QuoteSource>>,
    preparer: TransactionPreparer,
}

/// Rank the collected quotes, or fail the request when every venue came up
/// empty.
fn ranked_or_no_route(quotes: Vec<Quote>) -> Result<Vec<Quote>> {
    if quotes.is_empty() {
        return Err(Error::NoRouteFound);
    }
    Ok(rank(quotes))
}

impl SwapEngine {
    pub fn new(config: EngineConfig, rpc: RpcConfig, wallet: SecureWallet) -> Result<Self> {
        let router = OdosClient::new()
            .map_err(|e| Error::Config(format!("route aggregator client: {e}")))?;

        Ok(Self {
            config,
            rpc,
            wallet: Arc::new(wallet),
            router: Arc::new(router),
        })
    }

    /// Engine wired from the environment: signer key and RPC endpoints.
    /// Missing credentials fail here, before any quote is fetched.
    pub fn from_env(config: EngineConfig) -> Result<Self> {
        let wallet = SecureWallet::from_env()?;
        Self::new(config, RpcConfig::from_env(), wallet)
    }

    fn context(&self, network: Network) -> Result<Execution> {
        let chain = Arc::new(ChainClient::new(&self.rpc, network, Arc::clone(&self.wallet))?);
        let sender = self.wallet.address();

        let sources: Vec<Box<dyn QuoteSource>> = vec![
            Box::new(RoutingAdapter::new(
                Arc::clone(&self.router),
                Arc::clone(&chain),
                sender,
            )),
            Box::new(RfqAdapter::new(
                self.config.rfq_endpoint.clone(),
                Arc::clone(&chain),
                sender,
            )),
        ];
        let preparer = TransactionPreparer::new(Arc::clone(&chain), Arc::clone(&self.router));

        Ok(Execution {
            chain,
            sources,
            preparer,
        })
    }

    /// Execute a swap request end to end.
    pub async fn swap(&self, params: &SwapParams) -> Result<Transaction> {
        let ctx = self.context(params.chain)?;

        let ranked = ranked_or_no_route(collect_quotes(&ctx.sources, params).await)?;
        debug!(
            count = ranked.len(),
            best = %ranked[0].min_output,
            "ranked venue quotes"
        );

        if is_arbitrage_opportunity(&ranked) {
            info!("arbitrage opportunity detected, attempting flash-loan path");
            match self.execute_arbitrage(&ctx, &ranked, params).await {
                Ok(tx) => return Ok(tx),
                // the direct path can still succeed; this error never
                // becomes the operation's final result
                Err(err) => {
                    warn!(error = %err, "flash loan failed, falling back to direct swap");
                }
            }
        }

        for quote in &ranked {
            match self.execute_direct(&ctx, quote, params).await {
                Ok(tx) => return Ok(tx),
                Err(err) => {
                    warn!(
                        venue = quote.venue.name(),
                        error = %err,
                        "quote execution failed, trying next"
                    );
                }
            }
        }

        Err(Error::ExecutionFailed)
    }

    /// Fetch and rank quotes without executing anything.
    pub async fn quotes(&self, params: &SwapParams) -> Result<Vec<Quote>> {
        let ctx = self.context(params.chain)?;
        ranked_or_no_route(collect_quotes(&ctx.sources, params).await)
    }

    /// The arbitrage path: one prepared call per ranked quote, wrapped in a
    /// flash loan of the best quote's output, submitted as a private bundle.
    async fn execute_arbitrage(
        &self,
        ctx: &Execution,
        ranked: &[Quote],
        params: &SwapParams,
    ) -> Result<Transaction> {
        let executor = self.config.executor()?;
        let relay = BundleRelay::new(
            self.config.relay_url.clone(),
            Arc::clone(&self.wallet),
            Arc::clone(&ctx.chain),
        );
        let bundler = FlashLoanBundler::new(self.config.pool_address, executor, relay);

        let mut bundle = ArbitrageBundle::new();
        for quote in ranked {
            let step = ctx.preparer.prepare(quote, params).await?;
            bundle.push(step.into_call());
        }

        // borrow the best quote's guaranteed output, in the source token
        let borrow = ranked[0].min_output;
        let hash = bundler
            .execute_flash_loan(&[params.from_token], &[borrow], |_terms| {
                encode_arbitrage_payload(&bundle)
            })
            .await?;

        info!(hash = %hash, "flash-loan arbitrage bundle included");
        Ok(Transaction {
            hash,
            from: self.wallet.address(),
            to: self.config.pool_address,
            value: U256::ZERO,
            chain_id: params.chain.chain_id(),
        })
    }

    /// The direct path for one quote. RFQ quotes may need the two-step
    /// approval protocol: send the approval, wait for it to mine, then
    /// prepare again for the swap itself.
    async fn execute_direct(
        &self,
        ctx: &Execution,
        quote: &Quote,
        params: &SwapParams,
    ) -> Result<Transaction> {
        let call = match ctx.preparer.prepare(quote, params).await? {
            PreparedStep::Approval(approval) => {
                let receipt = ctx.chain.send_call(&approval).await?;
                debug!(hash = %receipt.transaction_hash, "approval mined, preparing swap");
                match ctx.preparer.prepare(quote, params).await? {
                    PreparedStep::Swap(swap) => swap,
                    PreparedStep::Approval(_) => {
                        return Err(Error::Preparation(
                            "allowance still insufficient after approval".to_string(),
                        ));
                    }
                }
            }
            PreparedStep::Swap(swap) => swap,
        };

        let receipt = ctx.chain.send_call(&call).await?;
        let (from, to) = match &quote.payload {
            QuotePayload::Rfq(order) => (order.from, order.to),
            QuotePayload::Route(_) => (self.wallet.address(), call.to),
        };

        info!(
            hash = %receipt.transaction_hash,
            venue = quote.venue.name(),
            "swap executed"
        );
        Ok(Transaction {
            hash: receipt.transaction_hash,
            from,
            to,
            value: call.value,
            chain_id: params.chain.chain_id(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotes::{RouteQuote, Venue};

    fn quote(min_output: u64) -> Quote {
        Quote {
            venue: Venue::RouteAggregator,
            min_output: U256::from(min_output),
            payload: QuotePayload::Route(RouteQuote {
                chain: Network::Ethereum,
                from_token: alloy::primitives::Address::ZERO,
                to_token: alloy::primitives::Address::ZERO,
                amount_in: U256::ZERO,
                slippage_bps: 50,
            }),
        }
    }

    #[test]
    fn empty_quote_set_is_no_route() {
        let err = ranked_or_no_route(vec![]).unwrap_err();
        assert!(matches!(err, Error::NoRouteFound));
    }

    #[test]
    fn quotes_come_back_ranked() {
        let ranked = ranked_or_no_route(vec![quote(990), quote(1000)]).unwrap();
        assert_eq!(ranked[0].min_output, U256::from(1000u64));
        assert_eq!(ranked[1].min_output, U256::from(990u64));
    }

    #[test]
    fn single_quote_never_triggers_arbitrage() {
        let ranked = ranked_or_no_route(vec![quote(1000)]).unwrap();
        assert!(!is_arbitrage_opportunity(&ranked));
    }

    #[test]
    fn one_percent_gap_triggers_arbitrage() {
        let ranked = ranked_or_no_route(vec![quote(990), quote(1000)]).unwrap();
        assert!(is_arbitrage_opportunity(&ranked));
    }
}
