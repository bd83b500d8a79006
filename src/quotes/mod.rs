//! Quote aggregation across swap venues
//!
//! Each venue adapter turns a [`SwapParams`] into at most one [`Quote`].
//! Adapters are best-effort: a venue outage, an unsupported chain, or a
//! malformed response drops that venue's quote and nothing else. The
//! orchestrator proceeds with whatever quotes succeeded.

pub mod ranker;
pub mod rfq;
pub mod routing;

pub use rfq::RfqAdapter;
pub use routing::RoutingAdapter;

use crate::config::{Network, DEFAULT_SLIPPAGE_BPS};
use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;

/// A same-chain token swap request
#[derive(Debug, Clone)]
pub struct SwapParams {
    pub chain: Network,
    pub from_token: Address,
    pub to_token: Address,
    /// Human-decimal amount of the source token
    pub amount: String,
    /// Max slippage in basis points
    pub slippage_bps: u16,
}

impl SwapParams {
    pub fn new(
        chain: Network,
        from_token: Address,
        to_token: Address,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            chain,
            from_token,
            to_token,
            amount: amount.into(),
            slippage_bps: DEFAULT_SLIPPAGE_BPS,
        }
    }

    pub fn with_slippage_bps(mut self, slippage_bps: u16) -> Self {
        self.slippage_bps = slippage_bps;
        self
    }
}

/// Venue identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Venue {
    RouteAggregator,
    Rfq,
}

impl Venue {
    pub fn name(&self) -> &'static str {
        match self {
            Venue::RouteAggregator => "route_aggregator",
            Venue::Rfq => "rfq",
        }
    }
}

/// Inputs needed to re-assemble an aggregator route into a transaction
#[derive(Debug, Clone)]
pub struct RouteQuote {
    pub chain: Network,
    pub from_token: Address,
    pub to_token: Address,
    /// Source amount in smallest units
    pub amount_in: U256,
    pub slippage_bps: u16,
}

/// A firm order returned by the RFQ venue
#[derive(Debug, Clone)]
pub struct RfqOrder {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    pub from: Address,
    pub approval_target: Address,
    /// Source amount in smallest units
    pub sell_amount: U256,
    /// Guaranteed output in smallest units
    pub buy_amount: U256,
}

/// Venue-specific execution payload, dispatched by tag in the preparer
#[derive(Debug, Clone)]
pub enum QuotePayload {
    Route(RouteQuote),
    Rfq(RfqOrder),
}

/// A best-effort quote from one venue
#[derive(Debug, Clone)]
pub struct Quote {
    pub venue: Venue,
    /// Guaranteed minimum output in the destination token's smallest unit
    pub min_output: U256,
    pub payload: QuotePayload,
}

/// One external liquidity venue
#[async_trait]
pub trait QuoteSource: Send + Sync {
    fn venue(&self) -> Venue;

    /// Fetch a quote. `None` means this venue has nothing to offer for the
    /// request; the cause is logged by the adapter, never propagated.
    async fn quote(&self, params: &SwapParams) -> Option<Quote>;
}

/// Fan out to all venues concurrently and collect the successes.
///
/// Join-all semantics: one adapter's failure never cancels another's
/// in-flight request.
pub async fn collect_quotes(sources: &[Box<dyn QuoteSource>], params: &SwapParams) -> Vec<Quote> {
    futures::future::join_all(sources.iter().map(|source| source.quote(params)))
        .await
        .into_iter()
        .flatten()
        .collect()
}
