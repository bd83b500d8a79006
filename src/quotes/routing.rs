//! Routing-aggregator venue adapter
//!
//! Wraps the odos-sdk swap builder: the aggregator searches its routing
//! graph and returns the best route with a guaranteed minimum output.
//! Only enough of the route is kept to re-assemble the transaction at
//! preparation time.

use crate::chain::ChainClient;
use crate::config::Network;
use crate::quotes::{Quote, QuotePayload, QuoteSource, RouteQuote, SwapParams, Venue};
use alloy::primitives::utils::parse_units;
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use odos_sdk::{Chain, OdosClient, Slippage};
use std::str::FromStr;
use std::sync::Arc;

pub struct RoutingAdapter {
    client: Arc<OdosClient>,
    chain: Arc<ChainClient>,
    /// Sender address the aggregator builds the route for
    sender: Address,
}

impl RoutingAdapter {
    pub fn new(client: Arc<OdosClient>, chain: Arc<ChainClient>, sender: Address) -> Self {
        Self {
            client,
            chain,
            sender,
        }
    }

    /// Convert a network into the aggregator's chain handle
    pub(crate) fn venue_chain(network: Network) -> Chain {
        match network {
            Network::Ethereum => Chain::ethereum(),
            Network::Arbitrum => Chain::arbitrum(),
            Network::Optimism => Chain::optimism(),
            Network::Base => Chain::base(),
            Network::Polygon => Chain::polygon(),
        }
    }

    pub(crate) fn venue_slippage(slippage_bps: u16) -> Option<Slippage> {
        Slippage::percent(f64::from(slippage_bps) / 100.0).ok()
    }
}

#[async_trait]
impl QuoteSource for RoutingAdapter {
    fn venue(&self) -> Venue {
        Venue::RouteAggregator
    }

    async fn quote(&self, params: &SwapParams) -> Option<Quote> {
        let decimals = match self.chain.token_decimals(params.from_token).await {
            Ok(decimals) => decimals,
            Err(err) => {
                tracing::warn!(
                    token = %params.from_token,
                    error = %err,
                    "decimals read failed, skipping route aggregator"
                );
                return None;
            }
        };

        let amount_in = match parse_units(&params.amount, decimals) {
            Ok(amount) => amount.get_absolute(),
            Err(err) => {
                tracing::warn!(amount = %params.amount, error = %err, "invalid source amount");
                return None;
            }
        };

        let Some(slippage) = Self::venue_slippage(params.slippage_bps) else {
            tracing::warn!(slippage_bps = params.slippage_bps, "invalid slippage");
            return None;
        };

        let quote = match self
            .client
            .swap()
            .chain(Self::venue_chain(params.chain))
            .from_token(params.from_token, amount_in)
            .to_token(params.to_token)
            .slippage(slippage)
            .signer(self.sender)
            .quote()
            .await
        {
            Ok(quote) => quote,
            Err(err) => {
                tracing::warn!(error = %err, "route aggregator quote failed");
                return None;
            }
        };

        let min_output = quote
            .out_amount()
            .and_then(|amount| U256::from_str(amount).ok())?;

        tracing::debug!(min_output = %min_output, "route aggregator quote");

        Some(Quote {
            venue: Venue::RouteAggregator,
            min_output,
            payload: QuotePayload::Route(RouteQuote {
                chain: params.chain,
                from_token: params.from_token,
                to_token: params.to_token,
                amount_in,
                slippage_bps: params.slippage_bps,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_network_maps_to_a_venue_chain() {
        for network in [
            Network::Ethereum,
            Network::Arbitrum,
            Network::Optimism,
            Network::Base,
            Network::Polygon,
        ] {
            let _ = RoutingAdapter::venue_chain(network);
        }
    }

    #[test]
    fn slippage_conversion() {
        assert!(RoutingAdapter::venue_slippage(50).is_some());
        assert!(RoutingAdapter::venue_slippage(100).is_some());
    }
}
