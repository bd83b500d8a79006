//! RFQ venue adapter
//!
//! Requests a firm bilateral quote over HTTP. The venue prices the order
//! off-chain and returns ready-to-send calldata with an approval target;
//! wire amounts are decimal strings and are parsed into integer units
//! before they cross into the engine.

use crate::chain::ChainClient;
use crate::config::Network;
use crate::quotes::{Quote, QuotePayload, QuoteSource, RfqOrder, SwapParams, Venue};
use crate::{Error, Result};
use alloy::primitives::utils::parse_units;
use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;

/// Chains the venue serves, by venue-side name
fn venue_chain_name(network: Network) -> Option<&'static str> {
    match network {
        Network::Ethereum => Some("ethereum"),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    quote: WireQuote,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireQuote {
    buy_amount: String,
    sell_amount: String,
    to: String,
    data: String,
    value: String,
    from: String,
    approval_target: String,
}

impl WireQuote {
    /// Parse the wire strings into a typed order. Any malformed field
    /// invalidates the whole quote.
    fn into_order(self) -> Option<RfqOrder> {
        Some(RfqOrder {
            to: Address::from_str(&self.to).ok()?,
            data: Bytes::from_str(&self.data).ok()?,
            value: U256::from_str(&self.value).ok()?,
            from: Address::from_str(&self.from).ok()?,
            approval_target: Address::from_str(&self.approval_target).ok()?,
            sell_amount: U256::from_str(&self.sell_amount).ok()?,
            buy_amount: U256::from_str(&self.buy_amount).ok()?,
        })
    }
}

pub struct RfqAdapter {
    http: reqwest::Client,
    /// Quote endpoint base URL
    endpoint: String,
    chain: Arc<ChainClient>,
    taker: Address,
}

impl RfqAdapter {
    pub fn new(endpoint: impl Into<String>, chain: Arc<ChainClient>, taker: Address) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            chain,
            taker,
        }
    }

    async fn request_quote(
        &self,
        chain_name: &str,
        sell_amount: U256,
        params: &SwapParams,
    ) -> Result<QuoteResponse> {
        let url = format!("{}/{}/v1/quote", self.endpoint, chain_name);
        let body = serde_json::json!({
            "sellTokens": [{
                "token": params.from_token,
                "amount": sell_amount.to_string(),
            }],
            "buyTokens": [{
                "token": params.to_token,
                "proportion": 1,
            }],
            "takerAddress": self.taker,
        });

        let response = self.http.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(Error::Rpc(format!("RFQ venue returned {}", response.status())));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl QuoteSource for RfqAdapter {
    fn venue(&self) -> Venue {
        Venue::Rfq
    }

    async fn quote(&self, params: &SwapParams) -> Option<Quote> {
        let Some(chain_name) = venue_chain_name(params.chain) else {
            tracing::debug!(chain = params.chain.name(), "RFQ venue does not serve this chain");
            return None;
        };

        let decimals = match self.chain.token_decimals(params.from_token).await {
            Ok(decimals) => decimals,
            Err(err) => {
                tracing::warn!(
                    token = %params.from_token,
                    error = %err,
                    "decimals read failed, skipping RFQ venue"
                );
                return None;
            }
        };

        let sell_amount = match parse_units(&params.amount, decimals) {
            Ok(amount) => amount.get_absolute(),
            Err(err) => {
                tracing::warn!(amount = %params.amount, error = %err, "invalid source amount");
                return None;
            }
        };

        let response = match self.request_quote(chain_name, sell_amount, params).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err, "RFQ quote failed");
                return None;
            }
        };

        let Some(order) = response.quote.into_order() else {
            tracing::warn!("RFQ venue returned a malformed quote");
            return None;
        };

        tracing::debug!(min_output = %order.buy_amount, "RFQ quote");

        Some(Quote {
            venue: Venue::Rfq,
            min_output: order.buy_amount,
            payload: QuotePayload::Rfq(order),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_mainnet_is_served() {
        assert_eq!(venue_chain_name(Network::Ethereum), Some("ethereum"));
        assert_eq!(venue_chain_name(Network::Arbitrum), None);
        assert_eq!(venue_chain_name(Network::Base), None);
    }

    #[test]
    fn wire_quote_parses_into_typed_order() {
        let response: QuoteResponse = serde_json::from_value(serde_json::json!({
            "quote": {
                "buyAmount": "995000",
                "sellAmount": "1000000000000000000",
                "to": "0x00000000000000000000000000000000000000aa",
                "data": "0xdeadbeef",
                "value": "0",
                "from": "0x00000000000000000000000000000000000000bb",
                "approvalTarget": "0x00000000000000000000000000000000000000cc"
            }
        }))
        .expect("parse response");

        let order = response.quote.into_order().expect("typed order");
        assert_eq!(order.buy_amount, U256::from(995_000u64));
        assert_eq!(order.sell_amount, U256::from(1_000_000_000_000_000_000u128));
        assert_eq!(order.data, Bytes::from_str("0xdeadbeef").unwrap());
        assert_eq!(order.value, U256::ZERO);
        assert_eq!(
            order.approval_target,
            Address::from_str("0x00000000000000000000000000000000000000cc").unwrap()
        );
    }

    #[test]
    fn malformed_address_invalidates_the_quote() {
        let wire = WireQuote {
            buy_amount: "1000".to_string(),
            sell_amount: "1000".to_string(),
            to: "not-an-address".to_string(),
            data: "0x".to_string(),
            value: "0".to_string(),
            from: "0x00000000000000000000000000000000000000bb".to_string(),
            approval_target: "0x00000000000000000000000000000000000000cc".to_string(),
        };
        assert!(wire.into_order().is_none());
    }
}
