//! Turning a chosen quote into an unsigned on-chain call
//!
//! RFQ quotes follow a two-step protocol: when the venue's approval target
//! lacks allowance on the sell token, preparation yields the approval call
//! and the caller re-invokes after it is mined. The approval and the swap
//! are never merged into one call.

use crate::chain::{ChainClient, IERC20};
use crate::execution::PreparedCall;
use crate::quotes::routing::RoutingAdapter;
use crate::quotes::{Quote, QuotePayload, RfqOrder, RouteQuote, SwapParams};
use crate::{Error, Result};
use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use odos_sdk::OdosClient;
use std::sync::Arc;

/// A prepared call, tagged with its role in the venue's execution protocol
#[derive(Debug, Clone)]
pub enum PreparedStep {
    /// ERC-20 approval that must be mined before the swap can be prepared
    Approval(PreparedCall),
    /// The swap itself
    Swap(PreparedCall),
}

impl PreparedStep {
    pub fn call(&self) -> &PreparedCall {
        match self {
            PreparedStep::Approval(call) | PreparedStep::Swap(call) => call,
        }
    }

    pub fn into_call(self) -> PreparedCall {
        match self {
            PreparedStep::Approval(call) | PreparedStep::Swap(call) => call,
        }
    }
}

pub struct TransactionPreparer {
    chain: Arc<ChainClient>,
    router: Arc<OdosClient>,
}

/// Decide the RFQ step from the current allowance. Pure so the two-step
/// protocol is testable without chain access.
fn rfq_step(order: &RfqOrder, sell_token: Address, allowance: U256) -> PreparedStep {
    if allowance < order.sell_amount {
        let data = IERC20::approveCall {
            spender: order.approval_target,
            amount: order.sell_amount,
        }
        .abi_encode();

        return PreparedStep::Approval(PreparedCall {
            to: sell_token,
            data: data.into(),
            value: U256::ZERO,
        });
    }

    PreparedStep::Swap(PreparedCall {
        to: order.to,
        data: order.data.clone(),
        value: order.value,
    })
}

impl TransactionPreparer {
    pub fn new(chain: Arc<ChainClient>, router: Arc<OdosClient>) -> Self {
        Self { chain, router }
    }

    pub async fn prepare(&self, quote: &Quote, params: &SwapParams) -> Result<PreparedStep> {
        match &quote.payload {
            QuotePayload::Rfq(order) => self.prepare_rfq(order, params).await,
            QuotePayload::Route(route) => self.prepare_route(route).await,
        }
    }

    async fn prepare_rfq(&self, order: &RfqOrder, params: &SwapParams) -> Result<PreparedStep> {
        let allowance = self
            .chain
            .allowance(params.from_token, order.from, order.approval_target)
            .await?;

        Ok(rfq_step(order, params.from_token, allowance))
    }

    /// Re-assemble the aggregator route into a transaction. The aggregator
    /// owns route execution; absence of a resolvable call is a hard failure.
    async fn prepare_route(&self, route: &RouteQuote) -> Result<PreparedStep> {
        let slippage = RoutingAdapter::venue_slippage(route.slippage_bps).ok_or_else(|| {
            Error::Preparation(format!("invalid slippage: {} bps", route.slippage_bps))
        })?;

        let tx = self
            .router
            .swap()
            .chain(RoutingAdapter::venue_chain(route.chain))
            .from_token(route.from_token, route.amount_in)
            .to_token(route.to_token)
            .slippage(slippage)
            .signer(self.chain.sender())
            .build_transaction()
            .await
            .map_err(|e| Error::Preparation(format!("route assembly failed: {e}")))?;

        let to = tx
            .to
            .and_then(|kind| kind.to().copied())
            .ok_or_else(|| Error::Preparation("route transaction has no target".to_string()))?;
        let data = tx
            .input
            .input
            .clone()
            .ok_or_else(|| Error::Preparation("route transaction has no calldata".to_string()))?;

        Ok(PreparedStep::Swap(PreparedCall {
            to,
            data,
            value: tx.value.unwrap_or(U256::ZERO),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Bytes;

    fn order() -> RfqOrder {
        RfqOrder {
            to: Address::from([0xaa; 20]),
            data: Bytes::from(vec![0xde, 0xad]),
            value: U256::from(7u64),
            from: Address::from([0xbb; 20]),
            approval_target: Address::from([0xcc; 20]),
            sell_amount: U256::from(1_000_000u64),
            buy_amount: U256::from(995_000u64),
        }
    }

    #[test]
    fn insufficient_allowance_yields_approval_on_sell_token() {
        let sell_token = Address::from([0x11; 20]);
        let step = rfq_step(&order(), sell_token, U256::from(999_999u64));

        let PreparedStep::Approval(call) = step else {
            panic!("expected approval step");
        };
        assert_eq!(call.to, sell_token);
        assert_eq!(call.value, U256::ZERO);
        // ERC-20 approve selector
        assert_eq!(&call.data[..4], &[0x09, 0x5e, 0xa7, 0xb3]);

        let decoded = IERC20::approveCall::abi_decode(&call.data).unwrap();
        assert_eq!(decoded.spender, order().approval_target);
        assert_eq!(decoded.amount, order().sell_amount);
    }

    #[test]
    fn sufficient_allowance_yields_the_swap_call() {
        let step = rfq_step(&order(), Address::from([0x11; 20]), U256::from(1_000_000u64));

        let PreparedStep::Swap(call) = step else {
            panic!("expected swap step");
        };
        assert_eq!(call.to, order().to);
        assert_eq!(call.data, order().data);
        assert_eq!(call.value, order().value);
    }

    #[test]
    fn step_unwraps_to_its_call() {
        let call = PreparedCall {
            to: Address::ZERO,
            data: Bytes::new(),
            value: U256::ZERO,
        };
        assert_eq!(PreparedStep::Approval(call.clone()).call(), &call);
        assert_eq!(PreparedStep::Swap(call.clone()).into_call(), call);
    }
}
