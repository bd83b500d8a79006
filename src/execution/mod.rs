//! Swap execution: call preparation, flash-loan bundling, and private
//! relay submission

pub mod flashloan;
pub mod prepare;
pub mod relay;

pub use flashloan::FlashLoanBundler;
pub use prepare::{PreparedStep, TransactionPreparer};
pub use relay::BundleRelay;

use alloy::primitives::{Address, Bytes, B256, U256};
use serde::Serialize;

/// A single unsigned on-chain call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCall {
    pub to: Address,
    pub data: Bytes,
    /// Native value attached to the call
    pub value: U256,
}

/// Ordered sequence of calls executed atomically inside the flash-loan
/// callback. Insertion order is execution order and must be preserved
/// exactly; reordering changes the atomicity guarantees.
#[derive(Debug, Clone, Default)]
pub struct ArbitrageBundle {
    calls: Vec<PreparedCall>,
}

impl ArbitrageBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, call: PreparedCall) {
        self.calls.push(call);
    }

    pub fn calls(&self) -> &[PreparedCall] {
        &self.calls
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

/// Result of a completed swap or arbitrage execution
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub hash: B256,
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub chain_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_preserves_insertion_order() {
        let mut bundle = ArbitrageBundle::new();
        for byte in [1u8, 2, 3] {
            bundle.push(PreparedCall {
                to: Address::from([byte; 20]),
                data: Bytes::from(vec![byte]),
                value: U256::ZERO,
            });
        }

        assert_eq!(bundle.len(), 3);
        let targets: Vec<Address> = bundle.calls().iter().map(|c| c.to).collect();
        assert_eq!(
            targets,
            vec![
                Address::from([1u8; 20]),
                Address::from([2u8; 20]),
                Address::from([3u8; 20])
            ]
        );
    }
}
