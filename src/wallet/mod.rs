//! Wallet signing layer

mod signer;

pub use signer::{SecureWallet, SignedTx, PRIVATE_KEY_ENV};
