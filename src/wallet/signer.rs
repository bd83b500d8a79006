//! Secure wallet implementation
//!
//! SECURITY: This is the ONLY place where private keys exist.
//! - Keys are held in alloy's PrivateKeySigner which handles crypto securely
//! - Keys are never serialized and never logged
//! - Only signing operations are exposed

use crate::{Error, Result};
use alloy::consensus::{SignableTransaction, TxEip1559, TxEnvelope};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TxSignerSync};
use alloy::primitives::{Address, Bytes, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::{Signature, SignerSync};

/// Environment variable holding the hex-encoded signer key
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

/// A transaction signed and encoded for submission
#[derive(Debug, Clone)]
pub struct SignedTx {
    pub hash: B256,
    /// EIP-2718 encoded raw transaction
    pub raw: Bytes,
}

impl SignedTx {
    /// Hex encoding used in relay JSON-RPC params
    pub fn raw_hex(&self) -> String {
        format!("0x{}", alloy::hex::encode(&self.raw))
    }
}

/// Secure wallet that protects private keys
pub struct SecureWallet {
    signer: PrivateKeySigner,
    /// Public address (safe to expose)
    address: Address,
    /// Ethereum wallet for alloy provider integration
    wallet: EthereumWallet,
}

impl SecureWallet {
    /// Create a wallet from the `PRIVATE_KEY` environment variable.
    ///
    /// A missing or malformed key is a construction-time failure; nothing
    /// else in the engine is attempted without a working signer.
    pub fn from_env() -> Result<Self> {
        let key_hex = std::env::var(PRIVATE_KEY_ENV)
            .map_err(|_| Error::SignerMisconfigured(format!("{PRIVATE_KEY_ENV} not set")))?;
        Self::from_hex(&key_hex)
    }

    /// Create a wallet from a hex-encoded private key
    pub fn from_hex(key_hex: &str) -> Result<Self> {
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| Error::SignerMisconfigured(format!("invalid private key: {e}")))?;

        let address = signer.address();
        let wallet = EthereumWallet::from(signer.clone());

        Ok(Self {
            signer,
            address,
            wallet,
        })
    }

    /// Get the public address (safe to share)
    pub fn address(&self) -> Address {
        self.address
    }

    /// Ethereum wallet for use with alloy providers.
    ///
    /// Safe to hand out: it only exposes signing operations, not key material.
    pub fn wallet(&self) -> &EthereumWallet {
        &self.wallet
    }

    /// Sign a fully-populated EIP-1559 transaction, returning its hash and
    /// raw encoding ready for bundle submission.
    pub fn sign_call(&self, mut tx: TxEip1559) -> Result<SignedTx> {
        let signature = self
            .signer
            .sign_transaction_sync(&mut tx)
            .map_err(|e| Error::Wallet(format!("transaction signing failed: {e}")))?;

        let signed = tx.into_signed(signature);
        let hash = *signed.hash();
        let envelope: TxEnvelope = signed.into();

        Ok(SignedTx {
            hash,
            raw: envelope.encoded_2718().into(),
        })
    }

    /// Sign a 32-byte digest (relay authentication).
    pub fn sign_digest(&self, digest: B256) -> Result<Signature> {
        self.signer
            .sign_hash_sync(&digest)
            .map_err(|e| Error::Wallet(format!("signing failed: {e}")))
    }
}

// Implement Debug manually to avoid exposing the signer
impl std::fmt::Debug for SecureWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureWallet")
            .field("address", &self.address)
            .field("signer", &"[REDACTED]")
            .finish()
    }
}
