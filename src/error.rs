//! Error types for the swap engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Missing or unparseable signer credentials. Raised at construction,
    /// before any quote is fetched.
    #[error("signer misconfigured: {0}")]
    SignerMisconfigured(String),

    /// No venue produced a quote for the request.
    #[error("no route found")]
    NoRouteFound,

    /// A chosen quote could not be turned into an on-chain call.
    #[error("quote preparation failed: {0}")]
    Preparation(String),

    /// The bundle would revert; discarded before submission.
    #[error("bundle simulation rejected: {0}")]
    SimulationRejected(String),

    /// The relay did not land the bundle in its target block.
    #[error("bundle not included in block {0}")]
    BundleNotIncluded(u64),

    /// Every ranked quote failed to execute.
    #[error("execution failed")]
    ExecutionFailed,

    #[error("wallet error: {0}")]
    Wallet(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
