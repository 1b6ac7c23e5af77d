//! Error types for the Solana Pay library
//!
//! Each component has its own closed set of failure kinds. Callers branch on
//! the variant, never on the message text.

use crate::crypto::Pubkey;
use serde_json::Value;
use solana_sdk::program_error::ProgramError;
use std::fmt;
use thiserror::Error;

/// Result type alias for flows that cross several components
pub type Result<T> = std::result::Result<T, Error>;

/// Failures raised by a [`LedgerClient`](crate::ledger::LedgerClient)
#[derive(Error, Debug)]
pub enum LedgerError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The node answered with a JSON-RPC error object
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The node answered with something we could not interpret
    #[error("Invalid RPC response: {message}")]
    InvalidResponse { message: String },

    /// A transaction returned by the node could not be decoded
    #[error("Invalid transaction: {0}")]
    Transaction(#[from] TransactionError),
}

impl LedgerError {
    /// Create an RPC error
    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        Self::Rpc {
            code,
            message: message.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}

/// Wire-format failures for ledger transactions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("transaction could not be decoded: {0}")]
    Decode(String),

    #[error("transaction could not be encoded: {0}")]
    Encode(String),

    /// Only legacy messages are accepted
    #[error("versioned transactions are not supported")]
    UnsupportedVersion,

    /// Header counts or account indices disagree with the account list
    #[error("malformed transaction: {0}")]
    Sanitize(String),

    #[error("account index {0} out of bounds")]
    IndexOutOfBounds(u8),
}

/// URL Codec failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseUrlError {
    #[error("length invalid")]
    LengthInvalid,

    #[error("protocol invalid")]
    ProtocolInvalid,

    #[error("pathname missing")]
    PathnameMissing,

    #[error("recipient invalid")]
    RecipientInvalid,

    #[error("amount invalid")]
    AmountInvalid,

    #[error("spl-token invalid")]
    TokenInvalid,

    #[error("reference invalid")]
    ReferenceInvalid,

    #[error("link invalid")]
    LinkInvalid,
}

/// Which side of a transfer a failure refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Sender,
    Recipient,
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::Sender => f.write_str("sender"),
            Party::Recipient => f.write_str("recipient"),
        }
    }
}

/// Transfer Builder failures
#[derive(Error, Debug)]
pub enum CreateTransferError {
    #[error("sender not found")]
    SenderNotFound,

    #[error("recipient not found")]
    RecipientNotFound,

    #[error("{0} owner invalid")]
    OwnerInvalid(Party),

    #[error("{0} executable")]
    ExecutableInvalid(Party),

    #[error("mint not initialized")]
    MintNotInitialized,

    #[error("amount decimals invalid")]
    AmountInvalidDecimals,

    #[error("{0} not initialized")]
    AccountNotInitialized(Party),

    #[error("{0} frozen")]
    AccountFrozen(Party),

    #[error("insufficient funds")]
    InsufficientFunds,

    /// Negative, or too large for a `u64` in minimal units
    #[error("amount invalid")]
    AmountInvalid,

    /// The token program rejected the instruction arguments
    #[error("invalid instruction: {0}")]
    Instruction(#[from] ProgramError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Reference Resolver failures
#[derive(Error, Debug)]
pub enum FindReferenceError {
    /// No transaction has touched the reference yet
    #[error("not found")]
    NotFound,

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl FindReferenceError {
    /// Whether polling again later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// An execution error exactly as the ledger recorded it
#[derive(Debug, Clone, PartialEq)]
pub struct OnchainError(pub Value);

impl fmt::Display for OnchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for OnchainError {}

/// Transfer Validator failures
#[derive(Error, Debug)]
pub enum ValidateTransferError {
    #[error("not found")]
    NotFound,

    #[error("missing meta")]
    MissingMeta,

    /// The transaction executed and failed on chain
    #[error("{0}")]
    TransactionFailed(OnchainError),

    #[error("recipient not found")]
    RecipientNotFound,

    #[error("balance not found")]
    BalanceNotFound,

    #[error("amount not transferred")]
    AmountNotTransferred,

    #[error("reference not found")]
    ReferenceNotFound,

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Transaction Request Fetcher failures
#[derive(Error, Debug)]
pub enum FetchTransactionError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The merchant endpoint answered with a non-success status
    #[error("request failed with status {status}")]
    Status { status: u16, message: Option<String> },

    /// Body matched none, or more than one, of the response shapes
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("invalid transaction: {0}")]
    InvalidTransaction(#[from] TransactionError),

    #[error("invalid fee payer")]
    InvalidFeePayer,

    /// A present signature did not verify against the message
    #[error("invalid signature for {signer}")]
    InvalidSignature { signer: Pubkey },

    /// An unsigned slot belongs to someone other than the requesting account
    #[error("missing signature for {signer}")]
    MissingSignature { signer: Pubkey },

    #[error("sign-message data is not valid base64")]
    InvalidData,

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl FetchTransactionError {
    /// Create an invalid response error
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Failures that mean the endpoint must not be trusted, as opposed to
    /// transient failures a caller could retry
    pub fn is_security_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidSignature { .. } | Self::MissingSignature { .. } | Self::InvalidFeePayer
        )
    }
}

/// Top-level error for callers driving a whole checkout flow
#[derive(Error, Debug)]
pub enum Error {
    #[error("parse URL: {0}")]
    ParseUrl(#[from] ParseUrlError),

    #[error("create transfer: {0}")]
    CreateTransfer(#[from] CreateTransferError),

    #[error("find reference: {0}")]
    FindReference(#[from] FindReferenceError),

    #[error("validate transfer: {0}")]
    ValidateTransfer(#[from] ValidateTransferError),

    #[error("fetch transaction: {0}")]
    FetchTransaction(#[from] FetchTransactionError),

    #[error("ledger: {0}")]
    Ledger(#[from] LedgerError),

    #[error("transaction: {0}")]
    Transaction(#[from] TransactionError),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
