//! # solana-pay - payment requests on Solana
//!
//! A Rust implementation of the Solana Pay protocol core. This library
//! encodes and parses payment URLs, builds unsigned transfer transactions,
//! locates a payment on the ledger by its reference, validates it against
//! the expected transfer, and fetches merchant-generated transactions with
//! signature verification.

pub mod blockchain;
pub mod client;
pub mod config;
pub mod crypto;
pub mod error;
pub mod ledger;
pub mod programs;
pub mod reference;
pub mod transaction;
pub mod transfer;
pub mod types;
pub mod uri;
pub mod validate;

// Re-exports for convenience
pub use blockchain::RpcClient;
pub use client::{FetchTransactionOptions, TransactionRequestClient};
pub use config::{RequestClientConfig, RpcConfig};
pub use crypto::{Hash, Keypair, Pubkey, Reference, Signature, Signer};
pub use error::{Error, Result};
pub use ledger::LedgerClient;
pub use reference::{find_reference, FindReferenceOptions};
pub use transaction::Transaction;
pub use transfer::{create_transfer, CreateTransferOptions};
pub use types::*;
pub use uri::{encode_url, parse_url};
pub use validate::{validate_transfer, ValidateTransferOptions};

/// Current version of the solana-pay library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
