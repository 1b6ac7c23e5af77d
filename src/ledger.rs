//! The ledger client collaborator
//!
//! Every component reads ledger state through [`LedgerClient`]. The crate
//! ships a JSON-RPC implementation in [`crate::blockchain`]; tests and
//! embedders can supply their own.

use crate::crypto::{base58, Hash, Pubkey, Signature};
use crate::error::LedgerError;
use crate::transaction::Transaction;
use crate::types::{Commitment, Finality};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Page size the ledger applies when none is requested
pub const DEFAULT_SIGNATURES_LIMIT: usize = 1000;

/// Read access to the ledger, plus transaction submission
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Account at `address`, or `None` if it does not exist
    async fn get_account_info(
        &self,
        address: &Pubkey,
        commitment: Commitment,
    ) -> Result<Option<AccountInfo>, LedgerError>;

    /// Mint state at `address`, or `None` if no account exists there
    async fn get_mint(
        &self,
        address: &Pubkey,
        commitment: Commitment,
    ) -> Result<Option<Mint>, LedgerError>;

    /// Token account state at `address`, or `None` if no account exists there
    async fn get_token_account(
        &self,
        address: &Pubkey,
        commitment: Commitment,
    ) -> Result<Option<TokenAccount>, LedgerError>;

    /// Signatures of transactions touching `address`, newest first
    async fn get_signatures_for_address(
        &self,
        address: &Pubkey,
        options: &SignaturesForAddressOptions,
    ) -> Result<Vec<SignatureInfo>, LedgerError>;

    /// Transaction with execution metadata, or `None` if unknown
    async fn get_transaction(
        &self,
        signature: &Signature,
        finality: Finality,
    ) -> Result<Option<TransactionRecord>, LedgerError>;

    async fn get_latest_blockhash(&self, commitment: Commitment) -> Result<Hash, LedgerError>;

    /// Submit a signed transaction
    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature, LedgerError>;
}

/// Generic account state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub lamports: u64,
    pub owner: Pubkey,
    pub executable: bool,
}

/// Token mint state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mint {
    pub decimals: u8,
    pub is_initialized: bool,
    pub supply: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenAccountState {
    Uninitialized,
    Initialized,
    Frozen,
}

/// An owner's balance of one mint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAccount {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub state: TokenAccountState,
}

impl TokenAccount {
    pub fn is_initialized(&self) -> bool {
        self.state != TokenAccountState::Uninitialized
    }

    pub fn is_frozen(&self) -> bool {
        self.state == TokenAccountState::Frozen
    }
}

/// Paging window for [`LedgerClient::get_signatures_for_address`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignaturesForAddressOptions {
    /// Page size; the ledger default applies when absent
    pub limit: Option<usize>,
    /// Start searching backwards from this signature
    pub before: Option<Signature>,
    /// Stop once this signature is reached
    pub until: Option<Signature>,
    pub finality: Finality,
}

/// One entry of a signatures-for-address page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    #[serde(with = "base58")]
    pub signature: Signature,
    pub slot: u64,
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub confirmation_status: Option<Commitment>,
}

impl SignatureInfo {
    /// Block time as a UTC timestamp, when the ledger recorded one
    pub fn block_time_utc(&self) -> Option<DateTime<Utc>> {
        self.block_time
            .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
    }
}

/// Token amount as reported in transaction metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiTokenAmount {
    /// Raw integer amount in minimal units
    pub amount: String,
    pub decimals: u8,
    #[serde(default)]
    pub ui_amount_string: Option<String>,
}

impl UiTokenAmount {
    /// Whole-unit amount, exact
    pub fn to_decimal(&self) -> Option<Decimal> {
        let raw: i128 = self.amount.parse().ok()?;
        Decimal::try_from_i128_with_scale(raw, u32::from(self.decimals)).ok()
    }
}

/// Token balance of one account of a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub account_index: usize,
    #[serde(with = "base58")]
    pub mint: Pubkey,
    #[serde(with = "base58::option", default)]
    pub owner: Option<Pubkey>,
    pub ui_token_amount: UiTokenAmount,
}

/// Execution metadata of a transaction
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMeta {
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub fee: u64,
    #[serde(default)]
    pub pre_balances: Vec<u64>,
    #[serde(default)]
    pub post_balances: Vec<u64>,
    #[serde(default)]
    pub pre_token_balances: Option<Vec<TokenBalance>>,
    #[serde(default)]
    pub post_token_balances: Option<Vec<TokenBalance>>,
    #[serde(default)]
    pub log_messages: Option<Vec<String>>,
}

/// A confirmed transaction and what happened when it ran
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub slot: u64,
    pub block_time: Option<i64>,
    pub transaction: Transaction,
    pub meta: Option<TransactionMeta>,
}
