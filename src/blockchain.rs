//! JSON-RPC ledger client
//!
//! This module provides a [`LedgerClient`] backed by a Solana JSON-RPC node:
//! - Account, mint and token account lookups
//! - Signature history for an address
//! - Transactions with execution metadata
//! - Blockhashes and transaction submission

use crate::config::RpcConfig;
use crate::crypto::{base58, Hash, Pubkey, Signature};
use crate::error::LedgerError;
use crate::ledger::*;
use crate::transaction::{self, Transaction};
use crate::types::{Commitment, Finality};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

/// Ledger client speaking JSON-RPC over HTTP
#[derive(Debug, Clone)]
pub struct RpcClient {
    /// RPC endpoint URL
    url: String,
    /// HTTP client for RPC calls
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct Contextual<T> {
    value: T,
}

#[derive(Deserialize)]
struct RpcAccount {
    lamports: u64,
    #[serde(with = "base58")]
    owner: Pubkey,
    executable: bool,
    #[serde(default)]
    data: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcMint {
    decimals: u8,
    is_initialized: bool,
    supply: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcTokenAccount {
    #[serde(with = "base58")]
    mint: Pubkey,
    #[serde(with = "base58")]
    owner: Pubkey,
    state: TokenAccountState,
    token_amount: UiTokenAmount,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcTransaction {
    slot: u64,
    #[serde(default)]
    block_time: Option<i64>,
    /// `[data, encoding]`
    transaction: (String, String),
    #[serde(default)]
    meta: Option<TransactionMeta>,
}

#[derive(Deserialize)]
struct RpcBlockhash {
    #[serde(with = "base58")]
    blockhash: Hash,
}

impl RpcClient {
    /// Create a new RPC client
    pub fn new(config: RpcConfig) -> Result<Self> {
        config.validate()?;

        let mut client_builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        let client = client_builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            url: config.url,
            client,
        })
    }

    /// Get the endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> std::result::Result<T, LedgerError> {
        debug!(method, "RPC request");
        let response = self
            .client
            .post(&self.url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": method,
                "params": params,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LedgerError::invalid_response(format!(
                "{} failed with status: {}",
                method,
                response.status()
            )));
        }

        let body: RpcResponse = response.json().await?;
        if let Some(error) = body.error {
            return Err(LedgerError::rpc(error.code, error.message));
        }
        Ok(serde_json::from_value(body.result.unwrap_or(Value::Null))?)
    }

    async fn parsed_account(
        &self,
        address: &Pubkey,
        commitment: Commitment,
        expected_type: &str,
    ) -> std::result::Result<Option<Value>, LedgerError> {
        let account: Contextual<Option<RpcAccount>> = self
            .call(
                "getAccountInfo",
                json!([address.to_string(), { "encoding": "jsonParsed", "commitment": commitment }]),
            )
            .await?;

        let Some(account) = account.value else {
            return Ok(None);
        };
        let parsed = &account.data["parsed"];
        if parsed["type"] != expected_type {
            debug!(%address, expected_type, "account is not of the expected type");
            return Ok(None);
        }
        Ok(Some(parsed["info"].clone()))
    }
}

#[async_trait]
impl LedgerClient for RpcClient {
    async fn get_account_info(
        &self,
        address: &Pubkey,
        commitment: Commitment,
    ) -> std::result::Result<Option<AccountInfo>, LedgerError> {
        let account: Contextual<Option<RpcAccount>> = self
            .call(
                "getAccountInfo",
                json!([address.to_string(), {
                    "encoding": "base64",
                    "commitment": commitment,
                    "dataSlice": { "offset": 0, "length": 0 },
                }]),
            )
            .await?;

        Ok(account.value.map(|account| AccountInfo {
            lamports: account.lamports,
            owner: account.owner,
            executable: account.executable,
        }))
    }

    async fn get_mint(
        &self,
        address: &Pubkey,
        commitment: Commitment,
    ) -> std::result::Result<Option<Mint>, LedgerError> {
        let Some(info) = self.parsed_account(address, commitment, "mint").await? else {
            return Ok(None);
        };
        let mint: RpcMint = serde_json::from_value(info)?;
        Ok(Some(Mint {
            decimals: mint.decimals,
            is_initialized: mint.is_initialized,
            supply: mint
                .supply
                .parse()
                .map_err(|_| LedgerError::invalid_response("mint supply is not an integer"))?,
        }))
    }

    async fn get_token_account(
        &self,
        address: &Pubkey,
        commitment: Commitment,
    ) -> std::result::Result<Option<TokenAccount>, LedgerError> {
        let Some(info) = self.parsed_account(address, commitment, "account").await? else {
            return Ok(None);
        };
        let account: RpcTokenAccount = serde_json::from_value(info)?;
        Ok(Some(TokenAccount {
            mint: account.mint,
            owner: account.owner,
            amount: account
                .token_amount
                .amount
                .parse()
                .map_err(|_| LedgerError::invalid_response("token amount is not an integer"))?,
            state: account.state,
        }))
    }

    async fn get_signatures_for_address(
        &self,
        address: &Pubkey,
        options: &SignaturesForAddressOptions,
    ) -> std::result::Result<Vec<SignatureInfo>, LedgerError> {
        let mut config = Map::new();
        if let Some(limit) = options.limit {
            config.insert("limit".into(), json!(limit));
        }
        if let Some(before) = options.before {
            config.insert("before".into(), json!(before.to_string()));
        }
        if let Some(until) = options.until {
            config.insert("until".into(), json!(until.to_string()));
        }
        config.insert("commitment".into(), json!(options.finality));

        self.call("getSignaturesForAddress", json!([address.to_string(), config]))
            .await
    }

    async fn get_transaction(
        &self,
        signature: &Signature,
        finality: Finality,
    ) -> std::result::Result<Option<TransactionRecord>, LedgerError> {
        let record: Option<RpcTransaction> = self
            .call(
                "getTransaction",
                json!([signature.to_string(), { "encoding": "base64", "commitment": finality }]),
            )
            .await?;

        let Some(record) = record else {
            return Ok(None);
        };
        let (data, encoding) = &record.transaction;
        if encoding != "base64" {
            return Err(LedgerError::invalid_response(format!(
                "unexpected transaction encoding: {}",
                encoding
            )));
        }

        Ok(Some(TransactionRecord {
            slot: record.slot,
            block_time: record.block_time,
            transaction: transaction::from_base64(data)?,
            meta: record.meta,
        }))
    }

    async fn get_latest_blockhash(
        &self,
        commitment: Commitment,
    ) -> std::result::Result<Hash, LedgerError> {
        let latest: Contextual<RpcBlockhash> = self
            .call("getLatestBlockhash", json!([{ "commitment": commitment }]))
            .await?;
        Ok(latest.value.blockhash)
    }

    async fn send_transaction(
        &self,
        transaction: &Transaction,
    ) -> std::result::Result<Signature, LedgerError> {
        let signature: String = self
            .call(
                "sendTransaction",
                json!([transaction::to_base64(transaction)?, { "encoding": "base64" }]),
            )
            .await?;
        signature
            .parse()
            .map_err(|_| LedgerError::invalid_response("sendTransaction returned a bad signature"))
    }
}
