//! HTTP client for transaction request endpoints

use crate::config::RequestClientConfig;
use crate::crypto::{Pubkey, Signature};
use crate::error::FetchTransactionError;
use crate::ledger::LedgerClient;
use crate::transaction::{self, Transaction};
use crate::types::*;
use crate::Error;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use solana_sdk::message::Message;
use tracing::{debug, warn};
use url::Url;

/// Options for [`TransactionRequestClient::fetch_transaction`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchTransactionOptions {
    /// Commitment used when a fresh blockhash is attached
    pub commitment: Commitment,
}

/// Wallet-side client for a merchant's transaction request link
#[derive(Debug, Clone)]
pub struct TransactionRequestClient {
    client: Client,
}

/// `POST` answer before it is narrowed to one [`PostResponse`] shape
#[derive(Debug, Default, Deserialize)]
struct RawPostResponse {
    #[serde(default)]
    transaction: Option<String>,
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl TransactionRequestClient {
    /// Create a new client
    pub fn new(config: RequestClientConfig) -> crate::Result<Self> {
        let mut client_builder = Client::builder();
        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        if let Some(user_agent) = config.user_agent {
            client_builder = client_builder.user_agent(user_agent);
        }
        let client = client_builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Fetch the merchant's label and icon with `GET <link>`
    pub async fn get_metadata(
        &self,
        link: &Url,
    ) -> Result<TransactionRequestMetadata, FetchTransactionError> {
        debug!(%link, "fetching merchant metadata");
        let response = check_status(self.client.get(link.clone()).send().await?).await?;
        let metadata: TransactionRequestMetadata = read_json(response).await?;

        if metadata.label.is_empty() {
            return Err(FetchTransactionError::invalid_response("label is empty"));
        }
        if metadata.icon.is_empty() {
            return Err(FetchTransactionError::invalid_response("icon is empty"));
        }
        Ok(metadata)
    }

    /// `POST` the requesting account to `link` and check what comes back
    ///
    /// A returned transaction has every present signature verified. An open
    /// signer slot is only allowed for `account`. When `account` is the sole
    /// signer, a fresh blockhash replaces the one received; an unsigned
    /// transaction gets `account` as fee payer plus a fresh blockhash.
    pub async fn fetch_transaction<C: LedgerClient + ?Sized>(
        &self,
        ledger: &C,
        account: &Pubkey,
        link: &Url,
        options: FetchTransactionOptions,
    ) -> Result<PostResponse, FetchTransactionError> {
        debug!(%link, %account, "requesting transaction");
        let response = self
            .client
            .post(link.clone())
            .json(&PostRequest { account: *account })
            .send()
            .await?;
        let raw: RawPostResponse = read_json(check_status(response).await?).await?;

        match into_post_response(raw)? {
            PostResponse::Transaction {
                transaction,
                message,
            } => {
                let transaction =
                    prepare_transaction(ledger, account, transaction, options.commitment).await?;
                Ok(PostResponse::Transaction {
                    transaction,
                    message,
                })
            }
            other => Ok(other),
        }
    }

    /// `PUT` the signed message back to `link`
    ///
    /// Returns the endpoint's `success` flag.
    pub async fn send_signature(
        &self,
        link: &Url,
        account: &Pubkey,
        signature: &Signature,
        state: &str,
    ) -> Result<bool, FetchTransactionError> {
        let request = PutRequest {
            account: *account,
            signature: *signature,
            state: state.to_string(),
        };
        let response = self.client.put(link.clone()).json(&request).send().await?;
        let answer: PutResponse = read_json(check_status(response).await?).await?;

        debug!(%link, success = answer.success, "signature delivered");
        Ok(answer.success)
    }
}

impl Default for TransactionRequestClient {
    fn default() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

async fn check_status(response: Response) -> Result<Response, FetchTransactionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    let message = serde_json::from_slice::<ErrorBody>(&body)
        .ok()
        .and_then(|body| body.message);
    debug!(status = status.as_u16(), ?message, "endpoint refused request");
    Err(FetchTransactionError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, FetchTransactionError> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| FetchTransactionError::invalid_response(e.to_string()))
}

/// Narrow a raw answer to exactly one shape
fn into_post_response(raw: RawPostResponse) -> Result<PostResponse, FetchTransactionError> {
    match raw {
        RawPostResponse {
            transaction: Some(transaction),
            data: None,
            state: None,
            message,
        } => Ok(PostResponse::Transaction {
            transaction: transaction::from_base64(&transaction)?,
            message,
        }),
        RawPostResponse {
            transaction: None,
            data: Some(data),
            state: Some(state),
            message,
        } => Ok(PostResponse::SignMessage {
            data: general_purpose::STANDARD
                .decode(data)
                .map_err(|_| FetchTransactionError::InvalidData)?,
            state,
            message,
        }),
        RawPostResponse {
            transaction: None,
            data: None,
            state: None,
            message: Some(message),
        } => Ok(PostResponse::Message { message }),
        RawPostResponse {
            transaction: None,
            data: None,
            state: None,
            message: None,
        } => Err(FetchTransactionError::invalid_response(
            "response matches no known shape",
        )),
        _ => Err(FetchTransactionError::invalid_response(
            "response mixes fields of several shapes",
        )),
    }
}

async fn prepare_transaction<C: LedgerClient + ?Sized>(
    ledger: &C,
    account: &Pubkey,
    mut transaction: Transaction,
    commitment: Commitment,
) -> Result<Transaction, FetchTransactionError> {
    if transaction.signatures.is_empty() {
        let blockhash = ledger.get_latest_blockhash(commitment).await?;
        let instructions = transaction::decompile(&transaction.message)?;
        let message = Message::new_with_blockhash(&instructions, Some(account), &blockhash);
        debug!(%account, "unsigned transaction, setting fee payer");
        return Ok(Transaction::new_unsigned(message));
    }

    if transaction::fee_payer(&transaction).is_none()
        || !transaction::is_writable(&transaction.message, 0)
    {
        return Err(FetchTransactionError::InvalidFeePayer);
    }
    transaction::sanitize(&transaction)?;

    let data = transaction.message_data();
    let mut sole_signer_is_account = false;
    let slots = transaction.signatures.len();
    for (signer, signature) in transaction::signer_slots(&transaction) {
        match signature {
            Some(signature) => {
                if !signature.verify(signer.as_ref(), &data) {
                    warn!(%signer, "signature does not verify");
                    return Err(FetchTransactionError::InvalidSignature { signer });
                }
            }
            None if signer == *account => sole_signer_is_account = slots == 1,
            None => {
                warn!(%signer, "transaction leaves a foreign signer slot open");
                return Err(FetchTransactionError::MissingSignature { signer });
            }
        }
    }

    if sole_signer_is_account {
        transaction.message.recent_blockhash = ledger.get_latest_blockhash(commitment).await?;
        debug!(%account, "attached fresh blockhash");
    }
    Ok(transaction)
}
