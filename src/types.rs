//! Core types for Solana Pay requests

use crate::crypto::{base58, Pubkey, Signature};
use crate::transaction::Transaction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;

/// URL scheme of every payment request
pub const SOLANA_PROTOCOL: &str = "solana:";

/// Scheme a transaction-request link must use
pub const HTTPS_PROTOCOL: &str = "https";

/// Longest URL a wallet must accept
pub const MAX_URL_LENGTH: usize = 2048;

/// A static transfer of a fixed amount to a fixed recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequestUrl {
    /// Native account of the payee
    pub recipient: Pubkey,
    /// Amount in whole units of the asset; absent lets the wallet prompt
    pub amount: Option<Decimal>,
    /// Mint of the token to pay with; absent means the native asset
    pub spl_token: Option<Pubkey>,
    /// Correlation keys, order preserved
    pub references: Vec<Pubkey>,
    pub label: Option<String>,
    pub message: Option<String>,
    /// Attached to the transaction as a memo instruction
    pub memo: Option<String>,
}

impl TransferRequestUrl {
    /// A request with only a recipient
    pub fn new(recipient: Pubkey) -> Self {
        Self {
            recipient,
            amount: None,
            spl_token: None,
            references: Vec::new(),
            label: None,
            message: None,
            memo: None,
        }
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_spl_token(mut self, mint: Pubkey) -> Self {
        self.spl_token = Some(mint);
        self
    }

    pub fn with_reference(mut self, reference: impl Into<Pubkey>) -> Self {
        self.references.push(reference.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }
}

/// A dynamic request: the wallet asks `link` for the transaction to sign
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequestUrl {
    pub link: Url,
    pub label: Option<String>,
    pub message: Option<String>,
}

impl TransactionRequestUrl {
    pub fn new(link: Url) -> Self {
        Self {
            link,
            label: None,
            message: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Either kind of payment URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestUrl {
    Transfer(TransferRequestUrl),
    Transaction(TransactionRequestUrl),
}

impl From<TransferRequestUrl> for RequestUrl {
    fn from(fields: TransferRequestUrl) -> Self {
        Self::Transfer(fields)
    }
}

impl From<TransactionRequestUrl> for RequestUrl {
    fn from(fields: TransactionRequestUrl) -> Self {
        Self::Transaction(fields)
    }
}

/// What a transfer must move, used both to build and to validate it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferFields {
    pub recipient: Pubkey,
    /// Whole units of the asset
    pub amount: Decimal,
    pub spl_token: Option<Pubkey>,
    pub references: Vec<Pubkey>,
    pub memo: Option<String>,
}

impl TransferFields {
    pub fn new(recipient: Pubkey, amount: Decimal) -> Self {
        Self {
            recipient,
            amount,
            spl_token: None,
            references: Vec::new(),
            memo: None,
        }
    }

    pub fn with_spl_token(mut self, mint: Pubkey) -> Self {
        self.spl_token = Some(mint);
        self
    }

    pub fn with_reference(mut self, reference: impl Into<Pubkey>) -> Self {
        self.references.push(reference.into());
        self
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// Fields of a parsed transfer URL; `None` when it carries no amount
    pub fn from_url(url: &TransferRequestUrl) -> Option<Self> {
        Some(Self {
            recipient: url.recipient,
            amount: url.amount?,
            spl_token: url.spl_token,
            references: url.references.clone(),
            memo: url.memo.clone(),
        })
    }
}

/// How settled ledger state must be before a read reflects it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

/// Commitment levels accepted for transaction lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finality {
    #[default]
    Confirmed,
    Finalized,
}

impl From<Finality> for Commitment {
    fn from(finality: Finality) -> Self {
        match finality {
            Finality::Confirmed => Commitment::Confirmed,
            Finality::Finalized => Commitment::Finalized,
        }
    }
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

/// Merchant display metadata served on `GET <link>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequestMetadata {
    pub label: String,
    pub icon: String,
}

/// Body of `POST <link>`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRequest {
    #[serde(with = "base58")]
    pub account: Pubkey,
}

/// The three shapes a merchant may answer a `POST` with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostResponse {
    /// A transaction for the wallet to sign
    Transaction {
        transaction: Transaction,
        message: Option<String>,
    },
    /// An opaque challenge to sign with the wallet's message-signing UI
    SignMessage {
        data: Vec<u8>,
        state: String,
        message: Option<String>,
    },
    /// Nothing to sign, only text to show
    Message { message: String },
}

/// Body of `PUT <link>`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutRequest {
    #[serde(with = "base58")]
    pub account: Pubkey,
    #[serde(with = "base58")]
    pub signature: Signature,
    pub state: String,
}

/// Answer to `PUT <link>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutResponse {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn recipient() -> Pubkey {
        "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM".parse().unwrap()
    }

    #[test]
    fn test_transfer_request_builder() {
        let reference = Pubkey::new_from_array([5; 32]);
        let request = TransferRequestUrl::new(recipient())
            .with_amount(Decimal::from_str("0.01").unwrap())
            .with_reference(reference)
            .with_label("Michael")
            .with_memo("Order5678");

        assert_eq!(request.references, vec![reference]);
        assert_eq!(request.label.as_deref(), Some("Michael"));
        assert_eq!(request.message, None);
    }

    #[test]
    fn test_transfer_fields_from_url_requires_amount() {
        let without_amount = TransferRequestUrl::new(recipient());
        assert!(TransferFields::from_url(&without_amount).is_none());

        let with_amount = without_amount.with_amount(Decimal::ONE).with_memo("m");
        let fields = TransferFields::from_url(&with_amount).unwrap();
        assert_eq!(fields.amount, Decimal::ONE);
        assert_eq!(fields.memo.as_deref(), Some("m"));
    }

    #[test]
    fn test_commitment_serialization() {
        assert_eq!(serde_json::to_string(&Commitment::Finalized).unwrap(), "\"finalized\"");
        assert_eq!(Commitment::from(Finality::Confirmed), Commitment::Confirmed);
        assert_eq!(Commitment::default().as_str(), "confirmed");
    }

    #[test]
    fn test_put_request_serialization() {
        let body = PutRequest {
            account: recipient(),
            signature: Signature::default(),
            state: "opaque".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["account"], "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM");
        assert_eq!(json["state"], "opaque");
        assert_eq!(json["signature"], Signature::default().to_string());
    }
}
