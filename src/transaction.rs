//! Legacy ledger transactions on the wire
//!
//! Transactions are the `solana-sdk` types, bincode-encoded and carried as
//! base64 in JSON. Only legacy messages are accepted.

use crate::crypto::{Pubkey, Signature};
use crate::error::TransactionError;
use base64::{engine::general_purpose, Engine as _};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::message::Message;
use solana_sdk::sanitize::Sanitize;
use solana_sdk::transaction::VersionedTransaction;

pub use solana_sdk::transaction::Transaction;

/// Decode a wire-format legacy transaction
///
/// Structure is not checked here; see [`sanitize`].
pub fn deserialize(bytes: &[u8]) -> Result<Transaction, TransactionError> {
    let versioned: VersionedTransaction =
        bincode::deserialize(bytes).map_err(|e| TransactionError::Decode(e.to_string()))?;
    versioned
        .into_legacy_transaction()
        .ok_or(TransactionError::UnsupportedVersion)
}

/// Decode a base64 wire-format legacy transaction
pub fn from_base64(encoded: &str) -> Result<Transaction, TransactionError> {
    let bytes = general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| TransactionError::Decode(e.to_string()))?;
    deserialize(&bytes)
}

/// Wire-format bytes of `transaction`, base64 encoded
pub fn to_base64(transaction: &Transaction) -> Result<String, TransactionError> {
    let bytes =
        bincode::serialize(transaction).map_err(|e| TransactionError::Encode(e.to_string()))?;
    Ok(general_purpose::STANDARD.encode(bytes))
}

/// Check header counts and account indices against the account list
pub fn sanitize(transaction: &Transaction) -> Result<(), TransactionError> {
    transaction
        .sanitize()
        .map_err(|e| TransactionError::Sanitize(e.to_string()))
}

/// The first account, when the message has any signer
pub fn fee_payer(transaction: &Transaction) -> Option<Pubkey> {
    let message = &transaction.message;
    if message.header.num_required_signatures == 0 {
        return None;
    }
    message.account_keys.first().copied()
}

/// Each required signer with its signature; `None` marks an open slot
pub fn signer_slots(
    transaction: &Transaction,
) -> impl Iterator<Item = (Pubkey, Option<Signature>)> + '_ {
    let signers = usize::from(transaction.message.header.num_required_signatures);
    transaction
        .message
        .account_keys
        .iter()
        .take(signers)
        .zip(&transaction.signatures)
        .map(|(key, signature)| (*key, (*signature != Signature::default()).then_some(*signature)))
}

/// Whether the header marks account `index` writable
pub fn is_writable(message: &Message, index: usize) -> bool {
    let header = &message.header;
    let signers = usize::from(header.num_required_signatures);
    if index < signers {
        index < signers.saturating_sub(usize::from(header.num_readonly_signed_accounts))
    } else {
        index
            < message
                .account_keys
                .len()
                .saturating_sub(usize::from(header.num_readonly_unsigned_accounts))
    }
}

/// Expand compiled instructions back into instructions with account metas
pub fn decompile(message: &Message) -> Result<Vec<Instruction>, TransactionError> {
    let key = |index: u8| {
        message
            .account_keys
            .get(usize::from(index))
            .copied()
            .ok_or(TransactionError::IndexOutOfBounds(index))
    };

    message
        .instructions
        .iter()
        .map(|compiled| {
            let accounts = compiled
                .accounts
                .iter()
                .map(|&index| {
                    let i = usize::from(index);
                    Ok(AccountMeta {
                        pubkey: key(index)?,
                        is_signer: message.is_signer(i),
                        is_writable: is_writable(message, i),
                    })
                })
                .collect::<Result<Vec<_>, TransactionError>>()?;
            Ok(Instruction {
                program_id: key(compiled.program_id_index)?,
                accounts,
                data: compiled.data.clone(),
            })
        })
        .collect()
}
