//! Checking that a confirmed transaction paid what was asked

use crate::crypto::{Pubkey, Signature};
use crate::error::{OnchainError, ValidateTransferError};
use crate::ledger::{LedgerClient, TokenBalance, TransactionMeta, TransactionRecord};
use crate::programs::{self, SOL_DECIMALS};
use crate::types::{Finality, TransferFields};
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Options for [`validate_transfer`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateTransferOptions {
    /// Finality the transaction must have reached
    pub finality: Finality,
}

/// Confirm that the transaction at `signature` matches `fields`
///
/// The recipient's balance must have grown by at least `fields.amount`, so
/// overpayment passes. Every expected reference must appear among the
/// transaction's account keys, in any order. The memo is not checked.
pub async fn validate_transfer<C: LedgerClient + ?Sized>(
    ledger: &C,
    signature: &Signature,
    fields: &TransferFields,
    options: ValidateTransferOptions,
) -> Result<TransactionRecord, ValidateTransferError> {
    let record = ledger
        .get_transaction(signature, options.finality)
        .await?
        .ok_or(ValidateTransferError::NotFound)?;
    let meta = record.meta.as_ref().ok_or(ValidateTransferError::MissingMeta)?;

    if let Some(err) = meta.err.as_ref().filter(|err| !err.is_null()) {
        debug!(%signature, %err, "transaction failed on chain");
        return Err(ValidateTransferError::TransactionFailed(OnchainError(err.clone())));
    }

    let account_keys = record.transaction.message.account_keys.as_slice();
    let delta = match &fields.spl_token {
        Some(mint) => token_delta(account_keys, meta, &fields.recipient, mint)?,
        None => native_delta(account_keys, meta, &fields.recipient)?,
    };
    if delta < fields.amount {
        debug!(%signature, %delta, expected = %fields.amount, "amount not transferred");
        return Err(ValidateTransferError::AmountNotTransferred);
    }

    if let Some(missing) = fields
        .references
        .iter()
        .find(|reference| !account_keys.contains(reference))
    {
        debug!(%signature, reference = %missing, "reference missing from transaction");
        return Err(ValidateTransferError::ReferenceNotFound);
    }

    info!(%signature, recipient = %fields.recipient, %delta, "transfer validated");
    Ok(record)
}

fn native_delta(
    account_keys: &[Pubkey],
    meta: &TransactionMeta,
    recipient: &Pubkey,
) -> Result<Decimal, ValidateTransferError> {
    let index = position(account_keys, recipient)?;
    let pre = meta
        .pre_balances
        .get(index)
        .ok_or(ValidateTransferError::BalanceNotFound)?;
    let post = meta
        .post_balances
        .get(index)
        .ok_or(ValidateTransferError::BalanceNotFound)?;

    Ok(lamports_to_sol(*post) - lamports_to_sol(*pre))
}

fn token_delta(
    account_keys: &[Pubkey],
    meta: &TransactionMeta,
    recipient: &Pubkey,
    mint: &Pubkey,
) -> Result<Decimal, ValidateTransferError> {
    let recipient_ata = programs::associated_token_address(recipient, mint);
    let index = position(account_keys, &recipient_ata)?;

    let post = token_balance(meta.post_token_balances.as_deref(), index, mint)?;
    let pre = token_balance(meta.pre_token_balances.as_deref(), index, mint)?;
    Ok(post - pre)
}

fn position(account_keys: &[Pubkey], key: &Pubkey) -> Result<usize, ValidateTransferError> {
    account_keys
        .iter()
        .position(|candidate| candidate == key)
        .ok_or(ValidateTransferError::RecipientNotFound)
}

/// Whole-unit balance recorded for `index` and `mint`
fn token_balance(
    balances: Option<&[TokenBalance]>,
    index: usize,
    mint: &Pubkey,
) -> Result<Decimal, ValidateTransferError> {
    balances
        .unwrap_or_default()
        .iter()
        .find(|balance| balance.account_index == index && balance.mint == *mint)
        .and_then(|balance| balance.ui_token_amount.to_decimal())
        .ok_or(ValidateTransferError::BalanceNotFound)
}

fn lamports_to_sol(lamports: u64) -> Decimal {
    Decimal::from_i128_with_scale(i128::from(lamports), u32::from(SOL_DECIMALS))
}
