//! Building unsigned transfer transactions

use crate::crypto::Pubkey;
use crate::error::{CreateTransferError, Party};
use crate::ledger::{AccountInfo, LedgerClient, TokenAccount};
use crate::programs::{self, program_ids, SOL_DECIMALS};
use crate::transaction::Transaction;
use crate::types::{Commitment, TransferFields};
use rust_decimal::Decimal;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::message::Message;
use tracing::{debug, info};

/// Options for [`create_transfer`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateTransferOptions {
    /// Commitment for account and blockhash reads
    pub commitment: Commitment,
}

/// Build an unsigned transfer of `fields.amount` from `sender`
///
/// The transaction has `sender` as fee payer and a fresh blockhash. A memo,
/// when present, goes in its own instruction ahead of the transfer; each
/// reference is appended to the transfer instruction as a readonly
/// non-signer key.
pub async fn create_transfer<C: LedgerClient + ?Sized>(
    ledger: &C,
    sender: &Pubkey,
    fields: &TransferFields,
    options: CreateTransferOptions,
) -> Result<Transaction, CreateTransferError> {
    let commitment = options.commitment;

    let sender_info = ledger
        .get_account_info(sender, commitment)
        .await?
        .ok_or(CreateTransferError::SenderNotFound)?;
    let recipient_info = ledger
        .get_account_info(&fields.recipient, commitment)
        .await?
        .ok_or(CreateTransferError::RecipientNotFound)?;

    let mut transfer = match &fields.spl_token {
        Some(mint) => token_transfer(ledger, sender, fields, mint, commitment).await?,
        None => system_transfer(sender, &sender_info, fields, &recipient_info)?,
    };

    transfer.accounts.extend(
        fields
            .references
            .iter()
            .map(|reference| AccountMeta::new_readonly(*reference, false)),
    );

    let mut instructions = Vec::with_capacity(2);
    if let Some(memo) = &fields.memo {
        instructions.push(programs::memo(memo));
    }
    instructions.push(transfer);

    let blockhash = ledger.get_latest_blockhash(commitment).await?;
    let message = Message::new_with_blockhash(&instructions, Some(sender), &blockhash);

    info!(
        %sender,
        recipient = %fields.recipient,
        amount = %fields.amount,
        references = fields.references.len(),
        "created transfer"
    );
    Ok(Transaction::new_unsigned(message))
}

/// Whole units to minimal units for an asset with `decimals` places
///
/// Fails when `amount` has more decimal places than the asset. Within that
/// bound the conversion is exact, so no rounding is ever applied upward.
pub fn to_minimal_units(amount: Decimal, decimals: u8) -> Result<u64, CreateTransferError> {
    let amount = amount.normalize();
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(CreateTransferError::AmountInvalid);
    }

    let scale = amount.scale();
    if scale > u32::from(decimals) {
        return Err(CreateTransferError::AmountInvalidDecimals);
    }

    let mantissa = u128::try_from(amount.mantissa().unsigned_abs())
        .map_err(|_| CreateTransferError::AmountInvalid)?;
    10u128
        .checked_pow(u32::from(decimals) - scale)
        .and_then(|factor| mantissa.checked_mul(factor))
        .and_then(|units| u64::try_from(units).ok())
        .ok_or(CreateTransferError::AmountInvalid)
}

fn system_transfer(
    sender: &Pubkey,
    sender_info: &AccountInfo,
    fields: &TransferFields,
    recipient_info: &AccountInfo,
) -> Result<Instruction, CreateTransferError> {
    check_system_account(sender_info, Party::Sender)?;
    check_system_account(recipient_info, Party::Recipient)?;

    let lamports = to_minimal_units(fields.amount, SOL_DECIMALS)?;
    if lamports > sender_info.lamports {
        debug!(lamports, balance = sender_info.lamports, "sender cannot cover transfer");
        return Err(CreateTransferError::InsufficientFunds);
    }

    Ok(programs::system_transfer(sender, &fields.recipient, lamports))
}

fn check_system_account(info: &AccountInfo, party: Party) -> Result<(), CreateTransferError> {
    if info.owner != program_ids().system {
        return Err(CreateTransferError::OwnerInvalid(party));
    }
    if info.executable {
        return Err(CreateTransferError::ExecutableInvalid(party));
    }
    Ok(())
}

async fn token_transfer<C: LedgerClient + ?Sized>(
    ledger: &C,
    sender: &Pubkey,
    fields: &TransferFields,
    mint: &Pubkey,
    commitment: Commitment,
) -> Result<Instruction, CreateTransferError> {
    let mint_state = ledger
        .get_mint(mint, commitment)
        .await?
        .filter(|state| state.is_initialized)
        .ok_or(CreateTransferError::MintNotInitialized)?;

    let tokens = to_minimal_units(fields.amount, mint_state.decimals)?;

    let sender_ata = programs::associated_token_address(sender, mint);
    let sender_account = check_token_account(
        ledger.get_token_account(&sender_ata, commitment).await?,
        Party::Sender,
    )?;

    let recipient_ata = programs::associated_token_address(&fields.recipient, mint);
    check_token_account(
        ledger.get_token_account(&recipient_ata, commitment).await?,
        Party::Recipient,
    )?;

    if tokens > sender_account.amount {
        debug!(tokens, balance = sender_account.amount, %mint, "sender cannot cover transfer");
        return Err(CreateTransferError::InsufficientFunds);
    }

    Ok(programs::transfer_checked(
        &sender_ata,
        mint,
        &recipient_ata,
        sender,
        tokens,
        mint_state.decimals,
    )?)
}

fn check_token_account(
    account: Option<TokenAccount>,
    party: Party,
) -> Result<TokenAccount, CreateTransferError> {
    let account = account
        .filter(TokenAccount::is_initialized)
        .ok_or(CreateTransferError::AccountNotInitialized(party))?;
    if account.is_frozen() {
        return Err(CreateTransferError::AccountFrozen(party));
    }
    Ok(account)
}
