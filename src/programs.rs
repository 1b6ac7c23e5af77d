//! Well-known programs and the instructions Solana Pay emits for them

use crate::crypto::Pubkey;
use solana_sdk::instruction::Instruction;
use solana_sdk::program_error::ProgramError;
use std::sync::OnceLock;

/// Decimal places of the native asset
pub const SOL_DECIMALS: u8 = 9;

/// Program addresses, fixed for the life of the process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramIds {
    pub system: Pubkey,
    pub token: Pubkey,
    pub associated_token: Pubkey,
    pub memo: Pubkey,
}

static PROGRAM_IDS: OnceLock<ProgramIds> = OnceLock::new();

/// The program addresses, gathered on first use
pub fn program_ids() -> &'static ProgramIds {
    PROGRAM_IDS.get_or_init(|| ProgramIds {
        system: solana_sdk::system_program::id(),
        token: spl_token::id(),
        associated_token: spl_associated_token_account_client::program::id(),
        memo: spl_memo::id(),
    })
}

/// Move `lamports` from `from` to `to`
pub fn system_transfer(from: &Pubkey, to: &Pubkey, lamports: u64) -> Instruction {
    solana_system_interface::instruction::transfer(from, to, lamports)
}

/// Token transfer that aborts if the live mint's decimals differ from `decimals`
pub fn transfer_checked(
    source: &Pubkey,
    mint: &Pubkey,
    destination: &Pubkey,
    owner: &Pubkey,
    amount: u64,
    decimals: u8,
) -> Result<Instruction, ProgramError> {
    spl_token::instruction::transfer_checked(
        &program_ids().token,
        source,
        mint,
        destination,
        owner,
        &[],
        amount,
        decimals,
    )
}

/// Attach `memo` as raw UTF-8 to the memo program
pub fn memo(memo: &str) -> Instruction {
    spl_memo::build_memo(memo.as_bytes(), &[])
}

/// The associated token account of `owner` for `mint`
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    spl_associated_token_account_client::address::get_associated_token_address(owner, mint)
}
