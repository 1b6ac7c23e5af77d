//! In-memory ledger shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use solana_pay::error::LedgerError;
use solana_pay::ledger::*;
use solana_pay::programs::{associated_token_address, program_ids};
use solana_pay::{Commitment, Finality, Hash, Pubkey, Signature, Transaction};
use std::collections::HashMap;
use std::sync::Mutex;

/// Ledger state held in maps; every lookup is a plain read
#[derive(Default)]
pub struct MockLedger {
    pub accounts: HashMap<Pubkey, AccountInfo>,
    pub mints: HashMap<Pubkey, Mint>,
    pub token_accounts: HashMap<Pubkey, TokenAccount>,
    pub transactions: HashMap<Signature, TransactionRecord>,
    /// Signature history per address, newest first
    pub history: HashMap<Pubkey, Vec<SignatureInfo>>,
    /// Answer every signature page with exactly this many fresh entries
    pub always_full: bool,
    pub blockhash: Hash,
    pub signature_requests: Mutex<Vec<SignaturesForAddressOptions>>,
    pub sent: Mutex<Vec<Transaction>>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            blockhash: Hash::new_from_array([42; 32]),
            ..Default::default()
        }
    }

    /// A plain wallet account owned by the system program
    pub fn with_wallet(mut self, address: Pubkey, lamports: u64) -> Self {
        self.accounts.insert(
            address,
            AccountInfo {
                lamports,
                owner: program_ids().system,
                executable: false,
            },
        );
        self
    }

    pub fn with_account(mut self, address: Pubkey, info: AccountInfo) -> Self {
        self.accounts.insert(address, info);
        self
    }

    pub fn with_mint(mut self, mint: Pubkey, decimals: u8) -> Self {
        self.mints.insert(
            mint,
            Mint {
                decimals,
                is_initialized: true,
                supply: u64::MAX,
            },
        );
        self
    }

    /// Token account at the owner's associated address
    pub fn with_token_account(
        mut self,
        owner: Pubkey,
        mint: Pubkey,
        amount: u64,
        state: TokenAccountState,
    ) -> Self {
        self.token_accounts.insert(
            associated_token_address(&owner, &mint),
            TokenAccount {
                mint,
                owner,
                amount,
                state,
            },
        );
        self
    }

    pub fn with_history(mut self, address: Pubkey, history: Vec<SignatureInfo>) -> Self {
        self.history.insert(address, history);
        self
    }

    pub fn with_transaction(mut self, signature: Signature, record: TransactionRecord) -> Self {
        self.transactions.insert(signature, record);
        self
    }

    pub fn always_full(mut self) -> Self {
        self.always_full = true;
        self
    }

    pub fn signature_requests(&self) -> Vec<SignaturesForAddressOptions> {
        self.signature_requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn get_account_info(
        &self,
        address: &Pubkey,
        _commitment: Commitment,
    ) -> Result<Option<AccountInfo>, LedgerError> {
        Ok(self.accounts.get(address).cloned())
    }

    async fn get_mint(
        &self,
        address: &Pubkey,
        _commitment: Commitment,
    ) -> Result<Option<Mint>, LedgerError> {
        Ok(self.mints.get(address).copied())
    }

    async fn get_token_account(
        &self,
        address: &Pubkey,
        _commitment: Commitment,
    ) -> Result<Option<TokenAccount>, LedgerError> {
        Ok(self.token_accounts.get(address).copied())
    }

    async fn get_signatures_for_address(
        &self,
        address: &Pubkey,
        options: &SignaturesForAddressOptions,
    ) -> Result<Vec<SignatureInfo>, LedgerError> {
        let limit = options.limit.unwrap_or(DEFAULT_SIGNATURES_LIMIT);
        let page = {
            let mut requests = self.signature_requests.lock().unwrap();
            requests.push(options.clone());
            requests.len()
        };

        if self.always_full {
            return Ok((0..limit)
                .map(|i| signature_info(page as u64 * 10_000 + i as u64))
                .collect());
        }

        let history = self.history.get(address).cloned().unwrap_or_default();
        let start = match options.before {
            Some(before) => history
                .iter()
                .position(|info| info.signature == before)
                .map_or(history.len(), |i| i + 1),
            None => 0,
        };
        Ok(history.into_iter().skip(start).take(limit).collect())
    }

    async fn get_transaction(
        &self,
        signature: &Signature,
        _finality: Finality,
    ) -> Result<Option<TransactionRecord>, LedgerError> {
        Ok(self.transactions.get(signature).cloned())
    }

    async fn get_latest_blockhash(&self, _commitment: Commitment) -> Result<Hash, LedgerError> {
        Ok(self.blockhash)
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature, LedgerError> {
        self.sent.lock().unwrap().push(transaction.clone());
        Ok(transaction.signatures.first().copied().unwrap_or_default())
    }
}

/// A distinct signature entry derived from `n`
pub fn signature_info(n: u64) -> SignatureInfo {
    let mut bytes = [0u8; 64];
    bytes[..8].copy_from_slice(&n.to_le_bytes());
    bytes[63] = 1;
    SignatureInfo {
        signature: Signature::from(bytes),
        slot: n,
        err: None,
        memo: None,
        block_time: None,
        confirmation_status: Some(Commitment::Confirmed),
    }
}

pub fn pubkey(byte: u8) -> Pubkey {
    Pubkey::new_from_array([byte; 32])
}
