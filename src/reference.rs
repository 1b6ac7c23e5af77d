//! Locating the transaction that used a reference

use crate::crypto::{Pubkey, Signature};
use crate::error::FindReferenceError;
use crate::ledger::{
    LedgerClient, SignatureInfo, SignaturesForAddressOptions, DEFAULT_SIGNATURES_LIMIT,
};
use crate::types::Finality;
use tracing::debug;

/// Pages fetched before giving up on reaching the start of history
pub const DEFAULT_MAX_PAGES: usize = 10;

/// Options for [`find_reference`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindReferenceOptions {
    /// Signatures requested per page
    pub limit: usize,
    /// Start searching backwards from this signature
    pub before: Option<Signature>,
    /// Stop once this signature is reached
    pub until: Option<Signature>,
    pub finality: Finality,
    /// Upper bound on pages fetched in one call
    pub max_pages: usize,
}

impl Default for FindReferenceOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SIGNATURES_LIMIT,
            before: None,
            until: None,
            finality: Finality::default(),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// Find the oldest transaction that touched `reference`
///
/// A reference is used once, so the oldest signature for it is the transfer
/// that carried it. Pages are walked backwards while they come back full.
/// When a later page is empty, or the page cap is reached, the oldest
/// signature seen so far is returned.
///
/// No waiting happens here. [`FindReferenceError::NotFound`] means the
/// reference has not been indexed yet and the caller may poll again.
pub async fn find_reference<C: LedgerClient + ?Sized>(
    ledger: &C,
    reference: &Pubkey,
    options: &FindReferenceOptions,
) -> Result<SignatureInfo, FindReferenceError> {
    let limit = options.limit.max(1);
    let mut before = options.before;
    let mut oldest: Option<SignatureInfo> = None;

    for page in 0..options.max_pages.max(1) {
        let request = SignaturesForAddressOptions {
            limit: Some(limit),
            before,
            until: options.until,
            finality: options.finality,
        };
        let mut signatures = ledger.get_signatures_for_address(reference, &request).await?;
        let full = signatures.len() >= limit;

        let Some(last) = signatures.pop() else {
            break;
        };
        before = Some(last.signature);
        oldest = Some(last);

        if !full {
            return oldest.ok_or(FindReferenceError::NotFound);
        }
        debug!(%reference, page, "signature page full, paging back");
    }

    match oldest {
        Some(info) => {
            debug!(%reference, signature = %info.signature, "returning oldest signature seen");
            Ok(info)
        }
        None => {
            debug!(%reference, "reference not found");
            Err(FindReferenceError::NotFound)
        }
    }
}
