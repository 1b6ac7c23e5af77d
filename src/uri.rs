//! Encoding and parsing of `solana:` payment URLs
//!
//! Transfer requests carry the recipient address as the path:
//!
//! ```text
//! solana:<recipient>?amount=<decimal>&spl-token=<mint>&reference=<key>&label=..&message=..&memo=..
//! ```
//!
//! Transaction requests carry a percent-encoded `https` link instead:
//!
//! ```text
//! solana:<percent-encoded link>?label=..&message=..
//! ```

use crate::crypto::Pubkey;
use crate::error::ParseUrlError;
use crate::types::*;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;
use url::{form_urlencoded, Url};

/// Everything but RFC 3986 unreserved characters gets escaped
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Encode a payment request as a `solana:` URL
pub fn encode_url(request: &RequestUrl) -> String {
    match request {
        RequestUrl::Transfer(fields) => encode_transfer_request_url(fields),
        RequestUrl::Transaction(fields) => encode_transaction_request_url(fields),
    }
}

fn encode_transaction_request_url(fields: &TransactionRequestUrl) -> String {
    let mut url = format!(
        "{}{}",
        SOLANA_PROTOCOL,
        utf8_percent_encode(fields.link.as_str(), COMPONENT)
    );
    let mut query = QueryWriter::default();
    query.push_opt("label", fields.label.as_deref());
    query.push_opt("message", fields.message.as_deref());
    query.finish_into(&mut url);
    url
}

fn encode_transfer_request_url(fields: &TransferRequestUrl) -> String {
    let mut url = format!("{}{}", SOLANA_PROTOCOL, fields.recipient);
    let mut query = QueryWriter::default();

    if let Some(amount) = fields.amount {
        // Normalised: exactly as many fraction digits as decimal places.
        query.push("amount", &amount.normalize().to_string());
    }
    if let Some(mint) = fields.spl_token {
        query.push("spl-token", &mint.to_string());
    }
    for reference in &fields.references {
        query.push("reference", &reference.to_string());
    }
    query.push_opt("label", fields.label.as_deref());
    query.push_opt("message", fields.message.as_deref());
    query.push_opt("memo", fields.memo.as_deref());

    query.finish_into(&mut url);
    url
}

#[derive(Default)]
struct QueryWriter {
    pairs: Vec<String>,
}

impl QueryWriter {
    fn push(&mut self, key: &str, value: &str) {
        self.pairs
            .push(format!("{}={}", key, utf8_percent_encode(value, COMPONENT)));
    }

    fn push_opt(&mut self, key: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    fn finish_into(self, url: &mut String) {
        if !self.pairs.is_empty() {
            url.push('?');
            url.push_str(&self.pairs.join("&"));
        }
    }
}

/// Parse a `solana:` URL into a transfer or transaction request
pub fn parse_url(url: &str) -> Result<RequestUrl, ParseUrlError> {
    if url.chars().count() > MAX_URL_LENGTH {
        return Err(ParseUrlError::LengthInvalid);
    }

    let rest = url
        .strip_prefix(SOLANA_PROTOCOL)
        .ok_or(ParseUrlError::ProtocolInvalid)?;
    let rest = rest.split('#').next().unwrap_or_default();
    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, query),
        None => (rest, ""),
    };

    if path.is_empty() {
        return Err(ParseUrlError::PathnameMissing);
    }

    let params = QueryParams::parse(query);
    let parsed = if path.contains([':', '%']) {
        parse_transaction_request_url(path, &params).map(RequestUrl::Transaction)
    } else {
        parse_transfer_request_url(path, &params).map(RequestUrl::Transfer)
    };

    if let Err(error) = &parsed {
        debug!(%error, "rejected payment URL");
    }
    parsed
}

fn parse_transaction_request_url(
    path: &str,
    params: &QueryParams,
) -> Result<TransactionRequestUrl, ParseUrlError> {
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map_err(|_| ParseUrlError::LinkInvalid)?;
    let link = Url::parse(&decoded).map_err(|_| ParseUrlError::LinkInvalid)?;
    if link.scheme() != HTTPS_PROTOCOL {
        return Err(ParseUrlError::LinkInvalid);
    }

    Ok(TransactionRequestUrl {
        link,
        label: params.get("label"),
        message: params.get("message"),
    })
}

fn parse_transfer_request_url(
    path: &str,
    params: &QueryParams,
) -> Result<TransferRequestUrl, ParseUrlError> {
    let recipient = Pubkey::from_str(path).map_err(|_| ParseUrlError::RecipientInvalid)?;

    let amount = params
        .first("amount")
        .map(|raw| parse_amount(raw).ok_or(ParseUrlError::AmountInvalid))
        .transpose()?;

    let spl_token = params
        .first("spl-token")
        .map(|raw| Pubkey::from_str(raw).map_err(|_| ParseUrlError::TokenInvalid))
        .transpose()?;

    let references = params
        .all("reference")
        .map(|raw| Pubkey::from_str(raw).map_err(|_| ParseUrlError::ReferenceInvalid))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TransferRequestUrl {
        recipient,
        amount,
        spl_token,
        references,
        label: params.get("label"),
        message: params.get("message"),
        memo: params.get("memo"),
    })
}

/// Accepts `^\d+(\.\d+)?$` only: no sign, no exponent, no bare dot
///
/// Values a `Decimal` cannot hold exactly are refused rather than rounded.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let places = match raw.split_once('.') {
        Some((whole, fraction)) if digits(whole) && digits(fraction) => fraction.len(),
        None if digits(raw) => 0,
        _ => return None,
    };

    let amount = Decimal::from_str_exact(raw).ok()?;
    (amount.scale() as usize == places).then_some(amount)
}

struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    fn parse(query: &str) -> Self {
        Self(form_urlencoded::parse(query.as_bytes()).into_owned().collect())
    }

    fn first(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Optional display text; empty counts as absent
    fn get(&self, key: &str) -> Option<String> {
        self.first(key)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}
