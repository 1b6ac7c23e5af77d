//! Integration tests for payment URL encoding and parsing

use rust_decimal::Decimal;
use solana_pay::error::ParseUrlError;
use solana_pay::*;
use std::str::FromStr;
use tokio_test::{assert_err, assert_ok};
use url::Url;

const CHECKOUT_URL: &str = "solana:9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM?amount=0.01&reference=3g1n4pJ6d3pG9mY4sVfX6dM8gk3sVVbYfdiC6RYzD6Ux&label=Michael&message=Thanks&memo=Order5678";

fn recipient() -> Pubkey {
    Pubkey::from_str("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM").unwrap()
}

fn transfer(url: &str) -> TransferRequestUrl {
    match assert_ok!(parse_url(url)) {
        RequestUrl::Transfer(request) => request,
        other => panic!("expected a transfer request, got {other:?}"),
    }
}

#[test]
fn test_checkout_url_parses_into_fields() {
    let request = transfer(CHECKOUT_URL);

    assert_eq!(request.recipient, recipient());
    assert_eq!(request.amount, Some(Decimal::from_str("0.01").unwrap()));
    assert_eq!(request.spl_token, None);
    assert_eq!(
        request.references,
        vec![Pubkey::from_str("3g1n4pJ6d3pG9mY4sVfX6dM8gk3sVVbYfdiC6RYzD6Ux").unwrap()]
    );
    assert_eq!(request.label.as_deref(), Some("Michael"));
    assert_eq!(request.message.as_deref(), Some("Thanks"));
    assert_eq!(request.memo.as_deref(), Some("Order5678"));
}

#[test]
fn test_checkout_url_reencodes_identically() {
    let request = transfer(CHECKOUT_URL);
    let encoded = encode_url(&RequestUrl::Transfer(request.clone()));

    assert_eq!(encoded, CHECKOUT_URL);
    assert_eq!(transfer(&encoded), request);
}

#[test]
fn test_round_trip_preserves_fields() {
    let mint = Pubkey::from_str("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v").unwrap();
    let requests = vec![
        TransferRequestUrl::new(recipient()),
        TransferRequestUrl::new(recipient()).with_amount(Decimal::from_str("1").unwrap()),
        TransferRequestUrl::new(recipient())
            .with_amount(Decimal::from_str("0.000000001").unwrap())
            .with_spl_token(mint)
            .with_reference(Pubkey::new_from_array([1; 32]))
            .with_reference(Pubkey::new_from_array([2; 32]))
            .with_reference(Pubkey::new_from_array([3; 32])),
        TransferRequestUrl::new(recipient())
            .with_amount(Decimal::from_str("12345.6789").unwrap())
            .with_label("Café & Bar")
            .with_message("Thanks for your order! #42 = 100%")
            .with_memo("OrderId=5678&x=y"),
        TransferRequestUrl::new(recipient())
            .with_label("  spaced  ")
            .with_message("plus+sign / slash ? query")
            .with_memo("üñíçødé 🚀"),
    ];

    for request in requests {
        let encoded = encode_url(&RequestUrl::Transfer(request.clone()));
        assert_eq!(transfer(&encoded), request, "round trip of {encoded}");
    }
}

#[test]
fn test_reference_order_is_preserved() {
    let references: Vec<Pubkey> = (1..=5).rev().map(|b| Pubkey::new_from_array([b; 32])).collect();
    let mut request = TransferRequestUrl::new(recipient());
    for reference in &references {
        request = request.with_reference(*reference);
    }

    let encoded = encode_url(&RequestUrl::Transfer(request));
    assert_eq!(encoded.matches("reference=").count(), 5);
    assert!(!encoded.contains("%2C"));
    assert_eq!(transfer(&encoded).references, references);
}

#[test]
fn test_amount_validation() {
    let base = "solana:9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM?amount=";
    for bad in ["-1", "NaN", "1e3", "1.", ".5", "+1", "1,5", "", "0x10", "Infinity"] {
        assert_eq!(
            parse_url(&format!("{base}{bad}")),
            Err(ParseUrlError::AmountInvalid),
            "amount {bad:?}"
        );
    }
    for good in ["0", "1", "0.5", "100.000000001"] {
        assert_ok!(parse_url(&format!("{base}{good}")), "amount {good:?}");
    }
}

#[test]
fn test_parse_failures_are_named() {
    assert_eq!(
        parse_url("bitcoin:9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM"),
        Err(ParseUrlError::ProtocolInvalid)
    );
    assert_eq!(parse_url("solana:notanaddress"), Err(ParseUrlError::RecipientInvalid));
    assert_eq!(
        parse_url("solana:9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM?spl-token=bad"),
        Err(ParseUrlError::TokenInvalid)
    );
    assert_eq!(
        parse_url(
            "solana:9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM?reference=3g1n4pJ6d3pG9mY4sVfX6dM8gk3sVVbYfdiC6RYzD6Ux&reference=bad"
        ),
        Err(ParseUrlError::ReferenceInvalid)
    );
    assert_eq!(
        parse_url(&format!("solana:{}", "1".repeat(2100))),
        Err(ParseUrlError::LengthInvalid)
    );
}

#[test]
fn test_transaction_request_url() {
    let link = Url::parse("https://merchant.example/api/pay?order=42&currency=usdc").unwrap();
    let request = TransactionRequestUrl::new(link.clone())
        .with_label("Merchant")
        .with_message("Pay for order 42");

    let encoded = encode_url(&RequestUrl::Transaction(request));
    assert!(encoded.starts_with("solana:https%3A%2F%2Fmerchant.example"));

    match assert_ok!(parse_url(&encoded)) {
        RequestUrl::Transaction(parsed) => {
            assert_eq!(parsed.link, link);
            assert_eq!(parsed.link.query(), Some("order=42&currency=usdc"));
            assert_eq!(parsed.label.as_deref(), Some("Merchant"));
            assert_eq!(parsed.message.as_deref(), Some("Pay for order 42"));
        }
        other => panic!("expected a transaction request, got {other:?}"),
    }
}

#[test]
fn test_transaction_request_link_must_be_https() {
    let err = assert_err!(parse_url("solana:http%3A%2F%2Fmerchant.example%2Fpay"));
    assert_eq!(err, ParseUrlError::LinkInvalid);
}
