//! Point-of-sale checkout against a JSON-RPC node
//!
//! Run against a local validator with a funded customer key:
//!
//! ```text
//! SOLANA_RPC_URL=http://127.0.0.1:8899 CUSTOMER_SECRET=<hex of 32 bytes> cargo run --example checkout
//! ```

use rust_decimal::Decimal;
use solana_pay::error::FindReferenceError;
use solana_pay::*;
use solana_sdk::signer::keypair::keypair_from_seed;
use std::str::FromStr;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const MERCHANT: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
const POLL_INTERVAL: Duration = Duration::from_secs(1);
const DEADLINE: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,solana_pay=debug")),
        )
        .init();

    let url = std::env::var("SOLANA_RPC_URL").unwrap_or_else(|_| "http://127.0.0.1:8899".into());
    let ledger = RpcClient::new(RpcConfig::new(url))?;

    // Merchant: one fresh reference per checkout
    let merchant = Pubkey::from_str(MERCHANT)?;
    let reference = Reference::new();
    let request = TransferRequestUrl::new(merchant)
        .with_amount(Decimal::from_str("0.01")?)
        .with_reference(reference)
        .with_label("Coffee Shop")
        .with_message("Thanks for your order!")
        .with_memo("Order5678");
    let encoded = encode_url(&request.into());
    println!("🧾 Payment URL: {}", encoded);

    // Wallet: parse, build, sign, send
    let customer = match customer_keypair() {
        Some(keypair) => keypair,
        None => {
            warn!("CUSTOMER_SECRET not set, generating an unfunded customer");
            Keypair::new()
        }
    };
    let RequestUrl::Transfer(parsed) = parse_url(&encoded)? else {
        return Err("expected a transfer request".into());
    };
    let fields = TransferFields::from_url(&parsed).ok_or("payment URL has no amount")?;

    let mut transaction =
        create_transfer(&ledger, &customer.pubkey(), &fields, CreateTransferOptions::default())
            .await?;
    let blockhash = transaction.message.recent_blockhash;
    transaction.try_partial_sign(&[&customer], blockhash)?;
    let sent = ledger.send_transaction(&transaction).await?;
    println!("💳 Sent transaction {}", sent);

    // Merchant: poll for the reference, then validate what it points at
    let started = Instant::now();
    let found = loop {
        match find_reference(&ledger, &reference.pubkey(), &FindReferenceOptions::default()).await {
            Ok(found) => break found,
            Err(err) if err.is_retryable() && started.elapsed() < DEADLINE => {
                sleep(POLL_INTERVAL).await;
            }
            Err(FindReferenceError::NotFound) => return Err("payment not seen before deadline".into()),
            Err(err) => return Err(err.into()),
        }
    };
    info!(signature = %found.signature, slot = found.slot, "reference found");

    let record = validate_transfer(
        &ledger,
        &found.signature,
        &fields,
        ValidateTransferOptions::default(),
    )
    .await?;
    println!("✅ Payment validated in slot {}", record.slot);

    Ok(())
}

fn customer_keypair() -> Option<Keypair> {
    let encoded = std::env::var("CUSTOMER_SECRET").ok()?;
    let secret = <[u8; 32]>::try_from(hex::decode(encoded.trim()).ok()?).ok()?;
    keypair_from_seed(&secret).ok()
}
