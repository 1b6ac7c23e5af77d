//! Keys, signatures and references
//!
//! Ledger addresses, signatures and blockhashes are the `solana-sdk` types.
//! JSON bodies carry them as base58 strings through [`base58`].

use serde::{Deserialize, Deserializer, Serializer};
use std::fmt;
use std::str::FromStr;

pub use solana_sdk::hash::Hash;
pub use solana_sdk::pubkey::Pubkey;
pub use solana_sdk::signature::{Keypair, Signature};
pub use solana_sdk::signer::Signer;

/// Serde adapter for values whose text form is base58
///
/// `solana-sdk` serializes keys as byte arrays; JSON-RPC and merchant
/// endpoints expect strings.
pub mod base58 {
    use super::*;

    pub fn serialize<T: fmt::Display, S: Serializer>(
        value: &T,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: fmt::Display,
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }

    /// Same, for optional fields
    pub mod option {
        use super::*;

        pub fn serialize<T: fmt::Display, S: Serializer>(
            value: &Option<T>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.collect_str(value),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
        where
            T: FromStr,
            T::Err: fmt::Display,
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|s| s.parse().map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

/// A single-use correlation key attached to a transfer
///
/// The secret half is dropped immediately, so nobody can ever sign for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reference(Pubkey);

impl Reference {
    /// Create a fresh reference
    pub fn new() -> Self {
        Self(Keypair::new().pubkey())
    }

    /// The address to attach to a transaction and to search by
    pub fn pubkey(&self) -> Pubkey {
        self.0
    }
}

impl Default for Reference {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Reference> for Pubkey {
    fn from(reference: Reference) -> Self {
        reference.0
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Body {
        #[serde(with = "base58")]
        account: Pubkey,
        #[serde(with = "base58::option", default)]
        owner: Option<Pubkey>,
    }

    #[test]
    fn test_references_are_unique() {
        let a = Reference::new();
        let b = Reference::new();
        assert_ne!(a, b);
        assert_eq!(Pubkey::from(a), a.pubkey());
        assert_eq!(a.to_string(), a.pubkey().to_string());
    }

    #[test]
    fn test_reference_is_a_valid_address() {
        assert!(Reference::new().pubkey().is_on_curve());
    }

    #[test]
    fn test_base58_serde() {
        let account: Pubkey = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM".parse().unwrap();
        let body = Body {
            account,
            owner: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["account"], "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM");
        assert!(json["owner"].is_null());

        let back: Body = serde_json::from_value(serde_json::json!({
            "account": "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM",
            "owner": "11111111111111111111111111111111"
        }))
        .unwrap();
        assert_eq!(back.account, account);
        assert_eq!(back.owner, Some(Pubkey::default()));
    }

    #[test]
    fn test_base58_serde_rejects_bad_keys() {
        let result: Result<Body, _> =
            serde_json::from_value(serde_json::json!({ "account": "0OIl" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_signature_text_round_trip() {
        let keypair = Keypair::new();
        let signature = keypair.sign_message(b"pay 1 SOL");
        let parsed: Signature = signature.to_string().parse().unwrap();

        assert_eq!(parsed, signature);
        assert!(parsed.verify(keypair.pubkey().as_ref(), b"pay 1 SOL"));
        assert!(!parsed.verify(keypair.pubkey().as_ref(), b"pay 2 SOL"));
    }
}
