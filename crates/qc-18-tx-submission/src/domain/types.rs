//! Core value types: transaction identity, envelopes and ledger results.
//!
//! ## Hashing
//!
//! A transaction's identity is bound to the network it targets, so the same
//! body submitted to two networks never collides:
//!
//! ```text
//! network_id = sha256(passphrase)
//! tx_hash    = sha256(network_id || ENVELOPE_TYPE_TX (u32 BE) || tx_body)
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Envelope type tag mixed into every transaction hash.
pub const ENVELOPE_TYPE_TX: u32 = 2;

/// 32-byte transaction identity, hex-encoded on the wire and in logs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionHash([u8; 32]);

impl TransactionHash {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hash a transaction body for the given network.
    pub fn compute(network: &NetworkId, tx_body: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(network.as_bytes());
        hasher.update(ENVELOPE_TYPE_TX.to_be_bytes());
        hasher.update(tx_body);
        Self(hasher.finalize().into())
    }

    /// Parse a 64 character hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TransactionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for TransactionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionHash({})", self.to_hex())
    }
}

impl FromStr for TransactionHash {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; 32]> for TransactionHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Serialize for TransactionHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TransactionHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Identity of the network a transaction is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetworkId([u8; 32]);

impl NetworkId {
    pub fn from_passphrase(passphrase: &str) -> Self {
        Self(Sha256::digest(passphrase.as_bytes()).into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Source account address (opaque, as rendered by the ledger).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountAddress(String);

impl AccountAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountAddress {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AccountAddress {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A signed transaction envelope, already split by the API layer into the
/// fields this subsystem needs.
///
/// `tx_body` is the unsigned transaction (what the hash covers); `encoded`
/// is the full signed envelope exactly as it is forwarded to the network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEnvelope {
    pub source: AccountAddress,
    pub sequence: u64,
    pub tx_body: Vec<u8>,
    pub encoded: String,
}

impl TransactionEnvelope {
    pub fn new(
        source: impl Into<AccountAddress>,
        sequence: u64,
        tx_body: Vec<u8>,
        encoded: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            sequence,
            tx_body,
            encoded: encoded.into(),
        }
    }

    pub fn hash(&self, network: &NetworkId) -> TransactionHash {
        TransactionHash::compute(network, &self.tx_body)
    }
}

/// Outcome of a transaction as recorded on the ledger.
///
/// A result with `error` set was applied but failed; it is still terminal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxResult {
    pub hash: TransactionHash,
    pub ledger_sequence: u64,
    pub envelope: String,
    pub result_payload: String,
    pub error: Option<String>,
}

impl TxResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_hex_roundtrip() {
        let hash = TransactionHash::new([0xAB; 32]);
        let hex = hash.to_string();
        assert_eq!(hex.len(), 64);
        assert_eq!(hex.parse::<TransactionHash>().unwrap(), hash);
    }

    #[test]
    fn test_hash_rejects_wrong_length() {
        assert!(TransactionHash::from_hex("abcd").is_err());
        assert!(TransactionHash::from_hex(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn test_hash_depends_on_network() {
        let body = b"payment".to_vec();
        let test_net = NetworkId::from_passphrase("Test Network");
        let public_net = NetworkId::from_passphrase("Public Network");

        let a = TransactionHash::compute(&test_net, &body);
        let b = TransactionHash::compute(&public_net, &body);
        assert_ne!(a, b);
        assert_eq!(a, TransactionHash::compute(&test_net, &body));
    }

    #[test]
    fn test_envelope_hash_ignores_signatures() {
        let network = NetworkId::from_passphrase("Test Network");
        let a = TransactionEnvelope::new("GA", 1, b"body".to_vec(), "signed-by-a");
        let b = TransactionEnvelope::new("GA", 1, b"body".to_vec(), "signed-by-b");
        assert_eq!(a.hash(&network), b.hash(&network));
    }

    #[test]
    fn test_result_serialization() {
        let result = TxResult {
            hash: TransactionHash::new([1; 32]),
            ledger_sequence: 2,
            envelope: "env".into(),
            result_payload: "res".into(),
            error: None,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains(&"01".repeat(32)));
        let parsed: TxResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
        assert!(parsed.is_success());
    }
}
