use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::{fmt, str::FromStr};

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, DeserializeFromStr, SerializeDisplay)]
pub struct Pubkey(pub [u8; 32]);

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({self})")
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid base58 public key: {0}")]
pub struct ParsePubkeyError(String);

impl FromStr for Pubkey {
    type Err = ParsePubkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        match bs58::decode(s).onto(&mut bytes) {
            Ok(32) => Ok(Pubkey(bytes)),
            Ok(len) => Err(ParsePubkeyError(format!("{s} decodes to {len} bytes"))),
            Err(err) => Err(ParsePubkeyError(format!("{s}: {err}"))),
        }
    }
}

impl AsRef<[u8]> for Pubkey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Decodes a base58 transaction signature.
pub fn parse_signature(raw: &str) -> Option<[u8; 64]> {
    let mut bytes = [0u8; 64];
    match bs58::decode(raw).onto(&mut bytes) {
        Ok(64) => Some(bytes),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTransactionConfig {
    pub encoding: &'static str,
    pub commitment: &'static str,
    pub max_supported_transaction_version: u8,
}

impl Default for GetTransactionConfig {
    fn default() -> Self {
        Self {
            encoding: "json",
            commitment: "finalized",
            max_supported_transaction_version: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetAccountInfoConfig {
    pub encoding: &'static str,
    pub commitment: &'static str,
}

impl Default for GetAccountInfoConfig {
    fn default() -> Self {
        Self {
            encoding: "base64",
            commitment: "finalized",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse<T> {
    pub value: T,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedTransaction {
    pub slot: u64,
    pub transaction: UiTransaction,
    pub meta: Option<UiTransactionStatusMeta>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiTransaction {
    pub signatures: Vec<String>,
    pub message: UiMessage,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiMessage {
    pub account_keys: Vec<Pubkey>,
    pub instructions: Vec<UiCompiledInstruction>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiCompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    /// Base58 instruction data.
    pub data: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiTransactionStatusMeta {
    pub err: Option<serde_json::Value>,
    #[serde(default)]
    pub inner_instructions: Option<Vec<UiInnerInstructions>>,
    #[serde(default)]
    pub loaded_addresses: Option<UiLoadedAddresses>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiInnerInstructions {
    pub index: u8,
    pub instructions: Vec<UiCompiledInstruction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UiLoadedAddresses {
    pub writable: Vec<Pubkey>,
    pub readonly: Vec<Pubkey>,
}

/// `getAccountInfo` value with `base64` encoding.
#[derive(Debug, Clone, Deserialize)]
pub struct UiAccount {
    /// `[data, encoding]`
    pub data: (String, String),
    pub owner: Pubkey,
    pub lamports: u64,
}

/// Account that the post-message instruction wrote the message into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageAccount {
    pub address: Pubkey,
    pub owner: Pubkey,
    pub data: Vec<u8>,
}

/// A finalized transaction together with the message account its
/// post-message instruction points at, if there is one.
#[derive(Debug, Clone)]
pub struct FetchedTransaction {
    pub transaction: EncodedTransaction,
    pub message_account: Option<MessageAccount>,
}
