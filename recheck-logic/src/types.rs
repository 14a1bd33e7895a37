use alloy::primitives::{B256, Bytes};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumIter, EnumString};

/// Chains that can be rechecked. The string form is the token accepted
/// in the `chainId` field of a recheck request.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Solana,
    Ethereum,
    Bsc,
    Polygon,
    Avalanche,
    Arbitrum,
    Optimism,
    Base,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum ChainFamily {
    #[strum(to_string = "evm")]
    Evm,
    #[strum(to_string = "solana")]
    Solana,
}

impl Chain {
    /// Numeric chain id used by the bridge protocol and the privileged peer.
    pub const fn id(self) -> u16 {
        match self {
            Chain::Solana => 1,
            Chain::Ethereum => 2,
            Chain::Bsc => 4,
            Chain::Polygon => 5,
            Chain::Avalanche => 6,
            Chain::Arbitrum => 23,
            Chain::Optimism => 24,
            Chain::Base => 30,
        }
    }

    pub const fn family(self) -> ChainFamily {
        match self {
            Chain::Solana => ChainFamily::Solana,
            _ => ChainFamily::Evm,
        }
    }
}

/// A syntactically validated, chain-native transaction reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxReference {
    pub chain: Chain,
    /// The reference exactly as the operator submitted it.
    pub raw: String,
    /// Decoded bytes: a 32-byte hash for EVM chains, a 64-byte signature for Solana.
    pub bytes: Bytes,
}

impl fmt::Display for TxReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageKey {
    pub emitter_chain: u16,
    pub emitter_address: B256,
    pub sequence: u64,
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "emitterChain={} emitterAddress={} sequence={}",
            self.emitter_chain,
            hex::encode(self.emitter_address),
            self.sequence
        )
    }
}

/// A bridge message located inside a fetched transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeMessage {
    pub emitter_chain: u16,
    pub emitter_address: B256,
    pub sequence: u64,
    pub nonce: u32,
    pub consistency_level: u8,
    pub payload: Bytes,
    /// Reference of the transaction the message was decoded from.
    pub tx_reference: String,
    /// Bytes the privileged peer needs to re-observe the message:
    /// the transaction hash on EVM chains, the message account on Solana.
    pub observation_reference: Bytes,
}

impl BridgeMessage {
    pub fn key(&self) -> MessageKey {
        MessageKey {
            emitter_chain: self.emitter_chain,
            emitter_address: self.emitter_address,
            sequence: self.sequence,
        }
    }
}
