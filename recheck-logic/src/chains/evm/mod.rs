mod abi;
pub mod decoder;

pub use abi::IBridgeCore;

use super::ChainAdapter;
use crate::{
    error::{DecodeError, FetchError, RecheckError},
    types::{BridgeMessage, Chain, TxReference},
};
use alloy::{
    network::Ethereum,
    primitives::{Address, B256, Bytes},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionReceipt,
};
use async_trait::async_trait;
use url::Url;

/// Parses a `0x`-prefixed 32-byte transaction hash.
pub fn parse_tx_hash(raw: &str) -> Option<B256> {
    let digits = raw.strip_prefix("0x")?;
    if digits.len() != 64 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    digits.parse().ok()
}

pub struct EvmAdapter {
    chain: Chain,
    provider: DynProvider<Ethereum>,
    contract: Address,
}

impl EvmAdapter {
    pub fn new(chain: Chain, provider: DynProvider<Ethereum>, contract: Address) -> Self {
        Self {
            chain,
            provider,
            contract,
        }
    }

    pub fn connect(chain: Chain, rpc_url: Url, contract: Address) -> Self {
        let provider = ProviderBuilder::new().connect_http(rpc_url).erased();
        Self::new(chain, provider, contract)
    }
}

#[async_trait]
impl ChainAdapter for EvmAdapter {
    type Transaction = TransactionReceipt;

    fn chain(&self) -> Chain {
        self.chain
    }

    fn parse_reference(&self, raw: &str) -> Result<TxReference, RecheckError> {
        let hash =
            parse_tx_hash(raw).ok_or_else(|| RecheckError::InvalidReference(raw.to_string()))?;
        Ok(TxReference {
            chain: self.chain,
            raw: raw.to_string(),
            bytes: Bytes::copy_from_slice(hash.as_slice()),
        })
    }

    async fn fetch(&self, reference: &TxReference) -> Result<TransactionReceipt, FetchError> {
        let hash = B256::try_from(reference.bytes.as_ref())
            .map_err(|_| FetchError::NotFound(reference.raw.clone()))?;

        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|err| FetchError::Unavailable(err.to_string()))?
            .ok_or_else(|| FetchError::NotFound(reference.raw.clone()))?;

        tracing::debug!(
            chain = %self.chain,
            reference = %reference,
            logs = receipt.inner.logs().len(),
            "fetched transaction receipt"
        );
        Ok(receipt)
    }

    fn decode(
        &self,
        reference: &TxReference,
        receipt: &TransactionReceipt,
    ) -> Result<Vec<BridgeMessage>, DecodeError> {
        decoder::decode_receipt(self.chain, self.contract, reference, receipt)
    }
}
