pub mod evm;
pub mod solana;

use crate::{
    error::{FetchError, RecheckError},
    settings::ChainsSettings,
    types::{BridgeMessage, Chain, ChainFamily, TxReference},
};
use async_trait::async_trait;
use std::{collections::BTreeMap, str::FromStr, sync::Arc};
use tokio::time::{Instant, timeout_at};

pub use evm::EvmAdapter;
pub use solana::SolanaAdapter;

/// Chain-family specific way of turning a transaction reference into
/// bridge messages. Fetching is the only step that talks to the network.
#[async_trait]
pub trait ChainAdapter: Send + Sync + 'static {
    type Transaction: Send + Sync;

    fn chain(&self) -> Chain;

    fn parse_reference(&self, raw: &str) -> Result<TxReference, RecheckError>;

    async fn fetch(&self, reference: &TxReference) -> Result<Self::Transaction, FetchError>;

    fn decode(
        &self,
        reference: &TxReference,
        transaction: &Self::Transaction,
    ) -> Result<Vec<BridgeMessage>, crate::error::DecodeError>;
}

/// Object-safe view over [`ChainAdapter`] so adapters of different
/// families can live in one registry.
#[async_trait]
pub trait DynChainAdapter: Send + Sync {
    fn chain(&self) -> Chain;

    fn parse_reference(&self, raw: &str) -> Result<TxReference, RecheckError>;

    /// Fetches the transaction, giving up at `fetch_deadline`, and decodes it.
    async fn messages(
        &self,
        reference: &TxReference,
        fetch_deadline: Instant,
    ) -> Result<Vec<BridgeMessage>, RecheckError>;
}

#[async_trait]
impl<A: ChainAdapter> DynChainAdapter for A {
    fn chain(&self) -> Chain {
        ChainAdapter::chain(self)
    }

    fn parse_reference(&self, raw: &str) -> Result<TxReference, RecheckError> {
        ChainAdapter::parse_reference(self, raw)
    }

    async fn messages(
        &self,
        reference: &TxReference,
        fetch_deadline: Instant,
    ) -> Result<Vec<BridgeMessage>, RecheckError> {
        let transaction = timeout_at(fetch_deadline, self.fetch(reference))
            .await
            .unwrap_or(Err(FetchError::Timeout))
            .map_err(|source| RecheckError::Fetch {
                reference: reference.raw.clone(),
                source,
            })?;

        self.decode(reference, &transaction)
            .map_err(|source| RecheckError::Decode {
                family: ChainAdapter::chain(self).family(),
                reference: reference.raw.clone(),
                source,
            })
    }
}

/// Adapters for every configured chain, built once at startup.
#[derive(Clone, Default)]
pub struct ChainRegistry {
    adapters: BTreeMap<Chain, Arc<dyn DynChainAdapter>>,
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_adapter(mut self, adapter: Arc<dyn DynChainAdapter>) -> Self {
        self.adapters.insert(adapter.chain(), adapter);
        self
    }

    pub fn from_settings(settings: &ChainsSettings) -> anyhow::Result<Self> {
        settings.0.iter().try_fold(Self::new(), |registry, (chain, chain_settings)| {
            let adapter: Arc<dyn DynChainAdapter> = match chain.family() {
                ChainFamily::Evm => Arc::new(EvmAdapter::connect(
                    *chain,
                    chain_settings.rpc_url.clone(),
                    chain_settings.evm_contract()?,
                )),
                ChainFamily::Solana => Arc::new(SolanaAdapter::connect(
                    *chain,
                    chain_settings.rpc_url.clone(),
                    chain_settings.solana_program()?,
                )),
            };
            tracing::info!(chain = %chain, rpc_url = %chain_settings.rpc_url, "registered chain adapter");
            Ok(registry.with_adapter(adapter))
        })
    }

    /// Resolves a request chain token. Tokens that are unknown, or known but
    /// not configured, are both unsupported.
    pub fn resolve(&self, token: &str) -> Result<&Arc<dyn DynChainAdapter>, RecheckError> {
        Chain::from_str(token)
            .ok()
            .and_then(|chain| self.adapters.get(&chain))
            .ok_or_else(|| RecheckError::UnsupportedChain(token.to_string()))
    }

    pub fn chains(&self) -> impl Iterator<Item = Chain> + '_ {
        self.adapters.keys().copied()
    }
}
