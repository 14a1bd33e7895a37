use crate::{
    chains::{ChainRegistry, DynChainAdapter},
    error::{ErrorKind, RecheckError, Stage},
    forwarder::ObservationForwarder,
    settings::RecheckSettings,
    store::SignedMessageStore,
    types::{Chain, MessageKey, TxReference},
};
use alloy::primitives::Bytes;
use std::{collections::HashSet, sync::Arc};
use tokio::time::{Instant, timeout_at};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecheckRequest {
    /// Chain token, e.g. `ethereum`.
    pub chain: String,
    pub references: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchedReference {
    pub reference: String,
    pub messages: Vec<MessageKey>,
    /// Number of observation requests sent for this reference.
    pub forwarded: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecheckReport {
    pub chain: Chain,
    pub dispatched: Vec<DispatchedReference>,
}

pub struct RecheckOrchestrator {
    registry: ChainRegistry,
    store: Arc<dyn SignedMessageStore>,
    forwarder: Arc<dyn ObservationForwarder>,
    settings: RecheckSettings,
}

impl RecheckOrchestrator {
    pub fn new(
        registry: ChainRegistry,
        store: Arc<dyn SignedMessageStore>,
        forwarder: Arc<dyn ObservationForwarder>,
        settings: RecheckSettings,
    ) -> Self {
        Self {
            registry,
            store,
            forwarder,
            settings,
        }
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    /// Validates the whole batch, then processes references in order and
    /// stops at the first failure. References processed before a failure
    /// keep their side effects. Repeated references are processed once and
    /// each observation reference is forwarded at most once per batch.
    pub async fn recheck(&self, request: RecheckRequest) -> Result<RecheckReport, RecheckError> {
        let deadline = Instant::now() + self.settings.request_timeout;

        let adapter = self.registry.resolve(&request.chain)?;
        if request.references.is_empty() {
            return Err(RecheckError::EmptyBatch);
        }
        let references = request
            .references
            .iter()
            .map(|raw| adapter.parse_reference(raw))
            .collect::<Result<Vec<_>, _>>()?;
        let references = unique_references(references);

        let chain = adapter.chain();
        let mut forwarded = HashSet::new();
        let mut dispatched = Vec::with_capacity(references.len());
        for reference in &references {
            match self
                .process(adapter.as_ref(), reference, deadline, &mut forwarded)
                .await
            {
                Ok(result) => dispatched.push(result),
                Err(err) => {
                    if err.kind() == ErrorKind::Upstream {
                        tracing::error!(chain = %chain, reference = %reference, error = %err, "recheck failed");
                    } else {
                        tracing::warn!(chain = %chain, reference = %reference, error = %err, "recheck rejected");
                    }
                    return Err(err);
                }
            }
        }

        tracing::info!(
            chain = %chain,
            references = dispatched.len(),
            "recheck dispatched"
        );
        Ok(RecheckReport { chain, dispatched })
    }

    async fn process(
        &self,
        adapter: &dyn DynChainAdapter,
        reference: &TxReference,
        deadline: Instant,
        forwarded: &mut HashSet<Bytes>,
    ) -> Result<DispatchedReference, RecheckError> {
        let fetch_deadline = deadline.min(Instant::now() + self.settings.fetch_timeout);
        let messages = timeout_at(deadline, adapter.messages(reference, fetch_deadline))
            .await
            .map_err(|_| RecheckError::DeadlineExceeded(Stage::Fetch))??;
        if messages.is_empty() {
            return Err(RecheckError::NoMessage(reference.raw.clone()));
        }

        // Every message is checked before anything is forwarded.
        let mut keys = Vec::with_capacity(messages.len());
        for message in &messages {
            let key = message.key();
            let signed = timeout_at(deadline, self.store.exists(&key))
                .await
                .map_err(|_| RecheckError::DeadlineExceeded(Stage::StoreCheck))??;
            if signed {
                tracing::debug!(
                    chain = %reference.chain,
                    reference = %reference,
                    emitter_chain = key.emitter_chain,
                    emitter_address = %hex::encode(key.emitter_address),
                    sequence = key.sequence,
                    "message already signed"
                );
                return Err(RecheckError::AlreadyFinalized {
                    key,
                    reference: reference.raw.clone(),
                });
            }
            keys.push(key);
        }

        let mut sent = 0;
        for message in &messages {
            if forwarded.contains(&message.observation_reference) {
                continue;
            }
            timeout_at(
                deadline,
                self.forwarder
                    .forward(reference.chain, &message.observation_reference),
            )
            .await
            .map_err(|_| RecheckError::DeadlineExceeded(Stage::Forward))??;
            forwarded.insert(message.observation_reference.clone());
            sent += 1;
            tracing::info!(
                chain = %reference.chain,
                reference = %reference,
                emitter_chain = message.emitter_chain,
                emitter_address = %hex::encode(message.emitter_address),
                sequence = message.sequence,
                "observation request sent"
            );
        }

        Ok(DispatchedReference {
            reference: reference.raw.clone(),
            messages: keys,
            forwarded: sent,
        })
    }
}

/// Drops repeated references, keeping the first occurrence. References are
/// compared by their decoded bytes so spelling variants collapse too.
fn unique_references(references: Vec<TxReference>) -> Vec<TxReference> {
    let mut seen = HashSet::new();
    references
        .into_iter()
        .filter(|reference| seen.insert(reference.bytes.clone()))
        .collect()
}
