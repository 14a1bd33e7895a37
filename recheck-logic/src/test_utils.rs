use crate::{
    chains::{
        ChainAdapter,
        evm::IBridgeCore::LogMessagePublished,
        solana::EncodedTransaction,
    },
    error::{DecodeError, FetchError, ForwardError, RecheckError, StoreError},
    forwarder::ObservationForwarder,
    store::SignedMessageStore,
    types::{BridgeMessage, Chain, MessageKey, TxReference},
};
use alloy::{
    primitives::{Address, B256, Bytes, LogData},
    rpc::types::Log,
    sol_types::SolEvent,
};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::{
    collections::{HashMap, HashSet},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use wiremock::{
    Mock, MockServer, Request, Respond, ResponseTemplate,
    matchers::{body_partial_json, method},
};

// ---------- evm fixtures ----------

pub fn evm_reference(chain: Chain, byte: u8) -> TxReference {
    TxReference {
        chain,
        raw: format!("0x{}", hex::encode([byte; 32])),
        bytes: Bytes::copy_from_slice(&[byte; 32]),
    }
}

pub fn bridge_log(contract: Address, sender: Address, sequence: u64, payload: &[u8]) -> Log {
    let event = LogMessagePublished {
        sender,
        sequence,
        nonce: 0,
        payload: Bytes::copy_from_slice(payload),
        consistencyLevel: 1,
    };
    let topics = vec![LogMessagePublished::SIGNATURE_HASH, sender.into_word()];

    Log {
        inner: alloy::primitives::Log {
            address: contract,
            data: LogData::new_unchecked(topics, event.encode_data().into()),
        },
        block_hash: Some(B256::repeat_byte(0xbb)),
        block_number: Some(16),
        block_timestamp: None,
        transaction_hash: Some(B256::repeat_byte(0xaa)),
        transaction_index: Some(0),
        log_index: Some(0),
        removed: false,
    }
}

pub fn evm_receipt_json(hash: &str, success: bool, logs: &[Log]) -> Value {
    json!({
        "transactionHash": hash,
        "transactionIndex": "0x0",
        "blockHash": B256::repeat_byte(0xbb),
        "blockNumber": "0x10",
        "from": Address::repeat_byte(0x01),
        "to": Address::repeat_byte(0x25),
        "cumulativeGasUsed": "0x5208",
        "gasUsed": "0x5208",
        "effectiveGasPrice": "0x3b9aca00",
        "contractAddress": null,
        "logs": logs,
        "logsBloom": format!("0x{}", "00".repeat(256)),
        "type": "0x2",
        "status": if success { "0x1" } else { "0x0" },
    })
}

// ---------- solana fixtures ----------

pub fn solana_signature(byte: u8) -> String {
    bs58::encode([byte; 64]).into_string()
}

pub fn solana_reference(byte: u8) -> TxReference {
    TxReference {
        chain: Chain::Solana,
        raw: solana_signature(byte),
        bytes: Bytes::copy_from_slice(&[byte; 64]),
    }
}

/// `getTransaction` result wrapping the given `message` object.
pub fn solana_transaction_json(message: Value) -> Value {
    json!({
        "slot": 100,
        "blockTime": 1_700_000_000,
        "transaction": {
            "signatures": [solana_signature(0x42)],
            "message": message,
        },
        "meta": {
            "err": null,
            "fee": 5000,
            "innerInstructions": [],
            "loadedAddresses": { "writable": [], "readonly": [] },
        },
    })
}

pub fn solana_transaction(message: Value) -> EncodedTransaction {
    serde_json::from_value(solana_transaction_json(message)).unwrap()
}

pub struct PostedMessageFixture {
    pub consistency_level: u8,
    pub nonce: u32,
    pub sequence: u64,
    pub emitter_chain: u16,
    pub emitter_address: [u8; 32],
    pub payload: Vec<u8>,
}

impl Default for PostedMessageFixture {
    fn default() -> Self {
        Self {
            consistency_level: 32,
            nonce: 0,
            sequence: 1,
            emitter_chain: 1,
            emitter_address: [0xee; 32],
            payload: b"payload".to_vec(),
        }
    }
}

impl PostedMessageFixture {
    pub fn encode(&self) -> Vec<u8> {
        let mut data = b"msg".to_vec();
        data.push(0);
        data.push(self.consistency_level);
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&[0u8; 32]);
        data.extend_from_slice(&1_700_000_000u32.to_le_bytes());
        data.extend_from_slice(&self.nonce.to_le_bytes());
        data.extend_from_slice(&self.sequence.to_le_bytes());
        data.extend_from_slice(&self.emitter_chain.to_le_bytes());
        data.extend_from_slice(&self.emitter_address);
        data.extend_from_slice(&(self.payload.len() as u32).to_le_bytes());
        data.extend_from_slice(&self.payload);
        data
    }
}

// ---------- json-rpc mocks ----------

struct JsonRpcResponder {
    body: Value,
}

impl Respond for JsonRpcResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let id = serde_json::from_slice::<Value>(&request.body)
            .ok()
            .and_then(|body| body.get("id").cloned())
            .unwrap_or(Value::Null);
        let mut body = self.body.clone();
        body["jsonrpc"] = json!("2.0");
        body["id"] = id;
        ResponseTemplate::new(200).set_body_json(body)
    }
}

pub async fn mock_rpc_method(server: &MockServer, rpc_method: &str, result: Value) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": rpc_method })))
        .respond_with(JsonRpcResponder {
            body: json!({ "result": result }),
        })
        .mount(server)
        .await;
}

pub async fn mock_rpc_error(server: &MockServer, rpc_method: &str) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": rpc_method })))
        .respond_with(JsonRpcResponder {
            body: json!({ "error": { "code": -32000, "message": "node is syncing" } }),
        })
        .mount(server)
        .await;
}

// ---------- orchestrator doubles ----------

pub fn bridge_message(reference: &str, sequence: u64) -> BridgeMessage {
    BridgeMessage {
        emitter_chain: Chain::Ethereum.id(),
        emitter_address: B256::repeat_byte(0x11),
        sequence,
        nonce: 0,
        consistency_level: 1,
        payload: Bytes::from_static(b"payload"),
        tx_reference: reference.to_string(),
        observation_reference: Bytes::copy_from_slice(reference.as_bytes()),
    }
}

/// Adapter serving canned messages. References must start with `0x`;
/// unknown references are not found.
pub struct MockAdapter {
    chain: Chain,
    transactions: HashMap<String, Vec<BridgeMessage>>,
    failed: HashSet<String>,
    unavailable: bool,
    delay: Option<Duration>,
    fetch_calls: AtomicUsize,
}

impl MockAdapter {
    pub fn new(chain: Chain) -> Self {
        Self {
            chain,
            transactions: HashMap::new(),
            failed: HashSet::new(),
            unavailable: false,
            delay: None,
            fetch_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_transaction(mut self, reference: &str, messages: Vec<BridgeMessage>) -> Self {
        self.transactions.insert(reference.to_string(), messages);
        self
    }

    pub fn with_failed_transaction(mut self, reference: &str) -> Self {
        self.transactions.insert(reference.to_string(), Vec::new());
        self.failed.insert(reference.to_string());
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainAdapter for MockAdapter {
    type Transaction = (String, Vec<BridgeMessage>);

    fn chain(&self) -> Chain {
        self.chain
    }

    fn parse_reference(&self, raw: &str) -> Result<TxReference, RecheckError> {
        if raw.len() <= 2 || !raw.starts_with("0x") {
            return Err(RecheckError::InvalidReference(raw.to_string()));
        }
        Ok(TxReference {
            chain: self.chain,
            raw: raw.to_string(),
            bytes: Bytes::copy_from_slice(raw.as_bytes()),
        })
    }

    async fn fetch(&self, reference: &TxReference) -> Result<Self::Transaction, FetchError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.unavailable {
            return Err(FetchError::Unavailable("connection refused".to_string()));
        }
        self.transactions
            .get(&reference.raw)
            .map(|messages| (reference.raw.clone(), messages.clone()))
            .ok_or_else(|| FetchError::NotFound(reference.raw.clone()))
    }

    fn decode(
        &self,
        _reference: &TxReference,
        (raw, messages): &Self::Transaction,
    ) -> Result<Vec<BridgeMessage>, DecodeError> {
        if self.failed.contains(raw) {
            return Err(DecodeError::FailedTransaction(raw.clone()));
        }
        Ok(messages.clone())
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    keys: Mutex<HashSet<MessageKey>>,
    failure: Option<String>,
    lookups: AtomicUsize,
}

impl InMemoryStore {
    pub fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Default::default()
        }
    }

    pub fn insert(&self, key: MessageKey) {
        self.keys.lock().unwrap().insert(key);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignedMessageStore for InMemoryStore {
    async fn exists(&self, key: &MessageKey) -> Result<bool, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.failure {
            return Err(StoreError::Unavailable(reason.clone()));
        }
        Ok(self.keys.lock().unwrap().contains(key))
    }
}

#[derive(Default)]
pub struct RecordingForwarder {
    forwarded: Mutex<Vec<(Chain, Bytes)>>,
    failure: Option<String>,
    delay: Option<Duration>,
}

impl RecordingForwarder {
    pub fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Default::default()
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn forwarded(&self) -> Vec<(Chain, Bytes)> {
        self.forwarded.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObservationForwarder for RecordingForwarder {
    async fn forward(&self, chain: Chain, observation_reference: &[u8]) -> Result<(), ForwardError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(reason) = &self.failure {
            return Err(ForwardError::Unavailable(reason.clone()));
        }
        self.forwarded
            .lock()
            .unwrap()
            .push((chain, Bytes::copy_from_slice(observation_reference)));
        Ok(())
    }
}
