use crate::types::{ChainFamily, MessageKey};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transaction not found: {0}")]
    NotFound(String),
    #[error("rpc unavailable: {0}")]
    Unavailable(String),
    #[error("rpc request timed out")]
    Timeout,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("transaction {0} did not execute successfully")]
    FailedTransaction(String),
    #[error("malformed bridge log at index {index}: {reason}")]
    MalformedLog { index: usize, reason: String },
    #[error("malformed post-message instruction: {0}")]
    MalformedInstruction(String),
    #[error("malformed message account {account}: {reason}")]
    MalformedAccount { account: String, reason: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("message key is not representable in the store: {0}")]
    InvalidKey(MessageKey),
}

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error(transparent)]
    Rpc(#[from] tonic::Status),
    #[error("privileged peer unavailable: {0}")]
    Unavailable(String),
}

/// Step of the per-reference pipeline during which the request deadline fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum Stage {
    #[strum(to_string = "fetching the transaction")]
    Fetch,
    #[strum(to_string = "checking the signed message store")]
    StoreCheck,
    #[strum(to_string = "forwarding the observation request")]
    Forward,
}

#[derive(Debug, Error)]
pub enum RecheckError {
    #[error("Invalid chain ID: {0}")]
    UnsupportedChain(String),
    #[error("No transaction hashes provided")]
    EmptyBatch,
    #[error("Invalid transaction hash: {0}")]
    InvalidReference(String),
    #[error("Failed to fetch transaction {reference}: {source}")]
    Fetch {
        reference: String,
        source: FetchError,
    },
    #[error("Failed to decode {family} transaction {reference}: {source}")]
    Decode {
        family: ChainFamily,
        reference: String,
        source: DecodeError,
    },
    #[error("No bridge message found in transaction {0}")]
    NoMessage(String),
    #[error("Signed message already exists: {key} txHash={reference}")]
    AlreadyFinalized { key: MessageKey, reference: String },
    #[error("Failed to fetch signed message: {0}")]
    Store(#[from] StoreError),
    #[error("Failed to send observation request: {0}")]
    Forward(#[from] ForwardError),
    #[error("Request deadline exceeded while {0}")]
    DeadlineExceeded(Stage),
}

/// Coarse classification callers use to pick a response status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request is wrong or the transaction cannot yield an observation.
    InvalidRequest,
    /// Every message in the transaction is already signed.
    AlreadyFinalized,
    /// The chain has no transaction with this reference.
    NotFound,
    /// A dependency failed or the request ran out of time.
    Upstream,
}

impl RecheckError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RecheckError::UnsupportedChain(_)
            | RecheckError::EmptyBatch
            | RecheckError::InvalidReference(_)
            | RecheckError::Decode { .. }
            | RecheckError::NoMessage(_) => ErrorKind::InvalidRequest,
            RecheckError::AlreadyFinalized { .. } => ErrorKind::AlreadyFinalized,
            RecheckError::Fetch {
                source: FetchError::NotFound(_),
                ..
            } => ErrorKind::NotFound,
            RecheckError::Fetch { .. }
            | RecheckError::Store(_)
            | RecheckError::Forward(_)
            | RecheckError::DeadlineExceeded(_) => ErrorKind::Upstream,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::B256;
    use rstest::rstest;

    fn finalized() -> RecheckError {
        RecheckError::AlreadyFinalized {
            key: MessageKey {
                emitter_chain: 2,
                emitter_address: B256::ZERO,
                sequence: 7,
            },
            reference: "0xabc".to_string(),
        }
    }

    #[rstest]
    #[case(RecheckError::UnsupportedChain("foo".into()), ErrorKind::InvalidRequest)]
    #[case(RecheckError::EmptyBatch, ErrorKind::InvalidRequest)]
    #[case(RecheckError::InvalidReference("abc".into()), ErrorKind::InvalidRequest)]
    #[case(RecheckError::NoMessage("0x1".into()), ErrorKind::InvalidRequest)]
    #[case(
        RecheckError::Decode {
            family: ChainFamily::Evm,
            reference: "0x1".into(),
            source: DecodeError::FailedTransaction("0x1".into()),
        },
        ErrorKind::InvalidRequest
    )]
    #[case(finalized(), ErrorKind::AlreadyFinalized)]
    #[case(
        RecheckError::Fetch { reference: "0x1".into(), source: FetchError::NotFound("0x1".into()) },
        ErrorKind::NotFound
    )]
    #[case(
        RecheckError::Fetch { reference: "0x1".into(), source: FetchError::Timeout },
        ErrorKind::Upstream
    )]
    #[case(
        RecheckError::Store(StoreError::Unavailable("down".into())),
        ErrorKind::Upstream
    )]
    #[case(
        RecheckError::Forward(ForwardError::Unavailable("down".into())),
        ErrorKind::Upstream
    )]
    #[case(RecheckError::DeadlineExceeded(Stage::Forward), ErrorKind::Upstream)]
    fn errors_are_classified(#[case] error: RecheckError, #[case] expected: ErrorKind) {
        assert_eq!(error.kind(), expected);
    }

    #[test]
    fn messages_name_the_offending_input() {
        assert_eq!(
            RecheckError::UnsupportedChain("foo".into()).to_string(),
            "Invalid chain ID: foo"
        );
        assert_eq!(
            RecheckError::InvalidReference("0xzz".into()).to_string(),
            "Invalid transaction hash: 0xzz"
        );
        assert_eq!(
            finalized().to_string(),
            format!(
                "Signed message already exists: emitterChain=2 emitterAddress={} sequence=7 txHash=0xabc",
                "00".repeat(32)
            )
        );
    }
}
