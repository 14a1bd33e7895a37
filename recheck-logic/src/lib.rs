pub mod chains;
mod error;
pub mod forwarder;
mod orchestrator;
pub mod settings;
pub mod store;
mod types;

#[cfg(any(feature = "test-utils", test))]
pub mod test_utils;

pub use chains::{ChainAdapter, ChainRegistry, DynChainAdapter};
pub use error::{DecodeError, ErrorKind, FetchError, ForwardError, RecheckError, Stage, StoreError};
pub use forwarder::{AdminRpcForwarder, ObservationForwarder};
pub use orchestrator::{DispatchedReference, RecheckOrchestrator, RecheckReport, RecheckRequest};
pub use settings::{
    AdminRpcSettings, ChainSettings, ChainsSettings, RecheckSettings, SignedMessagesDbSettings,
};
pub use store::{PostgresSignedMessageStore, SignedMessageStore};
pub use types::{BridgeMessage, Chain, ChainFamily, MessageKey, TxReference};
