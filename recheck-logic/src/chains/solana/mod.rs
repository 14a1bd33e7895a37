pub mod decoder;
mod types;

pub use types::{
    EncodedTransaction, FetchedTransaction, GetAccountInfoConfig, GetTransactionConfig,
    MessageAccount, Pubkey, RpcResponse, UiAccount, parse_signature,
};

use super::ChainAdapter;
use crate::{
    error::{DecodeError, FetchError, RecheckError},
    types::{BridgeMessage, Chain, TxReference},
};
use alloy::{primitives::Bytes, rpc::client::RpcClient};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use url::Url;

pub struct SolanaAdapter {
    chain: Chain,
    client: RpcClient,
    program: Pubkey,
}

impl SolanaAdapter {
    pub fn connect(chain: Chain, rpc_url: Url, program: Pubkey) -> Self {
        Self {
            chain,
            client: RpcClient::new_http(rpc_url),
            program,
        }
    }

    async fn fetch_transaction(
        &self,
        reference: &TxReference,
    ) -> Result<EncodedTransaction, FetchError> {
        let transaction: Option<EncodedTransaction> = self
            .client
            .request(
                "getTransaction",
                (reference.raw.clone(), GetTransactionConfig::default()),
            )
            .await
            .map_err(|err| FetchError::Unavailable(err.to_string()))?;
        transaction.ok_or_else(|| FetchError::NotFound(reference.raw.clone()))
    }

    async fn fetch_message_account(&self, address: Pubkey) -> Result<MessageAccount, FetchError> {
        let response: RpcResponse<Option<UiAccount>> = self
            .client
            .request(
                "getAccountInfo",
                (address.to_string(), GetAccountInfoConfig::default()),
            )
            .await
            .map_err(|err| FetchError::Unavailable(err.to_string()))?;
        let account = response
            .value
            .ok_or_else(|| FetchError::NotFound(address.to_string()))?;

        let (encoded, encoding) = &account.data;
        if encoding != "base64" {
            return Err(FetchError::Unavailable(format!(
                "unexpected account data encoding {encoding}"
            )));
        }
        let data = STANDARD
            .decode(encoded)
            .map_err(|err| FetchError::Unavailable(format!("invalid account data: {err}")))?;

        Ok(MessageAccount {
            address,
            owner: account.owner,
            data,
        })
    }
}

#[async_trait]
impl ChainAdapter for SolanaAdapter {
    type Transaction = FetchedTransaction;

    fn chain(&self) -> Chain {
        self.chain
    }

    fn parse_reference(&self, raw: &str) -> Result<TxReference, RecheckError> {
        let signature =
            parse_signature(raw).ok_or_else(|| RecheckError::InvalidReference(raw.to_string()))?;
        Ok(TxReference {
            chain: self.chain,
            raw: raw.to_string(),
            bytes: Bytes::copy_from_slice(&signature),
        })
    }

    async fn fetch(&self, reference: &TxReference) -> Result<FetchedTransaction, FetchError> {
        let transaction = self.fetch_transaction(reference).await?;

        // Locator errors are reported by `decode`; a failed transaction has no account worth reading.
        let succeeded = transaction.meta.as_ref().is_some_and(|meta| meta.err.is_none());
        let message_account = match decoder::find_message_account(&transaction, &self.program) {
            Ok(Some(address)) if succeeded => Some(self.fetch_message_account(address).await?),
            _ => None,
        };

        tracing::debug!(
            chain = %self.chain,
            reference = %reference,
            slot = transaction.slot,
            message_account = ?message_account.as_ref().map(|account| account.address),
            "fetched solana transaction"
        );
        Ok(FetchedTransaction {
            transaction,
            message_account,
        })
    }

    fn decode(
        &self,
        reference: &TxReference,
        fetched: &FetchedTransaction,
    ) -> Result<Vec<BridgeMessage>, DecodeError> {
        match &fetched.transaction.meta {
            Some(meta) if meta.err.is_none() => {}
            _ => return Err(DecodeError::FailedTransaction(reference.raw.clone())),
        }

        let Some(address) = decoder::find_message_account(&fetched.transaction, &self.program)?
        else {
            return Ok(Vec::new());
        };
        let account = fetched
            .message_account
            .as_ref()
            .filter(|account| account.address == address)
            .ok_or_else(|| DecodeError::MalformedAccount {
                account: address.to_string(),
                reason: "message account was not fetched".to_string(),
            })?;

        decoder::parse_posted_message(account, &self.program, reference).map(|message| vec![message])
    }
}
