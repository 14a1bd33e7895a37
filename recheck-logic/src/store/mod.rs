pub mod signed_messages;

use crate::{error::StoreError, settings::SignedMessagesDbSettings, types::MessageKey};
use async_trait::async_trait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, EntityTrait};

/// Read-only view of the messages the guardian has already signed.
#[async_trait]
pub trait SignedMessageStore: Send + Sync {
    async fn exists(&self, key: &MessageKey) -> Result<bool, StoreError>;
}

pub struct PostgresSignedMessageStore {
    db: DatabaseConnection,
}

impl PostgresSignedMessageStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn connect(settings: &SignedMessagesDbSettings) -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new(settings.url.clone());
        options
            .connect_timeout(settings.connect_timeout)
            .max_connections(settings.max_connections)
            .sqlx_logging(false);
        let db = Database::connect(options).await?;
        Ok(Self::new(db))
    }
}

#[async_trait]
impl SignedMessageStore for PostgresSignedMessageStore {
    async fn exists(&self, key: &MessageKey) -> Result<bool, StoreError> {
        let sequence = i64::try_from(key.sequence).map_err(|_| StoreError::InvalidKey(*key))?;
        let signed = signed_messages::Entity::find_by_id((
            i32::from(key.emitter_chain),
            key.emitter_address.to_vec(),
            sequence,
        ))
        .one(&self.db)
        .await?;

        tracing::debug!(
            emitter_chain = key.emitter_chain,
            emitter_address = %hex::encode(key.emitter_address),
            sequence = key.sequence,
            found = signed.is_some(),
            "looked up signed message"
        );
        Ok(signed.is_some())
    }
}
