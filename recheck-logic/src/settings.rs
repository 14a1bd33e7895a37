use crate::{
    chains::solana::Pubkey,
    types::{Chain, ChainFamily},
};
use alloy::primitives::Address;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::{collections::BTreeMap, path::PathBuf, str::FromStr, time::Duration};
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ChainSettings {
    pub rpc_url: Url,
    /// Bridge core contract on EVM chains, bridge program id on Solana.
    pub contract_address: String,
}

impl ChainSettings {
    pub fn evm_contract(&self) -> anyhow::Result<Address> {
        Address::from_str(&self.contract_address)
            .with_context(|| format!("invalid evm contract address {}", self.contract_address))
    }

    pub fn solana_program(&self) -> anyhow::Result<Pubkey> {
        Pubkey::from_str(&self.contract_address)
            .with_context(|| format!("invalid solana program id {}", self.contract_address))
    }
}

/// Chain table keyed by chain token. A chain is supported only if it is listed here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ChainsSettings(pub BTreeMap<Chain, ChainSettings>);

impl ChainsSettings {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.0.is_empty() {
            anyhow::bail!("at least one chain must be configured");
        }
        for (chain, settings) in &self.0 {
            match chain.family() {
                ChainFamily::Evm => settings.evm_contract().map(|_| ()),
                ChainFamily::Solana => settings.solana_program().map(|_| ()),
            }
            .with_context(|| format!("invalid settings for chain {chain}"))?;
        }
        Ok(())
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RecheckSettings {
    /// Deadline covering the whole batch.
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub request_timeout: Duration,
    /// Upper bound on a single chain RPC fetch.
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub fetch_timeout: Duration,
}

impl Default for RecheckSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
            fetch_timeout: Duration::from_secs(5),
        }
    }
}

impl RecheckSettings {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.request_timeout.is_zero() {
            anyhow::bail!("recheck.request_timeout must be positive");
        }
        if self.fetch_timeout > self.request_timeout {
            anyhow::bail!("recheck.fetch_timeout must not exceed recheck.request_timeout");
        }
        Ok(())
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SignedMessagesDbSettings {
    pub url: String,
    #[serde(default = "default_db_connect_timeout")]
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub connect_timeout: Duration,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_max_connections() -> u32 {
    10
}

impl SignedMessagesDbSettings {
    pub fn new(url: String) -> Self {
        Self {
            url,
            connect_timeout: default_db_connect_timeout(),
            max_connections: default_max_connections(),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AdminRpcSettings {
    pub socket_path: PathBuf,
    #[serde(default = "default_admin_connect_timeout")]
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub connect_timeout: Duration,
}

fn default_admin_connect_timeout() -> Duration {
    Duration::from_secs(15)
}

impl AdminRpcSettings {
    pub fn new(socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            connect_timeout: default_admin_connect_timeout(),
        }
    }
}
