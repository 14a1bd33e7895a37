use blockscout_service_launcher::{
    launcher::{ConfigSettings, MetricsSettings, ServerSettings},
    tracing::{JaegerSettings, TracingSettings},
};
use recheck_logic::{
    AdminRpcSettings, ChainsSettings, RecheckSettings, SignedMessagesDbSettings,
};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::{path::PathBuf, time::Duration};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub metrics: MetricsSettings,
    #[serde(default)]
    pub tracing: TracingSettings,
    #[serde(default)]
    pub jaeger: JaegerSettings,
    #[serde(default)]
    pub shutdown: ShutdownSettings,
    #[serde(default)]
    pub recheck: RecheckSettings,
    pub chains: ChainsSettings,
    pub signed_messages_db: SignedMessagesDbSettings,
    pub admin_rpc: AdminRpcSettings,
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ShutdownSettings {
    /// How long in-flight requests may run after a stop signal.
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub grace_period: Duration,
}

impl Default for ShutdownSettings {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(10),
        }
    }
}

impl ConfigSettings for Settings {
    const SERVICE_NAME: &'static str = "RECHECK";

    fn validate(&self) -> anyhow::Result<()> {
        if !self.server.http.enabled {
            anyhow::bail!("http server is the only interface and cannot be disabled");
        }
        if self.server.grpc.enabled {
            anyhow::bail!("grpc server is not supported, disable server.grpc");
        }
        self.chains.validate()?;
        self.recheck.validate()?;
        Ok(())
    }
}

impl Settings {
    pub fn default(database_url: String, admin_socket: PathBuf, chains: ChainsSettings) -> Self {
        Self {
            server: Default::default(),
            metrics: Default::default(),
            tracing: Default::default(),
            jaeger: Default::default(),
            shutdown: Default::default(),
            recheck: Default::default(),
            chains,
            signed_messages_db: SignedMessagesDbSettings::new(database_url),
            admin_rpc: AdminRpcSettings::new(admin_socket),
        }
    }
}
