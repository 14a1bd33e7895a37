use crate::{metrics::Metrics, services, settings::Settings};
use actix_web::{
    App, HttpServer,
    dev::ServerHandle,
    middleware::Condition,
    web::{self, ServiceConfig},
};
use anyhow::Context;
use blockscout_service_launcher::{
    launcher::{HttpRouter, HttpServerSettings, MetricsSettings},
    tracing,
};
use recheck_logic::{
    AdminRpcForwarder, ChainRegistry, PostgresSignedMessageStore, RecheckOrchestrator,
};
use std::{sync::Arc, time::Duration};
use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;

const SERVICE_NAME: &str = "recheck";

/// Extra time after the grace period before in-flight requests are dropped.
const FORCED_SHUTDOWN_MARGIN: Duration = Duration::from_secs(1);

#[derive(Clone)]
pub struct Router {
    orchestrator: Arc<RecheckOrchestrator>,
    max_body_size: usize,
}

impl Router {
    pub fn new(orchestrator: Arc<RecheckOrchestrator>, max_body_size: usize) -> Self {
        Self {
            orchestrator,
            max_body_size,
        }
    }
}

impl HttpRouter for Router {
    fn register_routes(&self, service_config: &mut web::ServiceConfig) {
        service_config
            .app_data(web::Data::from(self.orchestrator.clone()))
            .app_data(services::json_config(self.max_body_size))
            .route("/health", web::get().to(services::health));
        for path in ["/recheck", "/v1/recheck"] {
            service_config.service(
                web::resource(path)
                    .route(web::post().to(services::recheck))
                    .default_service(web::route().to(services::method_not_allowed)),
            );
        }
    }
}

/// Mounts `router` at the root or under `base_path`.
pub fn configure_router(
    router: &impl HttpRouter,
    base_path: Option<String>,
) -> impl FnOnce(&mut ServiceConfig) + '_ {
    |service_config| match base_path {
        Some(base_path) => {
            service_config.service(
                web::scope(&base_path).configure(|inner| router.register_routes(inner)),
            );
        }
        None => router.register_routes(service_config),
    }
}

pub async fn run(settings: Settings) -> Result<(), anyhow::Error> {
    tracing::init_logs(SERVICE_NAME, &settings.tracing, &settings.jaeger)?;

    let registry = ChainRegistry::from_settings(&settings.chains)?;
    let store = PostgresSignedMessageStore::connect(&settings.signed_messages_db)
        .await
        .context("failed to connect to signed messages database")?;
    let forwarder = AdminRpcForwarder::connect(&settings.admin_rpc).await?;
    let orchestrator = Arc::new(RecheckOrchestrator::new(
        registry,
        Arc::new(store),
        Arc::new(forwarder),
        settings.recheck.clone(),
    ));
    ::tracing::info!(
        chains = ?orchestrator.registry().chains().collect::<Vec<_>>(),
        "recheck service configured"
    );
    let router = Router::new(orchestrator, settings.server.http.max_body_size);

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            wait_for_signal().await;
            shutdown.cancel();
        }
    });

    serve(
        router,
        &settings.server.http,
        &settings.metrics,
        settings.shutdown.grace_period,
        shutdown,
    )
    .await
}

/// Runs the http server, and the metrics server when enabled, until one of
/// them fails or `shutdown` is cancelled. On shutdown the listener stops
/// accepting immediately, in-flight requests get `grace_period` to finish
/// and are dropped afterwards.
pub async fn serve<R>(
    router: R,
    http: &HttpServerSettings,
    metrics: &MetricsSettings,
    grace_period: Duration,
    shutdown: CancellationToken,
) -> Result<(), anyhow::Error>
where
    R: HttpRouter + Send + Sync + Clone + 'static,
{
    let metrics_layer = Metrics::new(SERVICE_NAME, &metrics.route)?;
    let (metrics_handle, metrics_task) = if metrics.enabled {
        ::tracing::info!("starting metrics server on addr {}", metrics.addr);
        let server = metrics_layer
            .run_server(metrics.addr)
            .with_context(|| format!("failed to bind metrics server to {}", metrics.addr))?;
        (Some(server.handle()), Some(tokio::spawn(server)))
    } else {
        (None, None)
    };

    ::tracing::info!("starting http server on addr {}", http.addr);
    let metrics_enabled = metrics.enabled;
    let http_metrics = metrics_layer.http_middleware().clone();
    let cors_settings = http.cors.clone();
    let cors_enabled = cors_settings.enabled;
    let base_path = http.base_path.clone().map(String::from);
    let server = HttpServer::new(move || {
        let cors = cors_settings.clone().build();
        App::new()
            .wrap(Condition::new(metrics_enabled, http_metrics.clone()))
            .wrap(Condition::new(cors_enabled, cors))
            .configure(configure_router(&router, base_path.clone()))
    })
    .disable_signals()
    .shutdown_timeout(grace_period.as_secs_f64().ceil() as u64)
    .bind(http.addr)
    .with_context(|| format!("failed to bind http server to {}", http.addr))?
    .run();

    let handle = server.handle();
    let mut server_task = tokio::spawn(server);
    let metrics_finished = async move {
        match metrics_task {
            Some(task) => task.await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        result = &mut server_task => {
            stop_metrics(metrics_handle).await;
            return result
                .context("http server task panicked")?
                .context("http server failed");
        }
        result = metrics_finished => {
            handle.stop(false).await;
            return result
                .context("metrics server task panicked")?
                .context("metrics server failed");
        }
        _ = shutdown.cancelled() => {}
    }

    ::tracing::info!(?grace_period, "shutting down http server");
    stop_metrics(metrics_handle).await;
    match tokio::time::timeout(grace_period + FORCED_SHUTDOWN_MARGIN, handle.stop(true)).await {
        Ok(()) => ::tracing::info!("http server stopped"),
        Err(_) => {
            ::tracing::warn!("grace period elapsed, dropping in-flight requests");
            server_task.abort();
        }
    }
    Ok(())
}

async fn stop_metrics(handle: Option<ServerHandle>) {
    if let Some(handle) = handle {
        handle.stop(false).await;
    }
}

async fn wait_for_signal() {
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(terminate) => terminate,
        Err(err) => {
            ::tracing::error!(error = %err, "failed to install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
    ::tracing::info!("received shutdown signal");
}
