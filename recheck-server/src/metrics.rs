use actix_web::{App, HttpServer, dev::Server};
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use prometheus::Registry;
use std::net::SocketAddr;

#[derive(Clone)]
pub struct Metrics {
    metrics_middleware: PrometheusMetrics,
    http_middleware: PrometheusMetrics,
}

impl Metrics {
    pub fn new(service_name: &str, endpoint: &str) -> Result<Self, anyhow::Error> {
        let registry = Registry::new();
        let metrics_middleware = PrometheusMetricsBuilder::new(&format!("{service_name}_metrics"))
            .registry(registry.clone())
            .endpoint(endpoint)
            .build()
            .map_err(|e| anyhow::Error::msg(e.to_string()))?;
        // note: http middleware has no endpoint, it only records
        let http_middleware = PrometheusMetricsBuilder::new(service_name)
            .registry(registry)
            .build()
            .map_err(|e| anyhow::Error::msg(e.to_string()))?;

        Ok(Self {
            metrics_middleware,
            http_middleware,
        })
    }

    pub fn http_middleware(&self) -> &PrometheusMetrics {
        &self.http_middleware
    }

    pub fn run_server(&self, addr: SocketAddr) -> Result<Server, anyhow::Error> {
        let metrics_middleware = self.metrics_middleware.clone();
        let server = HttpServer::new(move || App::new().wrap(metrics_middleware.clone()))
            .disable_signals()
            .workers(1)
            .bind(addr)?
            .run();
        Ok(server)
    }
}
