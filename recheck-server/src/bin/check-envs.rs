use env_collector::{EnvCollectorSettingsBuilder, PrefixFilter, run_env_collector_cli};
use recheck_server::Settings;

fn main() {
    let vars_filter = PrefixFilter::blacklist(&[
        "RECHECK__SERVER",
        "RECHECK__JAEGER",
        "RECHECK__METRICS",
        "RECHECK__TRACING",
    ]);

    let settings = EnvCollectorSettingsBuilder::default()
        .service_name("RECHECK".to_string())
        .markdown_path("README.md".to_string())
        .config_path("recheck-server/config/example.toml".to_string())
        .vars_filter(vars_filter)
        .anchor_postfix(None)
        .build()
        .expect("invalid settings");

    run_env_collector_cli::<Settings>(settings);
}
