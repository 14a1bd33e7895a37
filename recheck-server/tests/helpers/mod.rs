use actix_web::{App, dev::ServiceResponse, test};
use recheck_logic::{
    Chain, ChainRegistry, RecheckOrchestrator, RecheckSettings,
    test_utils::{InMemoryStore, MockAdapter, RecordingForwarder, bridge_message},
};
use recheck_server::{Router, configure_router};
use std::sync::Arc;

/// Ethereum adapter serving one message per reference.
pub fn ethereum(references: &[&str]) -> MockAdapter {
    references
        .iter()
        .enumerate()
        .fold(MockAdapter::new(Chain::Ethereum), |adapter, (i, reference)| {
            adapter.with_transaction(reference, vec![bridge_message(reference, i as u64)])
        })
}

pub struct TestService {
    pub store: Arc<InMemoryStore>,
    pub forwarder: Arc<RecordingForwarder>,
    pub router: Router,
}

pub fn service(adapter: MockAdapter, store: InMemoryStore) -> TestService {
    service_with_settings(adapter, store, RecheckSettings::default())
}

pub fn service_with_settings(
    adapter: MockAdapter,
    store: InMemoryStore,
    settings: RecheckSettings,
) -> TestService {
    let store = Arc::new(store);
    let forwarder = Arc::new(RecordingForwarder::default());
    let orchestrator = RecheckOrchestrator::new(
        ChainRegistry::new().with_adapter(Arc::new(adapter)),
        store.clone(),
        forwarder.clone(),
        settings,
    );
    TestService {
        store,
        forwarder,
        router: Router::new(Arc::new(orchestrator), 2 * 1024 * 1024),
    }
}

pub async fn send(router: &Router, request: test::TestRequest) -> ServiceResponse {
    let app = test::init_service(App::new().configure(configure_router(router, None))).await;
    request.send_request(&app).await
}
