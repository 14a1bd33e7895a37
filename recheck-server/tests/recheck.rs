mod helpers;

use actix_web::{http::StatusCode, test};
use alloy::primitives::Bytes;
use helpers::{ethereum, send, service, service_with_settings};
use pretty_assertions::assert_eq;
use recheck_logic::{
    Chain, RecheckSettings,
    test_utils::{InMemoryStore, bridge_message},
};
use serde_json::{Value, json};
use std::time::Duration;

fn recheck(path: &str, body: Value) -> test::TestRequest {
    test::TestRequest::post().uri(path).set_json(body)
}

async fn body(response: actix_web::dev::ServiceResponse) -> Value {
    test::read_body_json(response).await
}

#[actix_web::test]
async fn accepted_request_forwards_observations() {
    let service = service(ethereum(&["0xa", "0xb"]), InMemoryStore::default());

    let response = send(
        &service.router,
        recheck("/recheck", json!({ "chainId": "ethereum", "txHashs": ["0xa", "0xb"] })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(body(response).await, json!({ "status": "observation request sent" }));
    assert_eq!(
        service.forwarder.forwarded(),
        vec![
            (Chain::Ethereum, Bytes::from_static(b"0xa")),
            (Chain::Ethereum, Bytes::from_static(b"0xb")),
        ]
    );
}

#[actix_web::test]
async fn repeated_reference_is_forwarded_once() {
    let service = service(ethereum(&["0xa"]), InMemoryStore::default());

    let response = send(
        &service.router,
        recheck("/recheck", json!({ "chainId": "ethereum", "txHashs": ["0xa", "0xa"] })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(
        service.forwarder.forwarded(),
        vec![(Chain::Ethereum, Bytes::from_static(b"0xa"))]
    );
}

#[actix_web::test]
async fn versioned_path_is_served() {
    let service = service(ethereum(&["0xa"]), InMemoryStore::default());

    let response = send(
        &service.router,
        recheck("/v1/recheck", json!({ "chainId": "ethereum", "txHashs": ["0xa"] })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[actix_web::test]
async fn validation_errors_are_bad_requests() {
    let service = service(ethereum(&["0xa"]), InMemoryStore::default());

    let cases = [
        (json!({ "chainId": "dogecoin", "txHashs": ["0xa"] }), "Invalid chain ID: dogecoin"),
        (json!({ "chainId": "solana", "txHashs": ["0xa"] }), "Invalid chain ID: solana"),
        (json!({ "chainId": "ethereum", "txHashs": [] }), "No transaction hashes provided"),
        (json!({ "chainId": "ethereum" }), "No transaction hashes provided"),
        (
            json!({ "chainId": "ethereum", "txHashs": ["0xa", "nope"] }),
            "Invalid transaction hash: nope",
        ),
    ];

    for (request, expected) in cases {
        let response = send(&service.router, recheck("/recheck", request)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body(response).await, json!({ "error": expected }));
    }
    assert!(service.forwarder.forwarded().is_empty());
}

#[actix_web::test]
async fn malformed_body_is_rejected() {
    let service = service(ethereum(&["0xa"]), InMemoryStore::default());

    for request in [
        test::TestRequest::post()
            .uri("/recheck")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json"),
        recheck("/recheck", json!({ "chainId": 2, "txHashs": ["0xa"] })),
    ] {
        let response = send(&service.router, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body(response).await, json!({ "error": "Invalid request body" }));
    }
}

#[actix_web::test]
async fn other_methods_are_not_allowed() {
    let service = service(ethereum(&["0xa"]), InMemoryStore::default());

    for request in [
        test::TestRequest::get().uri("/recheck"),
        test::TestRequest::put().uri("/v1/recheck"),
        test::TestRequest::delete().uri("/recheck"),
    ] {
        let response = send(&service.router, request).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body(response).await, json!({ "error": "Method not allowed" }));
    }
}

#[actix_web::test]
async fn signed_message_is_a_bad_request() {
    let service = service(ethereum(&["0xa"]), InMemoryStore::default());
    service.store.insert(bridge_message("0xa", 0).key());

    let response = send(
        &service.router,
        recheck("/recheck", json!({ "chainId": "ethereum", "txHashs": ["0xa"] })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = body(response).await["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("Signed message already exists: emitterChain=2"));
    assert!(error.ends_with("sequence=0 txHash=0xa"));
    assert!(service.forwarder.forwarded().is_empty());
}

#[actix_web::test]
async fn unknown_transaction_is_not_found() {
    let service = service(ethereum(&[]), InMemoryStore::default());

    let response = send(
        &service.router,
        recheck("/recheck", json!({ "chainId": "ethereum", "txHashs": ["0xa"] })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn transaction_without_messages_is_a_bad_request() {
    let service = service(
        ethereum(&[]).with_transaction("0xa", vec![]),
        InMemoryStore::default(),
    );

    let response = send(
        &service.router,
        recheck("/recheck", json!({ "chainId": "ethereum", "txHashs": ["0xa"] })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body(response).await,
        json!({ "error": "No bridge message found in transaction 0xa" })
    );
}

#[actix_web::test]
async fn dependency_failures_are_internal_errors() {
    let services = [
        service(ethereum(&["0xa"]).unavailable(), InMemoryStore::default()),
        service(ethereum(&["0xa"]), InMemoryStore::failing("connection refused")),
        service_with_settings(
            ethereum(&["0xa"]).with_delay(Duration::from_millis(500)),
            InMemoryStore::default(),
            RecheckSettings {
                request_timeout: Duration::from_millis(50),
                fetch_timeout: Duration::from_millis(20),
            },
        ),
    ];

    for service in services {
        let response = send(
            &service.router,
            recheck("/recheck", json!({ "chainId": "ethereum", "txHashs": ["0xa"] })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(service.forwarder.forwarded().is_empty());
    }
}

#[actix_web::test]
async fn health_reports_serving() {
    let service = service(ethereum(&[]), InMemoryStore::default());

    let response = send(&service.router, test::TestRequest::get().uri("/health")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(response).await, json!({ "status": "SERVING" }));
}
