//! Shared test helpers: mock observatory server and payload builders.

#![allow(dead_code)]

use mev_data::{ObservatoryClient, ObservatoryConfig};
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{json, Value};

/// Starts a mock observatory and a client pointed at it.
pub async fn mock_observatory() -> (ServerGuard, ObservatoryClient) {
    let server = mockito::Server::new_async().await;
    let client = ObservatoryClient::new(ObservatoryConfig::custom(server.url()))
        .expect("client for mock server should build");
    (server, client)
}

/// One raw datapoint with a string-encoded value, as the observatory sends it.
pub fn datapoint(height: u64, value: &str, proposer: &str) -> Value {
    json!({
        "height": height,
        "value": value,
        "proposer": proposer,
        "block": { "height": height, "time": "2024-08-01T00:00:00Z" }
    })
}

pub fn validator(pubkey: &str, moniker: &str) -> Value {
    json!({ "pubkey": pubkey, "moniker": moniker, "jailed": false })
}

/// Registers the raw MEV endpoint for an exact window.
pub async fn mock_raw_mev(
    server: &mut ServerGuard,
    from_height: u64,
    to_height: u64,
    datapoints: Vec<Value>,
) -> Mock {
    server
        .mock("GET", "/api/v1/raw_mev")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("limit".into(), "500000".into()),
            Matcher::UrlEncoded("from_height".into(), from_height.to_string()),
            Matcher::UrlEncoded("to_height".into(), to_height.to_string()),
            Matcher::UrlEncoded("with_block_info".into(), "true".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "datapoints": datapoints }).to_string())
        .expect(1)
        .create_async()
        .await
}

/// Registers the validator endpoint, expecting exactly `hits` calls.
pub async fn mock_validators(server: &mut ServerGuard, validators: Vec<Value>, hits: usize) -> Mock {
    server
        .mock("GET", "/api/v1/validator")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "validators": validators }).to_string())
        .expect(hits)
        .create_async()
        .await
}
