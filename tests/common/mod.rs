#![allow(dead_code)]

pub mod chain;

use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use jumapel_backend::{
    config::{
        AppConfig, ChainConfig, IndexerConfig, LlmConfig, PinataConfig, ServerConfig,
        StoryContracts, STORY_AENEID_CHAIN_ID,
    },
    routes::build_router,
    services::ip_asset::MintPipeline,
    AppState,
};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Well-known local development key; never funded on a real network
pub const TEST_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Nothing listens here, so any chain call fails fast
pub const UNREACHABLE_RPC: &str = "http://127.0.0.1:1";

pub const ALCHEMY_KEY: &str = "test-alchemy-key";

/// Configuration with every external service pointed at `mock_uri`
pub fn test_config(mock_uri: &str) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        llm: LlmConfig {
            base_url: format!("{}/llm", mock_uri),
            api_key: "test-llm-key".to_string(),
            model: "test/model".to_string(),
            referer: "http://localhost:3000".to_string(),
            app_title: "Jumapel".to_string(),
        },
        pinata: PinataConfig {
            api_url: format!("{}/pinata", mock_uri),
            jwt: "test-jwt".to_string(),
            gateway_url: format!("{}/ipfs", mock_uri),
        },
        chain: ChainConfig {
            rpc_url: UNREACHABLE_RPC.to_string(),
            chain_id: STORY_AENEID_CHAIN_ID,
            private_key: TEST_PRIVATE_KEY.to_string(),
            pipeline: MintPipeline::AttachPilTerms,
            explorer_url: "https://aeneid.explorer.story.foundation".to_string(),
            contracts: StoryContracts::aeneid(),
        },
        indexer: IndexerConfig {
            alchemy_nft_url: format!("{}/alchemy", mock_uri),
            alchemy_api_key: ALCHEMY_KEY.to_string(),
            story_api_url: format!("{}/story", mock_uri),
            story_api_key: "test-story-key".to_string(),
            story_api_chain: "story-aeneid".to_string(),
            collection_address: StoryContracts::aeneid().spg_nft,
            metadata_cache_ttl: Duration::from_secs(60),
        },
        http_timeout: Duration::from_secs(10),
        max_upload_bytes: 10 * 1024 * 1024,
    }
}

pub fn test_state(mock_uri: &str) -> AppState {
    AppState::from_config(test_config(mock_uri)).expect("test state should build")
}

pub fn test_app(mock_uri: &str) -> Router {
    build_router(test_state(mock_uri))
}

pub fn app_with_config(config: AppConfig) -> Router {
    build_router(AppState::from_config(config).expect("test state should build"))
}

/// Mounts a Pinata pin endpoint that answers every upload with `cid`.
pub async fn mount_pinata(server: &MockServer, cid: &str) {
    Mock::given(method("POST"))
        .and(path("/pinata/pinning/pinFileToIPFS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "IpfsHash": cid,
            "PinSize": 1,
            "Timestamp": "2025-01-01T00:00:00Z"
        })))
        .mount(server)
        .await;
}

pub fn json_request(http_method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(http_method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(http_method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(http_method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub const BOUNDARY: &str = "jumapel-test-boundary";

/// Single-part multipart/form-data body
pub fn multipart_body(field: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// True when `needle` occurs in `haystack` as a contiguous run
pub fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}

/// PNG signature followed by `len - 8` filler bytes
pub fn fake_png(len: usize) -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend((0..len.saturating_sub(8)).map(|i| (i % 251) as u8));
    bytes
}
