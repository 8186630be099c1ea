//! Minimal Story JSON-RPC node for driving the mint pipelines end to end.

use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolEvent;
use jumapel_backend::{config::StoryContracts, services::ip_asset::IIPAssetRegistry};
use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, Request, Respond, ResponseTemplate,
};

pub const RPC_PATH: &str = "/rpc";
pub const MINT_TX: &str = "0x5e1d2b8a0c3f4e6d7b9a1c2e3f4d5b6a7c8e9f0a1b2c3d4e5f6a7b8c9d0e1f2a";
pub const IP_ID: &str = "0x4f2a5c8b1e9d3a7f6b0c2e4d8a1b3c5e7f9a0b2c";
pub const TOKEN_ID: u64 = 42;

const BLOCK_HASH: &str = "0x8a3c1f0e2d4b6a8c0e1f3a5b7c9d2e4f6a8b0c1d3e5f7a9b2c4d6e8f0a1b3c5d";
const ZERO_HASH: &str = "0x0000000000000000000000000000000000000000000000000000000000000000";
const ONE_GWEI: &str = "0x3b9aca00";

/// `IPRegistered` log for the default collection, emitted by the registry
pub fn registration_log() -> Value {
    let contracts = StoryContracts::aeneid();
    let event = IIPAssetRegistry::IPRegistered {
        ipId: Address::from_str(IP_ID).unwrap(),
        chainId: U256::from(1315u64),
        tokenContract: Address::from_str(&contracts.spg_nft).unwrap(),
        tokenId: U256::from(TOKEN_ID),
        name: "ReCircuit".into(),
        uri: "https://ipfs.io/ipfs/QmNft".into(),
        registrationDate: U256::from(1_750_000_000u64),
    };
    let data = event.encode_log_data();
    json!({
        "address": contracts.ip_asset_registry,
        "topics": data.topics(),
        "data": data.data,
        "blockHash": BLOCK_HASH,
        "blockNumber": "0x10",
        "transactionHash": MINT_TX,
        "transactionIndex": "0x0",
        "logIndex": "0x0",
        "removed": false
    })
}

pub fn receipt(succeeded: bool, logs: Vec<Value>) -> Value {
    json!({
        "type": "0x2",
        "status": if succeeded { "0x1" } else { "0x0" },
        "cumulativeGasUsed": "0x4c4b4",
        "logs": logs,
        "logsBloom": format!("0x{}", "0".repeat(512)),
        "transactionHash": MINT_TX,
        "transactionIndex": "0x0",
        "blockHash": BLOCK_HASH,
        "blockNumber": "0x10",
        "gasUsed": "0x4c4b4",
        "effectiveGasPrice": ONE_GWEI,
        "from": "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
        "to": StoryContracts::aeneid().license_attachment_workflows,
        "contractAddress": null
    })
}

fn block() -> Value {
    json!({
        "hash": BLOCK_HASH,
        "parentHash": ZERO_HASH,
        "sha3Uncles": ZERO_HASH,
        "miner": "0x0000000000000000000000000000000000000000",
        "stateRoot": ZERO_HASH,
        "transactionsRoot": ZERO_HASH,
        "receiptsRoot": ZERO_HASH,
        "logsBloom": format!("0x{}", "0".repeat(512)),
        "difficulty": "0x0",
        "number": "0x10",
        "gasLimit": "0x1c9c380",
        "gasUsed": "0x4c4b4",
        "timestamp": "0x685c2f80",
        "extraData": "0x",
        "mixHash": ZERO_HASH,
        "nonce": "0x0000000000000000",
        "baseFeePerGas": ONE_GWEI,
        "size": "0x400",
        "uncles": [],
        "transactions": [MINT_TX]
    })
}

/// Answers JSON-RPC calls by method name.
///
/// Every receipt lookup returns `receipt`. Raw transactions after the first
/// `accepted_sends` are refused with an execution revert.
pub struct StoryRpc {
    receipt: Value,
    license_terms_id: u64,
    accepted_sends: usize,
    sends: AtomicUsize,
}

impl StoryRpc {
    pub fn new(receipt: Value) -> Self {
        Self {
            receipt,
            license_terms_id: 1,
            accepted_sends: usize::MAX,
            sends: AtomicUsize::new(0),
        }
    }

    pub fn accepting_sends(mut self, accepted: usize) -> Self {
        self.accepted_sends = accepted;
        self
    }

    pub async fn mount(self, server: &MockServer) {
        Mock::given(method("POST"))
            .and(path(RPC_PATH))
            .respond_with(self)
            .mount(server)
            .await;
    }

    fn answer(&self, call: &Value) -> Value {
        let id = call["id"].clone();
        let result = match call["method"].as_str().unwrap_or_default() {
            "eth_chainId" => json!("0x523"),
            "eth_blockNumber" => json!("0x10"),
            "eth_getTransactionCount" => json!("0x0"),
            "eth_estimateGas" => json!("0x7a120"),
            "eth_gasPrice" | "eth_maxPriorityFeePerGas" => json!(ONE_GWEI),
            "eth_feeHistory" => json!({
                "oldestBlock": "0xf",
                "baseFeePerGas": [ONE_GWEI, ONE_GWEI],
                "gasUsedRatio": [0.5],
                "reward": [[ONE_GWEI]]
            }),
            "eth_getBlockByNumber" | "eth_getBlockByHash" => block(),
            "eth_newBlockFilter" => json!("0x1"),
            "eth_getFilterChanges" => json!([BLOCK_HASH]),
            "eth_call" => json!(format!("0x{:064x}", self.license_terms_id)),
            "eth_sendRawTransaction" => {
                if self.sends.fetch_add(1, Ordering::SeqCst) >= self.accepted_sends {
                    return json!({
                        "jsonrpc": "2.0",
                        "id": id,
                        "error": { "code": -32000, "message": "execution reverted: caller is not the IP owner" }
                    });
                }
                json!(MINT_TX)
            }
            "eth_getTransactionReceipt" => self.receipt.clone(),
            _ => Value::Null,
        };
        json!({ "jsonrpc": "2.0", "id": id, "result": result })
    }
}

impl Respond for StoryRpc {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        let reply = match &body {
            Value::Array(calls) => Value::Array(calls.iter().map(|c| self.answer(c)).collect()),
            call => self.answer(call),
        };
        ResponseTemplate::new(200).set_body_json(reply)
    }
}

/// Number of raw transactions the node received
pub async fn raw_transactions_sent(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == RPC_PATH)
        .filter_map(|r| serde_json::from_slice::<Value>(&r.body).ok())
        .filter(|call| call["method"] == "eth_sendRawTransaction")
        .count()
}
