#![allow(dead_code)]

use serde_json::{json, Value};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Provider catalog with one provider lending USDC and ETH.
pub fn provider_catalog() -> Value {
    json!([
        {
            "id": "acme",
            "info": {
                "id": "acme",
                "description": "Acme lending desk",
                "image": "https://acme.example/logo.png",
                "website": "https://acme.example"
            },
            "assets": [
                { "symbol": "USDC", "chain": "ethereum", "description": "USD Coin",
                  "yield_freq": 86400, "terms": [7, 30, 30.5, 180] },
                { "symbol": "ETH", "chain": "ethereum", "description": "Ether",
                  "yield_freq": 3600, "terms": [] }
            ]
        }
    ])
}

pub fn rates_response() -> Value {
    json!({
        "provider": "acme",
        "rates": [
            { "asset": "USDC",
              "term_rates": [ { "term": 7, "apr": 0.9 }, { "term": 30, "apr": 1.45 } ],
              "max_apr": 1.45 }
        ]
    })
}

pub fn account_response() -> Value {
    json!({
        "contracts": {
            "address": "0xabc",
            "contracts": [
                { "asset": "USDC", "term": 30, "start_amount": "1000.00",
                  "current_amount": "1003.21", "end_amount_estimate": "1012.08",
                  "current_apr": 1.45, "start_time": 1700000000,
                  "current_time": 1700500000, "end_time": 1702592000 }
            ]
        }
    })
}

/// Writes `value` to a file under the system temp dir and returns its path.
pub fn write_temp_json(name: &str, value: &Value) -> PathBuf {
    let path = env::temp_dir().join(format!("lending-api-{}-{}.json", std::process::id(), name));
    fs::write(&path, value.to_string()).expect("Failed to write temp fixture");
    path
}
