// Graxil Proxy - Free and Open Source Software Statement
//
// This project, graxil-proxy, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/pool/protocol.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file builds the Stratum V1 requests the proxy sends upstream.
//
// Tree Location:
// - src/pool/protocol.rs (Stratum request builders)
// - Depends on: serde_json

use log::{debug, error};
use serde_json::{Value, json};

const LOG_TARGET: &str = "graxil::proxy::pool::protocol";

pub const SUBSCRIBE_ID: u64 = 1;
pub const AUTHORIZE_ID: u64 = 2;
pub const EXTRANONCE_SUBSCRIBE_ID: u64 = 3;

const USER_AGENT: &str = "graxil-proxy/1.0.0";

/// Constructs messages for the Stratum protocol
pub struct StratumProtocol;

impl StratumProtocol {
    pub fn create_subscribe_request() -> Value {
        json!({
            "id": SUBSCRIBE_ID,
            "method": "mining.subscribe",
            "params": [USER_AGENT]
        })
    }

    pub fn create_authorize_request(user: &str, password: &str) -> Value {
        if user.is_empty() {
            error!(target: LOG_TARGET, "Invalid pool user for authorize: empty");
            return Value::Null;
        }
        json!({
            "id": AUTHORIZE_ID,
            "method": "mining.authorize",
            "params": [user, password]
        })
    }

    /// Ask the pool to push mining.set_extranonce instead of reconnecting
    pub fn create_extranonce_subscribe_request() -> Value {
        json!({
            "id": EXTRANONCE_SUBSCRIBE_ID,
            "method": "mining.extranonce.subscribe",
            "params": []
        })
    }

    /// Convert a JSON message to a string with newline
    pub fn to_message(json: Value) -> String {
        if json.is_null() {
            error!(target: LOG_TARGET, "Attempted to serialize empty JSON message");
            return String::new();
        }
        debug!(target: LOG_TARGET, "Serialized Stratum message: {}", json);
        format!("{}\n", json)
    }
}


// Changelog:
// - v1.0.0 (2026-10-16): Stratum V1 requests for the proxy.
//   - subscribe, authorize and extranonce.subscribe with fixed request ids.
