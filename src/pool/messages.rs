// Graxil Proxy - Free and Open Source Software Statement
//
// This project, graxil-proxy, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/pool/messages.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file parses the Stratum V1 lines received from the upstream pool into
// typed messages, located in the pool subdirectory.
//
// Tree Location:
// - src/pool/messages.rs (upstream message parsing)
// - Depends on: serde_json, crate::jobs::job

use crate::Result;
use crate::jobs::job::JobBroadcast;
use crate::pool::protocol::{AUTHORIZE_ID, SUBSCRIBE_ID};
use log::debug;
use serde_json::Value;

const LOG_TARGET: &str = "graxil::proxy::pool::messages";

/// Leading mining.notify params that make up a JobBroadcast
const NOTIFY_PARAMS: usize = 9;

/// Message received from the upstream pool
#[derive(Debug, Clone, PartialEq)]
pub enum PoolMessage {
    /// Result of mining.subscribe
    Subscribed { extranonce1: String, extranonce2_size: usize },

    /// Result of mining.authorize
    Authorized(bool),

    /// mining.set_difficulty
    SetDifficulty(f64),

    /// mining.set_extranonce
    SetExtranonce { extranonce1: String, extranonce2_size: usize },

    /// mining.notify
    Notify(JobBroadcast),

    /// Any other response
    Response { id: u64, result: Value },

    /// Error response
    Error { id: Option<u64>, message: String },
}

/// Parse one line from the pool. Unknown methods give Ok(None).
pub fn parse_pool_message(line: &str) -> Result<Option<PoolMessage>> {
    let message: Value = serde_json::from_str(line)?;

    if let Some(method) = message.get("method").and_then(|m| m.as_str()) {
        let params = message.get("params").cloned().unwrap_or(Value::Null);
        return match method {
            "mining.notify" => {
                let mut params = params;
                // some pools append their own fields after clean_jobs
                if let Value::Array(ref mut items) = params {
                    items.truncate(NOTIFY_PARAMS);
                }
                let broadcast: JobBroadcast = serde_json::from_value(params)?;
                Ok(Some(PoolMessage::Notify(broadcast)))
            }
            "mining.set_difficulty" => {
                let difficulty = params
                    .get(0)
                    .and_then(|d| d.as_f64())
                    .ok_or("mining.set_difficulty without a numeric difficulty")?;
                Ok(Some(PoolMessage::SetDifficulty(difficulty)))
            }
            "mining.set_extranonce" => {
                let (extranonce1, extranonce2_size) = parse_extranonce(&params, 0)
                    .ok_or("mining.set_extranonce with invalid params")?;
                Ok(Some(PoolMessage::SetExtranonce { extranonce1, extranonce2_size }))
            }
            _ => {
                debug!(target: LOG_TARGET, "Ignoring pool method: {}", method);
                Ok(None)
            }
        };
    }

    let Some(id) = message.get("id").and_then(|id| id.as_u64()) else {
        debug!(target: LOG_TARGET, "Unknown pool message: {}", message);
        return Ok(None);
    };

    if let Some(error) = message.get("error").filter(|e| !e.is_null()) {
        return Ok(Some(PoolMessage::Error {
            id: Some(id),
            message: error_message(error),
        }));
    }

    let result = message.get("result").cloned().unwrap_or(Value::Null);
    match id {
        SUBSCRIBE_ID => {
            let (extranonce1, extranonce2_size) =
                parse_extranonce(&result, 1).ok_or("mining.subscribe result without extranonce")?;
            Ok(Some(PoolMessage::Subscribed { extranonce1, extranonce2_size }))
        }
        AUTHORIZE_ID => Ok(Some(PoolMessage::Authorized(result.as_bool().unwrap_or(false)))),
        _ => Ok(Some(PoolMessage::Response { id, result })),
    }
}

/// Read [extranonce1, extranonce2_size] starting at `offset` of an array
fn parse_extranonce(values: &Value, offset: usize) -> Option<(String, usize)> {
    let extranonce1 = values.get(offset)?.as_str()?.to_string();
    let extranonce2_size = usize::try_from(values.get(offset + 1)?.as_u64()?).ok()?;
    Some((extranonce1, extranonce2_size))
}

/// Stratum errors come as [code, message, data] or as an object
fn error_message(error: &Value) -> String {
    if let Some(message) = error.get(1).and_then(|m| m.as_str()) {
        return message.to_string();
    }
    if let Some(message) = error.get("message").and_then(|m| m.as_str()) {
        return message.to_string();
    }
    error.to_string()
}


// Changelog:
// - v1.0.0 (2026-10-16): Stratum V1 upstream messages.
//   - mining.notify params deserialize into JobBroadcast.
//   - Subscribe and set_extranonce both yield extranonce1/extranonce2_size.
//   - Extra params after clean_jobs are ignored.
