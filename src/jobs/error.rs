// Graxil Proxy - Free and Open Source Software Statement
//
// This project, graxil-proxy, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/jobs/error.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file defines the error type shared by the job registry components.
// Unknown jobs and unknown merkle hashes are not errors, lookups return None.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Field {field} is not valid hex")]
    InvalidHex {
        field: &'static str,
        #[source]
        source: hex::FromHexError,
    },

    #[error("Field {field} must be 32 bytes, got {len}")]
    InvalidHashLength { field: &'static str, len: usize },

    #[error("Field {field} is not a valid hex number: {value}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Difficulty must be a positive finite number, got {0}")]
    InvalidDifficulty(f64),

    #[error("Extranonce2_size isn't set yet")]
    ExtranonceNotSet,

    #[error("Extranonce2 size {size} is too small for a {tail_width} byte tail")]
    Extranonce2TooSmall { size: usize, tail_width: usize },

    #[error("Extranonce2 size {size} exceeds the {max} byte limit")]
    Extranonce2TooLarge { size: usize, max: usize },

    #[error("Extranonce slots are full, please disconnect some miners!")]
    TailsExhausted,

    #[error("Invalid extranonce tail: {0}")]
    InvalidTail(String),

    #[error("Malformed block header ({len} hex chars)")]
    MalformedHeader { len: usize },
}

// Changelog:
// - v1.0.0 (2026-10-16): Initial registry error type.
//   - Covers decoding, configuration, capacity and header shape failures.
