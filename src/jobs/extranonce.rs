// Graxil Proxy - Free and Open Source Software Statement
//
// This project, graxil-proxy, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/jobs/extranonce.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file holds the upstream extranonce session and assembles the full
// extranonce (extranonce1 || padded extranonce2) used in coinbase construction.
//
// Tree Location:
// - src/jobs/extranonce.rs (extranonce builder)
// - Depends on: hex, log

use crate::jobs::error::RegistryError;
use log::warn;

const LOG_TARGET: &str = "graxil::proxy::extranonce";

/// Largest extranonce2 a pool may assign
pub const MAX_EXTRANONCE2_SIZE: usize = 32;

/// Extranonce parameters assigned by the pool for this session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtranonceSession {
    extranonce1: Vec<u8>,
    extranonce1_hex: String,
    extranonce2_size: usize,
}

impl ExtranonceSession {
    pub fn new(extranonce1_hex: &str, extranonce2_size: usize) -> Result<Self, RegistryError> {
        if extranonce2_size > MAX_EXTRANONCE2_SIZE {
            return Err(RegistryError::Extranonce2TooLarge {
                size: extranonce2_size,
                max: MAX_EXTRANONCE2_SIZE,
            });
        }
        let extranonce1 = hex::decode(extranonce1_hex).map_err(|source| RegistryError::InvalidHex {
            field: "extranonce1",
            source,
        })?;
        Ok(Self {
            extranonce1,
            extranonce1_hex: extranonce1_hex.to_ascii_lowercase(),
            extranonce2_size,
        })
    }

    pub fn extranonce1(&self) -> &[u8] {
        &self.extranonce1
    }

    pub fn extranonce1_hex(&self) -> &str {
        &self.extranonce1_hex
    }

    pub fn extranonce2_size(&self) -> usize {
        self.extranonce2_size
    }

    /// Extranonce2 conformed to the session's extranonce2 size
    pub fn pad(&self, extranonce2: u32) -> Result<Vec<u8>, RegistryError> {
        if self.extranonce2_size == 0 {
            return Err(RegistryError::ExtranonceNotSet);
        }
        Ok(pad_extranonce2(extranonce2, self.extranonce2_size))
    }

    /// extranonce1 joined with the padded extranonce2
    pub fn build_full_extranonce(&self, extranonce2: u32) -> Result<Vec<u8>, RegistryError> {
        let padded = self.pad(extranonce2)?;
        let mut full = Vec::with_capacity(self.extranonce1.len() + padded.len());
        full.extend_from_slice(&self.extranonce1);
        full.extend_from_slice(&padded);
        Ok(full)
    }
}

/// Encode `extranonce2` big-endian and fit it into `size` bytes.
///
/// Narrower fields keep only the low-order bytes, so the value no longer
/// round-trips once it exceeds the field.
pub fn pad_extranonce2(extranonce2: u32, size: usize) -> Vec<u8> {
    let encoded = extranonce2.to_be_bytes();
    if size < encoded.len() {
        warn!(target: LOG_TARGET,
            "Extranonce size mismatch ({} < {}). Please report this error to pool operator!",
            size,
            encoded.len()
        );
        return encoded[encoded.len() - size..].to_vec();
    }

    let mut padded = vec![0u8; size - encoded.len()];
    padded.extend_from_slice(&encoded);
    padded
}


// Changelog:
// - v1.0.0 (2026-10-16): Initial extranonce builder.
//   - Pads extranonce2 with leading zeros or keeps its low bytes with a warning.
//   - Pool-assigned extranonce2 sizes above 32 bytes are refused.
