//! Address normalization utilities.
//!
//! This module is the canonical source for address handling in the workspace.
//! Addresses are 20-byte values rendered as 40 hex characters. They appear in
//! several formats:
//! - Canonical (storage/lookup): lowercase, no prefix: `"1234...abcd"`
//! - Sender form (call messages): prefixed upper-case: `"0x1234...ABCD"`

use anyhow::{anyhow, Result};

/// Byte length of an address.
pub const ADDRESS_LEN: usize = 20;

/// Normalize an address to the canonical lowercase 40-hex form.
///
/// Accepts an optional `0x`/`0X` prefix and surrounding whitespace.
pub fn normalize_address(addr: &str) -> Result<String> {
    let addr = addr.trim();
    let hex_part = addr
        .strip_prefix("0x")
        .or_else(|| addr.strip_prefix("0X"))
        .unwrap_or(addr);
    let bytes = hex::decode(hex_part).map_err(|e| anyhow!("invalid address '{}': {}", addr, e))?;
    if bytes.len() != ADDRESS_LEN {
        return Err(anyhow!(
            "invalid address '{}': expected {} bytes, got {}",
            addr,
            ADDRESS_LEN,
            bytes.len()
        ));
    }
    Ok(hex::encode(bytes))
}

/// Render an address in the chain-prefixed upper-case sender form.
pub fn sender_form(addr: &str) -> String {
    format!("0x{}", addr.to_uppercase())
}

/// Canonical address from raw bytes.
pub fn address_from_bytes(bytes: &[u8; ADDRESS_LEN]) -> String {
    hex::encode(bytes)
}
