//! Account records and checked balance arithmetic.
//!
//! Balances are unsigned 128-bit values stored as decimal strings. All
//! arithmetic here is checked: a computation that would underflow or
//! overflow returns an error instead of wrapping, so a caller can surface it
//! as a consistency failure rather than persisting a bogus balance.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// A simulator or network account.
///
/// Mutated only by the orchestrator after a confirmed call; the UI and all
/// other readers get clones out of the application state store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Canonical lowercase 40-hex address.
    pub address: String,
    /// Unsigned balance as a decimal string (Uint128 range).
    pub balance: String,
    /// Monotonic transaction count.
    pub nonce: u64,
}

impl Account {
    pub fn new(address: &str, balance: &str) -> Self {
        Self {
            address: address.to_string(),
            balance: balance.to_string(),
            nonce: 0,
        }
    }

    /// Apply the accounting for one successful transition call, returning the
    /// updated account.
    ///
    /// `new balance = old − amount − gas_used × gas_price + refund`, nonce
    /// incremented by one. Fails when the result would go negative or any
    /// intermediate product overflows.
    pub fn apply_call_charge(
        &self,
        amount: u128,
        gas_used: u64,
        gas_price: u64,
        refund: u128,
    ) -> Result<Account> {
        let balance = parse_uint128(&self.balance)?;
        let gas_cost = (gas_used as u128)
            .checked_mul(gas_price as u128)
            .ok_or_else(|| anyhow!("gas cost overflows Uint128"))?;
        let charged = amount
            .checked_add(gas_cost)
            .ok_or_else(|| anyhow!("charge overflows Uint128"))?;
        let debited = balance.checked_sub(charged).ok_or_else(|| {
            anyhow!(
                "insufficient balance: have {}, need {} (amount {} + gas {})",
                balance,
                charged,
                amount,
                gas_cost
            )
        })?;
        let credited = debited
            .checked_add(refund)
            .ok_or_else(|| anyhow!("refunded balance overflows Uint128"))?;
        Ok(Account {
            address: self.address.clone(),
            balance: credited.to_string(),
            nonce: self.nonce + 1,
        })
    }
}

/// Parse an unsigned decimal string into a `u128`.
///
/// Rejects empty strings, signs and non-digit characters.
pub fn parse_uint128(s: &str) -> Result<u128> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(anyhow!("invalid unsigned decimal value '{}'", s));
    }
    s.parse::<u128>()
        .map_err(|e| anyhow!("value '{}' out of Uint128 range: {}", s, e))
}
