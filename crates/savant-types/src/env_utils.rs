//! Environment variable parsing utilities.
//!
//! Type-safe helpers for reading configuration from the environment with
//! defaults, replacing the repeated pattern:
//!
//! ```ignore
//! std::env::var("SAVANT_BLOCK_NUM")
//!     .ok()
//!     .and_then(|v| v.parse::<u64>().ok())
//!     .unwrap_or(default_value)
//! ```

use std::str::FromStr;

/// Parse an environment variable into a type that implements `FromStr`.
///
/// Returns `None` if the variable is not set or cannot be parsed.
pub fn env_var<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Parse an environment variable with a default value.
///
/// Returns the default if the variable is not set or cannot be parsed.
///
/// # Example
///
/// ```
/// use savant_types::env_utils::env_var_or;
///
/// let timeout: u64 = env_var_or("SAVANT_REQUEST_TIMEOUT_MS", 30_000);
/// ```
pub fn env_var_or<T: FromStr>(key: &str, default: T) -> T {
    env_var(key).unwrap_or(default)
}

/// Read a string environment variable with a default.
pub fn env_string_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read a boolean environment variable.
///
/// Accepts `1`, `true`, `yes`, `on` (case-insensitive) as true.
pub fn env_bool(key: &str) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}
