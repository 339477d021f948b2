//! Key-value token storage contract.

use async_trait::async_trait;

use crate::error::StoreError;

/// String key-value storage for tokens.
///
/// The scheduler never touches the store itself; actions do. Both
/// operations are fallible so implementations can surface outages, and
/// a failing fire then leaves its window armed for a retry.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Read the value under `key`, or `default` when the key is absent.
    async fn get_string(&self, key: &str, default: &str) -> Result<String, StoreError>;

    /// Write `value` under `key`.
    async fn set_string(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
