/// Persistence module
///
/// Key-value storage capability the credential store delegates to.
/// Entries carry their own expiry: an expired entry is simply absent.

use std::time::Duration;

use anyhow::Result;

pub mod file;
pub mod memory;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> impl std::future::Future<Output = Option<String>> + Send;

    fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn clear(&self, key: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}
