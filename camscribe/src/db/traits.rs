use async_trait::async_trait;

use crate::error::Result;
use crate::models::ScanRecord;

/// Append-only sink for accepted scans.
#[async_trait]
pub trait ScanStore: Send + Sync {
    /// Insert `record` as a new entry and return the id the store assigned.
    async fn insert_scan(&self, record: &ScanRecord) -> Result<String>;

    /// Human-readable backend name for logs.
    fn backend_name(&self) -> &'static str;

    /// Release the connection. The store must not be used afterwards.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
