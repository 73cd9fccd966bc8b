use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::params;
use nanoid::nanoid;

use crate::db::connection::Database;
use crate::db::traits::ScanStore;
use crate::error::{Result, ScanError};
use crate::models::ScanRecord;

/// Scans kept in a local libSQL file (or in memory).
pub struct LibSqlBackend {
    db: Database,
}

impl LibSqlBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Every stored scan with its id, oldest first.
    pub async fn list_scans(&self) -> Result<Vec<(String, ScanRecord)>> {
        let sql = format!(
            "SELECT id, text, length, timestamp FROM {} ORDER BY timestamp, rowid",
            self.db.table()
        );
        let mut rows = self.db.connection().query(&sql, ()).await?;

        let mut scans = Vec::new();
        while let Some(row) = rows.next().await? {
            let raw_timestamp = row.get::<String>(3)?;
            let timestamp = DateTime::parse_from_rfc3339(&raw_timestamp)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| {
                    ScanError::Store(format!("bad timestamp '{raw_timestamp}': {e}"))
                })?;
            let record = ScanRecord {
                text: row.get(1)?,
                length: row.get::<Option<i64>>(2)?.map(|len| len as usize),
                timestamp,
            };
            scans.push((row.get(0)?, record));
        }
        Ok(scans)
    }
}

#[async_trait]
impl ScanStore for LibSqlBackend {
    async fn insert_scan(&self, record: &ScanRecord) -> Result<String> {
        let id = nanoid!();
        let sql = format!(
            "INSERT INTO {} (id, text, length, timestamp) VALUES (?1, ?2, ?3, ?4)",
            self.db.table()
        );
        self.db
            .connection()
            .execute(
                &sql,
                params![
                    id.clone(),
                    record.text.clone(),
                    record.length.map(|len| len as i64),
                    record.timestamp.to_rfc3339(),
                ],
            )
            .await?;
        Ok(id)
    }

    fn backend_name(&self) -> &'static str {
        "libsql"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecognitionResult;

    async fn memory_backend() -> LibSqlBackend {
        LibSqlBackend::new(Database::new(":memory:", "scanned_texts").await.unwrap())
    }

    #[tokio::test]
    async fn test_insert_assigns_distinct_ids() {
        let backend = memory_backend().await;
        let result = RecognitionResult::new("The quick brown fox jumps".to_string());

        let first = backend.insert_scan(&ScanRecord::new(&result, true)).await.unwrap();
        let second = backend.insert_scan(&ScanRecord::new(&result, true)).await.unwrap();

        assert!(!first.is_empty());
        assert_ne!(first, second);
        assert_eq!(backend.list_scans().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_round_trip_preserves_fields() {
        let backend = memory_backend().await;
        let result = RecognitionResult::new("Printed page of text".to_string());
        let record = ScanRecord::new(&result, true);

        let id = backend.insert_scan(&record).await.unwrap();
        let scans = backend.list_scans().await.unwrap();

        assert_eq!(scans.len(), 1);
        assert_eq!(scans[0].0, id);
        assert_eq!(scans[0].1.text, "Printed page of text");
        assert_eq!(scans[0].1.length, Some(20));
        assert_eq!(
            scans[0].1.timestamp.timestamp_micros(),
            record.timestamp.timestamp_micros()
        );
    }

    #[tokio::test]
    async fn test_length_column_is_null_when_omitted() {
        let backend = memory_backend().await;
        let result = RecognitionResult::new("raw text".to_string());
        backend
            .insert_scan(&ScanRecord::new(&result, false))
            .await
            .unwrap();

        let scans = backend.list_scans().await.unwrap();
        assert_eq!(scans[0].1.length, None);
    }
}
