use libsql::Connection;

use crate::error::Result;

pub async fn init_schema(conn: &Connection, table: &str) -> Result<()> {
    conn.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id TEXT PRIMARY KEY,
            text TEXT NOT NULL,
            length INTEGER,
            timestamp TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_{table}_timestamp ON {table}(timestamp);
        "#
    ))
    .await?;
    Ok(())
}
