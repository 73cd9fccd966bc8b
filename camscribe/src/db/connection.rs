use libsql::{Builder, Connection};

use crate::error::Result;

use super::schema;

/// Local libSQL database holding a single long-lived connection.
///
/// An in-memory database only lives as long as its connection, so the
/// connection is opened once and reused for every statement.
pub struct Database {
    _db: libsql::Database,
    conn: Connection,
    table: String,
}

impl Database {
    pub async fn new(url: &str, table: &str) -> Result<Self> {
        let db = if url == ":memory:" {
            Builder::new_local(":memory:").build().await?
        } else {
            let path = url.strip_prefix("file:").unwrap_or(url);
            Builder::new_local(path).build().await?
        };

        let conn = db.connect()?;
        schema::init_schema(&conn, table).await?;

        Ok(Self {
            _db: db,
            conn,
            table: table.to_string(),
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}
