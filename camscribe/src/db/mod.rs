pub mod backends;
mod connection;
pub(crate) mod schema;
pub mod traits;

use std::sync::Arc;

use tracing::info;

pub use backends::libsql::LibSqlBackend;
pub use backends::mongo::MongoBackend;
pub use connection::Database;
pub use traits::*;

use crate::config::StoreConfig;
use crate::error::{Result, ScanError};

fn is_valid_table_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

/// Open the store named by `config.url`.
///
/// `mongodb://` and `mongodb+srv://` go to MongoDB; `file:` paths and
/// `:memory:` use a local libSQL table named after the collection.
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn ScanStore>> {
    let url = config.url.as_str();

    if url.starts_with("mongodb://") || url.starts_with("mongodb+srv://") {
        let backend = MongoBackend::connect(config).await?;
        return Ok(Arc::new(backend));
    }

    if url == ":memory:" || url.starts_with("file:") {
        if !is_valid_table_name(&config.collection) {
            return Err(ScanError::Config(format!(
                "'{}' is not a valid table name",
                config.collection
            )));
        }
        let db = Database::new(url, &config.collection).await?;
        info!(url, table = %config.collection, "libSQL store opened");
        return Ok(Arc::new(LibSqlBackend::new(db)));
    }

    Err(ScanError::Config(format!(
        "unsupported store URL '{url}' (expected mongodb://, file: or :memory:)"
    )))
}
