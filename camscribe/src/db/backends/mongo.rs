use async_trait::async_trait;
use mongodb::{Client, Collection};
use tracing::info;

use crate::config::StoreConfig;
use crate::db::traits::ScanStore;
use crate::error::Result;
use crate::models::ScanRecord;

/// Scans inserted as documents into a MongoDB collection.
pub struct MongoBackend {
    client: Client,
    collection: Collection<ScanRecord>,
}

impl MongoBackend {
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let client = Client::with_uri_str(&config.url).await?;
        let collection = client
            .database(&config.database)
            .collection::<ScanRecord>(&config.collection);

        info!(
            database = %config.database,
            collection = %config.collection,
            "MongoDB client configured"
        );

        Ok(Self { client, collection })
    }
}

#[async_trait]
impl ScanStore for MongoBackend {
    async fn insert_scan(&self, record: &ScanRecord) -> Result<String> {
        let result = self.collection.insert_one(record).await?;
        let id = match result.inserted_id.as_object_id() {
            Some(oid) => oid.to_hex(),
            None => result.inserted_id.to_string(),
        };
        Ok(id)
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }

    async fn close(&self) -> Result<()> {
        self.client.clone().shutdown().await;
        Ok(())
    }
}
