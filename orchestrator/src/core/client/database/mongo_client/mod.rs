pub mod helpers;

use std::sync::Arc;

use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, UpdateOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use serde::de::DeserializeOwned;
use serde::Serialize;

use self::helpers::{record_metrics, ToDocument};
use crate::core::client::database::error::DatabaseError;

/// Thin MongoDB wrapper shared by the repositories.
///
/// Knows nothing about jobs or domains. Every call is timed through [`record_metrics`] and
/// driver errors are mapped into [`DatabaseError`], so unique index violations surface as
/// [`DatabaseError::DuplicateKey`].
pub struct MongoClient {
    client: Client,
    database: Arc<Database>,
}

impl MongoClient {
    pub async fn new(connection_uri: &str, database_name: &str) -> Result<Self, DatabaseError> {
        let client = Client::with_uri_str(connection_uri).await?;
        let database = Arc::new(client.database(database_name));
        Ok(Self { client, database })
    }

    pub fn collection<T>(&self, name: &str) -> Collection<T> {
        self.database.collection(name)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn find_one<T>(&self, collection: &str, filter: Document) -> Result<Option<T>, DatabaseError>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        record_metrics("find_one", || async { Ok(self.collection::<T>(collection).find_one(filter, None).await?) })
            .await
    }

    pub async fn find_many<T>(
        &self,
        collection: &str,
        filter: Document,
        options: Option<FindOptions>,
    ) -> Result<Vec<T>, DatabaseError>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        record_metrics("find_many", || async {
            let cursor = self.collection::<T>(collection).find(filter, options).await?;
            Ok(cursor.try_collect().await?)
        })
        .await
    }

    pub async fn insert_one<T>(&self, collection: &str, doc: &T) -> Result<(), DatabaseError>
    where
        T: Serialize + Send + Sync,
    {
        record_metrics("insert_one", || async {
            self.collection::<T>(collection).insert_one(doc, None).await?;
            Ok(())
        })
        .await
    }

    /// Insert unless a document matches `filter` (upsert with `$setOnInsert`).
    /// Returns true if inserted, false if one already existed
    pub async fn insert_if_not_exists<T>(&self, collection: &str, filter: Document, doc: &T) -> Result<bool, DatabaseError>
    where
        T: Serialize + Send + Sync,
    {
        record_metrics("insert_if_not_exists", || async {
            let options = UpdateOptions::builder().upsert(true).build();
            let update = doc! { "$setOnInsert": doc.to_document()? };
            let result = self.collection::<T>(collection).update_one(filter, update, options).await?;
            Ok(result.matched_count == 0)
        })
        .await
    }

    /// Update the matching document, inserting it when none matches
    pub async fn upsert_one<T>(&self, collection: &str, filter: Document, update: Document) -> Result<(), DatabaseError>
    where
        T: Send + Sync,
    {
        record_metrics("upsert_one", || async {
            let options = UpdateOptions::builder().upsert(true).build();
            self.collection::<T>(collection).update_one(filter, update, options).await?;
            Ok(())
        })
        .await
    }

    pub async fn update_one<T>(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<UpdateResult, DatabaseError>
    where
        T: Send + Sync,
    {
        record_metrics("update_one", || async {
            let result = self.collection::<T>(collection).update_one(filter, update, None).await?;
            Ok(UpdateResult { matched_count: result.matched_count, modified_count: result.modified_count })
        })
        .await
    }

    pub async fn update_many<T>(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<UpdateResult, DatabaseError>
    where
        T: Send + Sync,
    {
        record_metrics("update_many", || async {
            let result = self.collection::<T>(collection).update_many(filter, update, None).await?;
            Ok(UpdateResult { matched_count: result.matched_count, modified_count: result.modified_count })
        })
        .await
    }

    /// Atomic find and modify. What is returned (before/after) is decided by `options`
    pub async fn find_one_and_update<T>(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: FindOneAndUpdateOptions,
    ) -> Result<Option<T>, DatabaseError>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        record_metrics("find_one_and_update", || async {
            Ok(self.collection::<T>(collection).find_one_and_update(filter, update, options).await?)
        })
        .await
    }

    /// Distinct values of `field` among matching documents
    pub async fn distinct<T>(&self, collection: &str, field: &str, filter: Document) -> Result<Vec<Bson>, DatabaseError>
    where
        T: Send + Sync,
    {
        record_metrics("distinct", || async { Ok(self.collection::<T>(collection).distinct(field, filter, None).await?) })
            .await
    }

    pub async fn delete_one<T>(&self, collection: &str, filter: Document) -> Result<u64, DatabaseError>
    where
        T: Send + Sync,
    {
        record_metrics("delete_one", || async {
            let result = self.collection::<T>(collection).delete_one(filter, None).await?;
            Ok(result.deleted_count)
        })
        .await
    }

    pub async fn create_indexes<T>(&self, collection: &str, indexes: Vec<IndexModel>) -> Result<(), DatabaseError>
    where
        T: Send + Sync,
    {
        record_metrics("create_indexes", || async {
            self.collection::<T>(collection).create_indexes(indexes, None).await?;
            Ok(())
        })
        .await
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        record_metrics("health_check", || async {
            self.database.run_command(doc! { "ping": 1 }, None).await?;
            Ok(())
        })
        .await
    }
}

/// Result of an update operation
#[derive(Debug, Clone, Copy)]
pub struct UpdateResult {
    pub matched_count: u64,
    pub modified_count: u64,
}
