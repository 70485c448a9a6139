use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use mongodb::bson::{self, doc, Bson};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use orchestrator_hosting_client_interface::SslState;

use super::r#trait::DomainRepository;
use crate::core::client::database::constant::DOMAINS_COLLECTION;
use crate::core::client::database::error::DatabaseError;
use crate::core::client::database::mongo_client::MongoClient;
use crate::types::domains::domain_item::ProjectDomain;
use crate::types::domains::types::DomainStatusUpdate;

pub struct MongoDomainRepository {
    client: Arc<MongoClient>,
}

impl MongoDomainRepository {
    pub fn new(client: Arc<MongoClient>) -> Self {
        Self { client }
    }

    fn return_updated() -> FindOneAndUpdateOptions {
        FindOneAndUpdateOptions::builder().return_document(ReturnDocument::After).build()
    }
}

#[async_trait]
impl DomainRepository for MongoDomainRepository {
    async fn create_domain(&self, domain: ProjectDomain) -> Result<ProjectDomain, DatabaseError> {
        self.client.insert_one(DOMAINS_COLLECTION, &domain).await?;
        Ok(domain)
    }

    async fn get_domain_by_id(&self, id: &str) -> Result<Option<ProjectDomain>, DatabaseError> {
        self.client.find_one(DOMAINS_COLLECTION, doc! { "id": id }).await
    }

    async fn get_domain_by_name(&self, domain: &str) -> Result<Option<ProjectDomain>, DatabaseError> {
        self.client.find_one(DOMAINS_COLLECTION, doc! { "domain": domain }).await
    }

    async fn get_domains_by_project(&self, project_id: &str) -> Result<Vec<ProjectDomain>, DatabaseError> {
        let options = FindOptions::builder().sort(doc! { "created_at": 1 }).build();
        self.client.find_many(DOMAINS_COLLECTION, doc! { "project_id": project_id }, Some(options)).await
    }

    async fn delete_domain(&self, id: &str) -> Result<bool, DatabaseError> {
        let deleted = self.client.delete_one::<ProjectDomain>(DOMAINS_COLLECTION, doc! { "id": id }).await?;
        Ok(deleted > 0)
    }

    async fn unset_other_primaries(&self, project_id: &str, keep_id: &str) -> Result<u64, DatabaseError> {
        let filter = doc! { "project_id": project_id, "is_primary": true, "id": { "$ne": keep_id } };
        let update = doc! { "$set": { "is_primary": false, "updated_at": Utc::now().trunc_subsecs(3) } };
        let result = self.client.update_many::<ProjectDomain>(DOMAINS_COLLECTION, filter, update).await?;
        Ok(result.modified_count)
    }

    async fn set_domain_primary(&self, id: &str) -> Result<ProjectDomain, DatabaseError> {
        let update = doc! { "$set": { "is_primary": true, "updated_at": Utc::now().trunc_subsecs(3) } };
        self.client
            .find_one_and_update(DOMAINS_COLLECTION, doc! { "id": id }, update, Self::return_updated())
            .await?
            .ok_or_else(|| DatabaseError::ItemNotFound(format!("domain {}", id)))
    }

    async fn claim_domains_for_check(
        &self,
        now: DateTime<Utc>,
        lease_until: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ProjectDomain>, DatabaseError> {
        let mut leased = Vec::new();
        let now = now.trunc_subsecs(3);
        let lease_until = lease_until.trunc_subsecs(3);

        // One lease per round trip keeps each claim atomic
        while leased.len() < limit {
            let filter = doc! {
                "stale": { "$ne": true },
                "next_check_at": { "$lte": now },
                "$nor": [{ "verified": true, "ssl_state": bson::to_bson(&SslState::Ready)? }],
            };
            let update = doc! { "$set": { "next_check_at": lease_until } };
            let options = FindOneAndUpdateOptions::builder()
                .sort(doc! { "next_check_at": 1 })
                .return_document(ReturnDocument::After)
                .build();

            match self.client.find_one_and_update(DOMAINS_COLLECTION, filter, update, options).await? {
                Some(domain) => leased.push(domain),
                None => break,
            }
        }

        Ok(leased)
    }

    async fn update_domain_status(&self, id: &str, update: DomainStatusUpdate) -> Result<ProjectDomain, DatabaseError> {
        let verified_at = match update.verified_at {
            Some(at) => Bson::from(at.trunc_subsecs(3)),
            None => Bson::Null,
        };
        let set = doc! {
            "$set": {
                "verified": update.verified,
                "verified_at": verified_at,
                "ssl_state": bson::to_bson(&update.ssl_state)?,
                "verification_details": bson::to_bson(&update.verification_details)?,
                "stale": update.stale,
                "last_checked_at": update.last_checked_at.trunc_subsecs(3),
                "next_check_at": update.next_check_at.trunc_subsecs(3),
                "updated_at": update.last_checked_at.trunc_subsecs(3),
            }
        };
        self.client
            .find_one_and_update(DOMAINS_COLLECTION, doc! { "id": id }, set, Self::return_updated())
            .await?
            .ok_or_else(|| DatabaseError::ItemNotFound(format!("domain {}", id)))
    }

    async fn mark_stale_domains(&self, created_before: DateTime<Utc>) -> Result<u64, DatabaseError> {
        let filter = doc! {
            "verified": false,
            "stale": { "$ne": true },
            "created_at": { "$lt": created_before.trunc_subsecs(3) },
        };
        let update = doc! { "$set": { "stale": true, "updated_at": Utc::now().trunc_subsecs(3) } };
        let result = self.client.update_many::<ProjectDomain>(DOMAINS_COLLECTION, filter, update).await?;
        Ok(result.modified_count)
    }
}
