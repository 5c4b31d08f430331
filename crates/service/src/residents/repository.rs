use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc},
    Collection, Database,
};
use models::resident::{self, ResidentDocument};

use super::domain::{NewResident, Resident};
use crate::errors::ServiceError;

/// Append-and-read storage for residents.
#[async_trait]
pub trait ResidentRepository: Send + Sync {
    /// All residents, most recently inserted first.
    async fn list_newest_first(&self) -> Result<Vec<Resident>, ServiceError>;
    async fn insert(&self, new: NewResident) -> Result<Resident, ServiceError>;
}

/// MongoDB-backed repository over one collection.
#[derive(Clone)]
pub struct MongoResidentRepository {
    collection: Collection<ResidentDocument>,
}

impl MongoResidentRepository {
    pub fn new(db: &Database, collection: &str) -> Self {
        Self { collection: resident::collection(db, collection) }
    }
}

impl From<ResidentDocument> for Resident {
    fn from(d: ResidentDocument) -> Self {
        Resident {
            id: d.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            first_name: d.first_name,
            last_name: d.last_name,
            role: d.role,
            profile_photo: d.profile_photo.unwrap_or_default(),
            linkedin: d.linkedin,
            twitter: d.twitter,
            created_at: DateTime::<Utc>::from_timestamp_millis(d.created_at.timestamp_millis()).unwrap_or_default(),
        }
    }
}

fn to_document(new: &NewResident) -> ResidentDocument {
    ResidentDocument {
        id: None,
        first_name: new.first_name.clone(),
        last_name: new.last_name.clone(),
        role: new.role.clone(),
        profile_photo: Some(new.profile_photo.clone()),
        linkedin: new.linkedin.clone(),
        twitter: new.twitter.clone(),
        created_at: bson::DateTime::from_millis(new.created_at.timestamp_millis()),
    }
}

#[async_trait]
impl ResidentRepository for MongoResidentRepository {
    async fn list_newest_first(&self) -> Result<Vec<Resident>, ServiceError> {
        // object ids grow with insertion, so _id order is insertion order
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "_id": -1 })
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        let docs: Vec<ResidentDocument> = cursor
            .try_collect()
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(docs.into_iter().map(Resident::from).collect())
    }

    async fn insert(&self, new: NewResident) -> Result<Resident, ServiceError> {
        let result = self
            .collection
            .insert_one(to_document(&new))
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| ServiceError::Db(format!("unexpected inserted id {}", result.inserted_id)))?;
        Ok(new.into_resident(id.to_hex()))
    }
}

/// Simple in-memory repository for tests and doc examples
pub mod mock {
    use super::*;
    use mongodb::bson::oid::ObjectId;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct InMemoryResidentRepository {
        rows: Mutex<Vec<Resident>>, // insertion order
        fail_reads: AtomicBool,
        fail_inserts: AtomicBool,
    }

    impl InMemoryResidentRepository {
        pub fn new() -> Self { Self::default() }

        pub fn set_fail_reads(&self, fail: bool) {
            self.fail_reads.store(fail, Ordering::SeqCst);
        }

        pub fn set_fail_inserts(&self, fail: bool) {
            self.fail_inserts.store(fail, Ordering::SeqCst);
        }

        pub fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    #[async_trait]
    impl ResidentRepository for InMemoryResidentRepository {
        async fn list_newest_first(&self) -> Result<Vec<Resident>, ServiceError> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(ServiceError::Db("server selection timeout".into()));
            }
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().rev().cloned().collect())
        }

        async fn insert(&self, new: NewResident) -> Result<Resident, ServiceError> {
            if self.fail_inserts.load(Ordering::SeqCst) {
                return Err(ServiceError::Db("write concern error".into()));
            }
            let resident = new.into_resident(ObjectId::new().to_hex());
            self.rows.lock().unwrap().push(resident.clone());
            Ok(resident)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    #[test]
    fn document_maps_to_resident_with_hex_id_and_default_photo() {
        let oid = ObjectId::new();
        let doc = ResidentDocument {
            id: Some(oid),
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            role: "Mentor".into(),
            profile_photo: None,
            linkedin: None,
            twitter: None,
            created_at: bson::DateTime::from_millis(1_700_000_000_123),
        };
        let r = Resident::from(doc);
        assert_eq!(r.id, oid.to_hex());
        assert_eq!(r.profile_photo, "");
        assert_eq!(r.created_at.timestamp_millis(), 1_700_000_000_123);
    }

    #[tokio::test]
    async fn mongo_repository_round_trip_when_available() {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return;
        }
        let Ok(uri) = std::env::var("MONGODB_URI") else {
            eprintln!("skip: MONGODB_URI not set");
            return;
        };
        let cfg = configs::DatabaseConfig { uri, ..configs::DatabaseConfig::default() };
        let db = models::db::connect_with_config(&cfg).await.expect("connect");
        let collection = format!("residents_test_{}", ObjectId::new().to_hex());
        let repo = MongoResidentRepository::new(&db, &collection);

        let first = super::super::domain::ResidentInput {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            role: Some("Resident".into()),
            ..Default::default()
        };
        let second = super::super::domain::ResidentInput { first_name: Some("Grace".into()), ..first.clone() };
        let a = repo.insert(first.validate().unwrap().into_new_resident(String::new())).await.unwrap();
        let b = repo.insert(second.validate().unwrap().into_new_resident(String::new())).await.unwrap();

        let listed = repo.list_newest_first().await.unwrap();
        assert_eq!(listed, vec![b, a]);

        db.collection::<ResidentDocument>(&collection).drop().await.expect("drop test collection");
    }
}
