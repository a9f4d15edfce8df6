use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::{doc, to_bson, Document};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection, Database};

use super::models::{NewReservation, Reservation, ReservationChanges, ReservationFilter, UpdateOutcome};
use super::store::{ReservationStore, StoreError, StoreResult};
use crate::config::AppConfig;

/// Colecciones que el endpoint de salud espera encontrar
pub const EXPECTED_COLLECTIONS: [&str; 3] = ["reservations", "restaurants", "restaurant_tables"];

#[derive(Debug, Clone)]
pub struct MongoRepo {
    pub client: Client,
    pub database: Database,
}

impl MongoRepo {
    pub async fn init(config: &AppConfig) -> StoreResult<MongoRepo> {
        let client = Client::with_uri_str(&config.mongodb_uri).await?;
        let database = client.database(&config.mongodb_database);

        // Test connection
        database.run_command(doc! {"ping": 1}).await?;

        tracing::info!(
            database = %config.mongodb_database,
            "Conexión a MongoDB establecida exitosamente"
        );

        Ok(MongoRepo { client, database })
    }

    pub fn reservations(&self) -> Collection<Reservation> {
        self.database.collection("reservations")
    }

    // Método para crear índices si es necesario
    pub async fn create_indexes(&self) -> StoreResult<()> {
        use mongodb::IndexModel;

        let reservation_indexes = vec![
            IndexModel::builder()
                .keys(doc! { "reservation_date": 1, "reservation_time": 1 })
                .build(),
            IndexModel::builder().keys(doc! { "status": 1 }).build(),
            IndexModel::builder().keys(doc! { "restaurant_id": 1 }).build(),
        ];

        self.reservations().create_indexes(reservation_indexes).await?;

        tracing::info!("Índices MongoDB creados exitosamente");
        Ok(())
    }

    fn filter_document(filter: &ReservationFilter) -> Document {
        let mut query = Document::new();
        if let Some(date) = &filter.date {
            query.insert("reservation_date", date);
        }
        if let Some(status) = filter.status {
            query.insert("status", status.as_str());
        }
        if let Some(restaurant_id) = &filter.restaurant_id {
            query.insert("restaurant_id", restaurant_id);
        }
        query
    }

    fn set_document(changes: &ReservationChanges, now: DateTime<Utc>) -> StoreResult<Document> {
        let mut set = doc! { "updated_at": to_bson(&now)? };
        if let Some(status) = changes.status {
            set.insert("status", status.as_str());
        }
        if let Some(special_requests) = &changes.special_requests {
            set.insert("special_requests", special_requests);
        }
        if let Some(party_size) = changes.party_size {
            set.insert("party_size", party_size);
        }
        if let Some(time) = &changes.reservation_time {
            set.insert("reservation_time", time);
        }
        if let Some(date) = &changes.reservation_date {
            set.insert("reservation_date", date);
        }
        Ok(set)
    }
}

#[async_trait]
impl ReservationStore for MongoRepo {
    async fn list(&self, filter: &ReservationFilter) -> StoreResult<Vec<Reservation>> {
        let mut cursor = self
            .reservations()
            .find(Self::filter_document(filter))
            .sort(doc! { "reservation_date": 1, "reservation_time": 1 })
            .await?;

        let mut results = Vec::new();
        while cursor.advance().await? {
            results.push(cursor.deserialize_current()?);
        }

        tracing::debug!(count = results.len(), "Reservas obtenidas");
        Ok(results)
    }

    async fn insert(&self, reservation: NewReservation) -> StoreResult<Reservation> {
        let row = reservation.into_reservation(Utc::now());
        self.reservations().insert_one(&row).await?;
        Ok(row)
    }

    async fn update(
        &self,
        id: &str,
        changes: &ReservationChanges,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> StoreResult<UpdateOutcome> {
        let mut filter = doc! { "_id": id };
        if let Some(expected) = expected_updated_at {
            filter.insert("updated_at", to_bson(&expected)?);
        }

        let set = Self::set_document(changes, Utc::now())?;
        let updated = self
            .reservations()
            .find_one_and_update(filter, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?;

        if let Some(row) = updated {
            return Ok(UpdateOutcome::Updated(row));
        }

        // Sin coincidencia: distinguir id inexistente de timestamp obsoleto
        match self.reservations().find_one(doc! { "_id": id }).await? {
            Some(current) if expected_updated_at.is_some() => Ok(UpdateOutcome::Stale {
                current: current.updated_at,
            }),
            _ => Ok(UpdateOutcome::NotFound),
        }
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let result = self.reservations().delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn check_collection(&self, collection: &str) -> StoreResult<()> {
        let names = self
            .database
            .list_collection_names()
            .filter(doc! { "name": collection })
            .await?;

        if names.iter().any(|name| name == collection) {
            Ok(())
        } else {
            Err(StoreError::MissingRelation(collection.to_string()))
        }
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::ReservationStatus;

    #[test]
    fn filter_document_only_contains_given_fields() {
        let empty = MongoRepo::filter_document(&ReservationFilter::default());
        assert!(empty.is_empty());

        let query = MongoRepo::filter_document(&ReservationFilter {
            date: Some("2025-08-12".to_string()),
            status: Some(ReservationStatus::NoShow),
            restaurant_id: None,
        });
        assert_eq!(query.get_str("reservation_date").unwrap(), "2025-08-12");
        assert_eq!(query.get_str("status").unwrap(), "no_show");
        assert!(!query.contains_key("restaurant_id"));
    }

    #[test]
    fn set_document_always_stamps_updated_at() {
        let now = Utc::now();
        let set = MongoRepo::set_document(
            &ReservationChanges {
                special_requests: Some("window seat".to_string()),
                ..Default::default()
            },
            now,
        )
        .unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.get("updated_at"), Some(&to_bson(&now).unwrap()));
        assert_eq!(set.get_str("special_requests").unwrap(), "window seat");
    }
}
