//! Store en memoria
//!
//! Sustituye a MongoDB en los tests y cuando se arranca con
//! `STORE_BACKEND=memory` para probar el servidor sin base de datos.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tokio::sync::RwLock;

use super::models::{NewReservation, Reservation, ReservationChanges, ReservationFilter, UpdateOutcome};
use super::mongodb::EXPECTED_COLLECTIONS;
use super::store::{sort_by_schedule, ReservationStore, StoreError, StoreResult};

#[derive(Debug)]
pub struct InMemoryStore {
    rows: RwLock<Vec<Reservation>>,
    collections: HashSet<String>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::with_collections(&EXPECTED_COLLECTIONS)
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store que solo "conoce" las colecciones indicadas
    pub fn with_collections(collections: &[&str]) -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            collections: collections.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl ReservationStore for InMemoryStore {
    async fn list(&self, filter: &ReservationFilter) -> StoreResult<Vec<Reservation>> {
        let mut rows: Vec<Reservation> = self
            .rows
            .read()
            .await
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        sort_by_schedule(&mut rows);
        Ok(rows)
    }

    async fn insert(&self, reservation: NewReservation) -> StoreResult<Reservation> {
        let row = reservation.into_reservation(Utc::now());
        self.rows.write().await.push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        id: &str,
        changes: &ReservationChanges,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> StoreResult<UpdateOutcome> {
        let mut rows = self.rows.write().await;
        let Some(row) = rows.iter_mut().find(|r| r.id == id) else {
            return Ok(UpdateOutcome::NotFound);
        };

        if let Some(expected) = expected_updated_at {
            if row.updated_at != expected {
                return Ok(UpdateOutcome::Stale {
                    current: row.updated_at,
                });
            }
        }

        changes.apply(row, Utc::now());
        Ok(UpdateOutcome::Updated(row.clone()))
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok(rows.len() != before)
    }

    async fn check_collection(&self, collection: &str) -> StoreResult<()> {
        if self.collections.contains(collection) {
            Ok(())
        } else {
            Err(StoreError::MissingRelation(collection.to_string()))
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
