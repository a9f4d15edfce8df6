//! Contrato de persistencia compartido por MongoDB y el store en memoria.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::models::{NewReservation, Reservation, ReservationChanges, ReservationFilter, UpdateOutcome};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Error serializando documento: {0}")]
    Serialization(#[from] mongodb::bson::ser::Error),

    /// La colección/relación consultada no existe
    #[error("relation \"{0}\" does not exist")]
    MissingRelation(String),

    /// Backend sin respuesta (tiempo de espera, conexión rechazada)
    #[error("{0}")]
    Unavailable(String),
}

/// Acceso a reservas y a las comprobaciones de salud del almacenamiento
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Devuelve las filas que cumplen el filtro, por fecha y hora ascendentes
    async fn list(&self, filter: &ReservationFilter) -> StoreResult<Vec<Reservation>>;

    async fn insert(&self, reservation: NewReservation) -> StoreResult<Reservation>;

    /// Aplica `changes` y sella `updated_at`
    ///
    /// Con `expected_updated_at` la escritura solo ocurre si la fila sigue
    /// teniendo ese `updated_at`.
    async fn update(
        &self,
        id: &str,
        changes: &ReservationChanges,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> StoreResult<UpdateOutcome>;

    /// Devuelve si existía una fila con ese id
    async fn delete(&self, id: &str) -> StoreResult<bool>;

    /// Consulta acotada sobre una colección; `MissingRelation` si no existe
    async fn check_collection(&self, collection: &str) -> StoreResult<()>;

    fn backend_name(&self) -> &'static str;
}

/// Orden de listado: fecha y después hora
pub fn sort_by_schedule(rows: &mut [Reservation]) {
    rows.sort_by(|a, b| {
        a.reservation_date
            .cmp(&b.reservation_date)
            .then_with(|| a.reservation_time.cmp(&b.reservation_time))
    });
}
