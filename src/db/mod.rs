// src/db/mod.rs
pub mod memory;
pub mod models;
pub mod mongodb;
pub mod store;

pub use memory::InMemoryStore;
pub use models::{
    NewReservation, Reservation, ReservationChanges, ReservationFilter, ReservationStatus,
    UpdateOutcome,
};
pub use self::mongodb::{MongoRepo, EXPECTED_COLLECTIONS};
pub use store::{ReservationStore, StoreError, StoreResult};
