use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Estado de una reserva
///
/// No hay grafo de transiciones: cualquier estado puede sustituir a otro.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    #[default]
    Pending,
    Confirmed,
    Seated,
    Completed,
    Cancelled,
    NoShow,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 6] = [
        ReservationStatus::Pending,
        ReservationStatus::Confirmed,
        ReservationStatus::Seated,
        ReservationStatus::Completed,
        ReservationStatus::Cancelled,
        ReservationStatus::NoShow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Seated => "seated",
            ReservationStatus::Completed => "completed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::NoShow => "no_show",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "estado desconocido '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for ReservationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReservationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Canal de creación por defecto
pub const DEFAULT_CREATED_VIA: &str = "manual";

/// Reserva tal como se persiste y se devuelve al cliente
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Reservation {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub restaurant_id: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub party_size: i32,
    pub reservation_date: String,
    pub reservation_time: String,
    pub status: ReservationStatus,
    pub special_requests: Option<String>,
    pub created_via: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Datos ya validados para insertar; el store asigna id y timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct NewReservation {
    pub restaurant_id: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub party_size: i32,
    pub reservation_date: String,
    pub reservation_time: String,
    pub status: ReservationStatus,
    pub special_requests: Option<String>,
    pub created_via: String,
}

impl NewReservation {
    /// Materializa la fila con un id nuevo y ambos timestamps a `now`
    pub fn into_reservation(self, now: DateTime<Utc>) -> Reservation {
        Reservation {
            id: uuid::Uuid::new_v4().to_string(),
            restaurant_id: self.restaurant_id,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            customer_email: self.customer_email,
            party_size: self.party_size,
            reservation_date: self.reservation_date,
            reservation_time: self.reservation_time,
            status: self.status,
            special_requests: self.special_requests,
            created_via: self.created_via,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Conjunto de cambios permitidos en una actualización
///
/// Solo estos campos pueden modificarse; `updated_at` lo sella siempre el
/// store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservationChanges {
    pub status: Option<ReservationStatus>,
    pub special_requests: Option<String>,
    pub party_size: Option<i32>,
    pub reservation_time: Option<String>,
    pub reservation_date: Option<String>,
}

impl ReservationChanges {
    pub fn apply(&self, reservation: &mut Reservation, now: DateTime<Utc>) {
        if let Some(status) = self.status {
            reservation.status = status;
        }
        if let Some(special_requests) = &self.special_requests {
            reservation.special_requests = Some(special_requests.clone());
        }
        if let Some(party_size) = self.party_size {
            reservation.party_size = party_size;
        }
        if let Some(time) = &self.reservation_time {
            reservation.reservation_time = time.clone();
        }
        if let Some(date) = &self.reservation_date {
            reservation.reservation_date = date.clone();
        }
        reservation.updated_at = now;
    }
}

/// Filtros de igualdad para el listado
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservationFilter {
    pub date: Option<String>,
    pub status: Option<ReservationStatus>,
    pub restaurant_id: Option<String>,
}

impl ReservationFilter {
    pub fn matches(&self, reservation: &Reservation) -> bool {
        self.date
            .as_ref()
            .map_or(true, |date| &reservation.reservation_date == date)
            && self.status.map_or(true, |status| reservation.status == status)
            && self
                .restaurant_id
                .as_ref()
                .map_or(true, |id| reservation.restaurant_id.as_ref() == Some(id))
    }
}

/// Resultado de una actualización por id
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated(Reservation),
    NotFound,
    /// `updated_at` ya no coincide con el esperado
    Stale { current: DateTime<Utc> },
}
