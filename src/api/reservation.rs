//! # API de Reservas
//!
//! CRUD sobre `/api/reservations/crud`; cada verbo HTTP se traduce en una
//! única operación del store:
//!
//! - `GET` lista con filtros opcionales de fecha, estado y restaurante
//! - `POST` valida y crea
//! - `PATCH` actualiza los campos permitidos de una reserva
//! - `DELETE` elimina por id
//!
//! No hay reintentos ni idempotencia: dos `POST` idénticos crean dos filas.

use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::middleware::ErrorLogExt;
use super::validation::{
    normalize_date, normalize_time, party_size_value, validate_new_reservation, validate_update,
};
use super::{AppError, AppResult, AppState, ResultExt};
use crate::db::models::DEFAULT_CREATED_VIA;
use crate::db::{
    NewReservation, Reservation, ReservationChanges, ReservationFilter, ReservationStatus,
    UpdateOutcome,
};

/// Cuerpo de `POST`; todo opcional para poder informar de cada campo ausente
#[derive(Debug, Default, Deserialize)]
pub struct CreateReservation {
    pub restaurant_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    /// Se acepta cualquier JSON para que un tipo incorrecto llegue a la validación
    pub party_size: Option<Value>,
    pub reservation_date: Option<String>,
    pub reservation_time: Option<String>,
    pub status: Option<String>,
    pub special_requests: Option<String>,
    pub created_via: Option<String>,
}

/// Cuerpo de `PATCH`; los campos fuera de esta lista se ignoran
#[derive(Debug, Default, Deserialize)]
pub struct UpdateReservation {
    pub id: Option<String>,
    pub status: Option<String>,
    pub special_requests: Option<String>,
    pub party_size: Option<Value>,
    pub reservation_time: Option<String>,
    pub reservation_date: Option<String>,
    /// Si se envía, la escritura solo ocurre si la fila conserva este `updated_at`
    pub expected_updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ReservationQuery {
    pub date: Option<String>,
    pub status: Option<String>,
    pub restaurant_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub id: Option<String>,
}

/// Reserva tal como se envía al frontend
#[derive(Debug, Serialize)]
pub struct ReservationResponse {
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

impl From<Reservation> for ReservationResponse {
    fn from(reservation: Reservation) -> Self {
        ReservationResponse {
            id: reservation.id,
            restaurant_id: reservation.restaurant_id,
            customer_name: reservation.customer_name,
            customer_phone: reservation.customer_phone,
            customer_email: reservation.customer_email,
            party_size: reservation.party_size,
            reservation_date: reservation.reservation_date,
            reservation_time: reservation.reservation_time,
            status: reservation.status,
            special_requests: reservation.special_requests,
            created_via: reservation.created_via,
            created_at: reservation.created_at,
            updated_at: reservation.updated_at,
        }
    }
}

#[derive(Serialize)]
struct DataResponse<T> {
    data: T,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parsea un status ya validado
fn parse_status(status: Option<&str>) -> AppResult<Option<ReservationStatus>> {
    status
        .map(|s| {
            s.parse::<ReservationStatus>()
                .map_err(|e| AppError::Validation(vec![e.to_string()]))
        })
        .transpose()
}

impl CreateReservation {
    /// Valida el cuerpo y aplica los valores por defecto del servidor
    pub fn into_new_reservation(
        self,
        default_restaurant_id: Option<&str>,
    ) -> AppResult<NewReservation> {
        let errors = validate_new_reservation(&self);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let invalid = |field: &str| AppError::Validation(vec![format!("{} inválido", field)]);

        let status = parse_status(self.status.as_deref())?.unwrap_or_default();
        let party_size = self
            .party_size
            .as_ref()
            .and_then(party_size_value)
            .ok_or_else(|| invalid("party_size"))?;
        let reservation_date = self
            .reservation_date
            .as_deref()
            .and_then(normalize_date)
            .ok_or_else(|| invalid("reservation_date"))?;
        let reservation_time = self
            .reservation_time
            .as_deref()
            .and_then(normalize_time)
            .ok_or_else(|| invalid("reservation_time"))?;

        Ok(NewReservation {
            restaurant_id: non_blank(self.restaurant_id)
                .or_else(|| default_restaurant_id.map(str::to_string)),
            customer_name: non_blank(self.customer_name).ok_or_else(|| invalid("customer_name"))?,
            customer_phone: non_blank(self.customer_phone)
                .ok_or_else(|| invalid("customer_phone"))?,
            customer_email: non_blank(self.customer_email),
            party_size,
            reservation_date,
            reservation_time,
            status,
            special_requests: self.special_requests,
            created_via: non_blank(self.created_via)
                .unwrap_or_else(|| DEFAULT_CREATED_VIA.to_string()),
        })
    }
}

impl UpdateReservation {
    /// Copia solo los campos permitidos al conjunto de cambios
    pub fn changes(&self) -> AppResult<ReservationChanges> {
        let errors = validate_update(self);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        Ok(ReservationChanges {
            status: parse_status(self.status.as_deref())?,
            special_requests: self.special_requests.clone(),
            party_size: self.party_size.as_ref().and_then(party_size_value),
            reservation_time: self.reservation_time.as_deref().and_then(normalize_time),
            reservation_date: self.reservation_date.as_deref().and_then(normalize_date),
        })
    }
}

impl ReservationQuery {
    fn into_filter(self) -> AppResult<ReservationFilter> {
        // Misma normalización que al crear: `2025-8-12` filtra por `2025-08-12`
        let date = non_blank(self.date)
            .map(|date| {
                normalize_date(&date).ok_or_else(|| {
                    AppError::Validation(vec![format!("date inválida: '{}', use YYYY-MM-DD", date)])
                })
            })
            .transpose()?;

        Ok(ReservationFilter {
            status: parse_status(non_blank(self.status).as_deref())?,
            date,
            restaurant_id: non_blank(self.restaurant_id),
        })
    }
}

/// Lista reservas ordenadas por fecha y hora ascendentes
///
/// # Respuesta
/// ```json
/// { "data": [ { "id": "...", "customer_name": "王小姐", "status": "pending", ... } ] }
/// ```
///
/// # Errores
/// - `400 Bad Request`: `status` desconocido o `date` que no es una fecha
/// - `500 Internal Server Error`: error del store
#[get("/api/reservations/crud")]
async fn list_reservations(
    state: web::Data<AppState>,
    query: web::Query<ReservationQuery>,
) -> AppResult<impl Responder> {
    let filter = query.into_inner().into_filter()?;

    let rows = state
        .store
        .list(&filter)
        .await
        .log_error_context("listing reservations")
        .map_err_store("list_reservations")?;

    let data: Vec<ReservationResponse> = rows.into_iter().map(ReservationResponse::from).collect();
    Ok(HttpResponse::Ok().json(DataResponse { data }))
}

/// Crea una reserva
///
/// Valores por defecto: `status = pending`, `created_via = manual` y
/// `restaurant_id = DEFAULT_RESTAURANT_ID`.
///
/// # Errores
/// - `400 Bad Request`: `{ "errors": [...] }` con cada campo inválido; no se inserta nada
/// - `500 Internal Server Error`: error del store
#[post("/api/reservations/crud")]
async fn create_reservation(
    state: web::Data<AppState>,
    data: web::Json<CreateReservation>,
) -> AppResult<impl Responder> {
    let new_reservation = data
        .into_inner()
        .into_new_reservation(state.config.default_restaurant_id.as_deref())?;

    let row = state
        .store
        .insert(new_reservation)
        .await
        .log_error_context("inserting reservation")
        .map_err_store("create_reservation")?;

    tracing::info!(
        id = %row.id,
        created_via = %row.created_via,
        date = %row.reservation_date,
        "Reserva creada"
    );

    Ok(HttpResponse::Ok().json(DataResponse {
        data: ReservationResponse::from(row),
    }))
}

/// Actualiza los campos permitidos de una reserva
///
/// Campos permitidos: `status`, `special_requests`, `party_size`,
/// `reservation_time`, `reservation_date`. `updated_at` se renueva siempre.
///
/// # Errores
/// - `400 Bad Request`: falta `id` o algún valor es inválido
/// - `404 Not Found`: no existe una reserva con ese id
/// - `409 Conflict`: `expected_updated_at` no coincide
/// - `500 Internal Server Error`: error del store
#[patch("/api/reservations/crud")]
async fn update_reservation(
    state: web::Data<AppState>,
    data: web::Json<UpdateReservation>,
) -> AppResult<impl Responder> {
    let body = data.into_inner();
    let id = non_blank(body.id.clone())
        .ok_or_else(|| AppError::BadRequest("id es requerido".to_string()))?;
    let changes = body.changes()?;

    let outcome = state
        .store
        .update(&id, &changes, body.expected_updated_at)
        .await
        .log_error_context("updating reservation")
        .map_err_store("update_reservation")?;

    match outcome {
        UpdateOutcome::Updated(row) => {
            tracing::info!(id = %row.id, status = %row.status, "Reserva actualizada");
            Ok(HttpResponse::Ok().json(DataResponse {
                data: ReservationResponse::from(row),
            }))
        }
        UpdateOutcome::NotFound => Err(AppError::not_found_id("Reserva", &id)),
        UpdateOutcome::Stale { current } => Err(AppError::Conflict(format!(
            "La reserva '{}' fue modificada el {}; recargue antes de actualizar",
            id,
            current.to_rfc3339()
        ))),
    }
}

/// Elimina una reserva por `?id=`
///
/// # Respuesta
/// ```json
/// { "success": true }
/// ```
#[delete("/api/reservations/crud")]
async fn delete_reservation(
    state: web::Data<AppState>,
    query: web::Query<DeleteQuery>,
) -> AppResult<impl Responder> {
    let id = non_blank(query.into_inner().id)
        .ok_or_else(|| AppError::BadRequest("id es requerido".to_string()))?;

    let existed = state
        .store
        .delete(&id)
        .await
        .log_error_context("deleting reservation")
        .map_err_store("delete_reservation")?;

    tracing::info!(id = %id, existed, "Reserva eliminada");

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

/// Configura las rutas relacionadas con reservas
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_reservations);
    cfg.service(create_reservation);
    cfg.service(update_reservation);
    cfg.service(delete_reservation);
}
