//! Validación de cuerpos de reserva
//!
//! Funciones puras: devuelven la lista de problemas encontrados, vacía cuando
//! el cuerpo es válido. No hacen I/O.

use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;

use super::reservation::{CreateReservation, UpdateReservation};
use crate::db::ReservationStatus;

/// Parsea `YYYY-MM-DD` y lo devuelve normalizado
pub fn normalize_date(value: &str) -> Option<String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .ok()
        .map(|date| date.format("%Y-%m-%d").to_string())
}

/// Parsea `HH:MM` o `HH:MM:SS` y lo devuelve como `HH:MM`
pub fn normalize_time(value: &str) -> Option<String> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
        .map(|time| time.format("%H:%M").to_string())
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Número de comensales si el valor JSON es un entero válido
///
/// Cadenas (`"4"`) y decimales (`4.5`) no se aceptan.
pub fn party_size_value(value: &Value) -> Option<i32> {
    value
        .as_i64()
        .and_then(|size| i32::try_from(size).ok())
        .filter(|size| *size >= 1)
}

fn check_party_size(value: &Value, errors: &mut Vec<String>) {
    if party_size_value(value).is_some() {
        return;
    }
    let too_large = match value.as_i64() {
        Some(size) => size > i64::from(i32::MAX),
        None => value.is_u64(),
    };
    if too_large {
        errors.push("party_size fuera de rango".to_string());
    } else {
        errors.push("party_size debe ser un entero mayor o igual a 1".to_string());
    }
}

fn check_date(date: &str, errors: &mut Vec<String>) {
    if normalize_date(date).is_none() {
        errors.push("reservation_date inválida, use YYYY-MM-DD".to_string());
    }
}

fn check_time(time: &str, errors: &mut Vec<String>) {
    if normalize_time(time).is_none() {
        errors.push("reservation_time inválida, use HH:MM".to_string());
    }
}

fn check_status(status: &str, errors: &mut Vec<String>) {
    if status.parse::<ReservationStatus>().is_err() {
        errors.push(format!("status inválido: '{}'", status));
    }
}

/// Campos requeridos o inválidos de una reserva nueva
pub fn validate_new_reservation(body: &CreateReservation) -> Vec<String> {
    let mut errors = Vec::new();

    if is_blank(&body.customer_name) {
        errors.push("customer_name es requerido".to_string());
    }
    if is_blank(&body.customer_phone) {
        errors.push("customer_phone es requerido".to_string());
    }
    match &body.party_size {
        Some(party_size) => check_party_size(party_size, &mut errors),
        None => errors.push("party_size es requerido".to_string()),
    }
    match body.reservation_date.as_deref() {
        Some(date) if !date.trim().is_empty() => check_date(date, &mut errors),
        _ => errors.push("reservation_date es requerido".to_string()),
    }
    match body.reservation_time.as_deref() {
        Some(time) if !time.trim().is_empty() => check_time(time, &mut errors),
        _ => errors.push("reservation_time es requerido".to_string()),
    }
    if let Some(status) = &body.status {
        check_status(status, &mut errors);
    }

    errors
}

/// Mismas reglas, aplicadas solo a los campos presentes en la actualización
pub fn validate_update(body: &UpdateReservation) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(party_size) = &body.party_size {
        check_party_size(party_size, &mut errors);
    }
    if let Some(date) = &body.reservation_date {
        check_date(date, &mut errors);
    }
    if let Some(time) = &body.reservation_time {
        check_time(time, &mut errors);
    }
    if let Some(status) = &body.status {
        check_status(status, &mut errors);
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_body() -> CreateReservation {
        CreateReservation {
            customer_name: Some("王小姐".to_string()),
            customer_phone: Some("0912345678".to_string()),
            party_size: Some(json!(4)),
            reservation_date: Some("2025-08-12".to_string()),
            reservation_time: Some("19:00".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn complete_body_is_valid() {
        assert!(validate_new_reservation(&valid_body()).is_empty());
    }

    #[test]
    fn empty_body_reports_every_required_field() {
        let errors = validate_new_reservation(&CreateReservation::default());
        assert_eq!(errors.len(), 5);
        for field in [
            "customer_name",
            "customer_phone",
            "party_size",
            "reservation_date",
            "reservation_time",
        ] {
            assert!(errors.iter().any(|e| e.starts_with(field)), "missing {}", field);
        }
    }

    #[test]
    fn blank_name_and_zero_party_size_are_invalid() {
        let body = CreateReservation {
            customer_name: Some("   ".to_string()),
            party_size: Some(json!(0)),
            ..valid_body()
        };
        let errors = validate_new_reservation(&body);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn party_size_must_be_a_json_integer() {
        for value in [json!("4"), json!(4.5), json!(true)] {
            let body = CreateReservation {
                party_size: Some(value.clone()),
                ..valid_body()
            };
            assert_eq!(
                validate_new_reservation(&body),
                vec!["party_size debe ser un entero mayor o igual a 1".to_string()],
                "value {}",
                value
            );
        }

        let huge = CreateReservation {
            party_size: Some(json!(i64::from(i32::MAX) + 1)),
            ..valid_body()
        };
        assert_eq!(validate_new_reservation(&huge), vec!["party_size fuera de rango".to_string()]);
        assert_eq!(party_size_value(&json!(12)), Some(12));
    }

    #[test]
    fn malformed_date_time_and_status() {
        let body = CreateReservation {
            reservation_date: Some("12/08/2025".to_string()),
            reservation_time: Some("7pm".to_string()),
            status: Some("done".to_string()),
            ..valid_body()
        };
        let errors = validate_new_reservation(&body);
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn time_accepts_seconds_and_normalizes() {
        assert_eq!(normalize_time("19:00:00").as_deref(), Some("19:00"));
        assert_eq!(normalize_time(" 09:05 ").as_deref(), Some("09:05"));
        assert_eq!(normalize_time("25:00"), None);
        assert_eq!(normalize_date("2025-02-30"), None);
    }

    #[test]
    fn update_only_checks_present_fields() {
        assert!(validate_update(&UpdateReservation::default()).is_empty());

        let body = UpdateReservation {
            party_size: Some(json!(-1)),
            status: Some("no_show".to_string()),
            ..Default::default()
        };
        assert_eq!(validate_update(&body).len(), 1);
    }
}
