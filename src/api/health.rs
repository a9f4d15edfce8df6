//! # API de salud
//!
//! Diagnóstico sin efectos secundarios: existencia de las colecciones
//! esperadas, disponibilidad del servicio de IA y presencia (nunca el valor)
//! de las variables de entorno relevantes.

use actix_web::{get, web, HttpResponse, Responder};
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;

use super::AppState;
use crate::db::{StoreError, EXPECTED_COLLECTIONS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Ok,
    Degraded,
}

/// Resultado de comprobar una colección
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum CollectionCheck {
    Ok,
    Missing,
    Error(String),
}

#[derive(Debug, Serialize)]
pub struct DbHealth {
    pub backend: &'static str,
    pub checks: BTreeMap<String, CollectionCheck>,
    pub missing: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AiHealth {
    pub ready: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: OverallStatus,
    pub db: DbHealth,
    pub ai: AiHealth,
    pub env: BTreeMap<String, bool>,
}

/// Comprueba todas las colecciones en paralelo
pub async fn check_collections(state: &AppState, collections: &[&str]) -> DbHealth {
    let lookups = collections.iter().map(|name| async move {
        let check = match state.store.check_collection(name).await {
            Ok(()) => CollectionCheck::Ok,
            Err(StoreError::MissingRelation(_)) => CollectionCheck::Missing,
            Err(e) => {
                tracing::warn!(collection = %name, error = %e, "Health check failed");
                CollectionCheck::Error(e.to_string())
            }
        };
        (name.to_string(), check)
    });

    let checks: BTreeMap<String, CollectionCheck> = join_all(lookups).await.into_iter().collect();
    let missing = checks
        .iter()
        .filter(|(_, check)| **check == CollectionCheck::Missing)
        .map(|(name, _)| name.clone())
        .collect();

    DbHealth {
        backend: state.store.backend_name(),
        checks,
        missing,
    }
}

pub async fn health_report(state: &AppState) -> HealthReport {
    let db = check_collections(state, &EXPECTED_COLLECTIONS).await;

    let ai = if state.summarizer.is_some() {
        AiHealth {
            ready: true,
            message: format!("Modelo configurado: {}", state.config.openai_model),
        }
    } else {
        AiHealth {
            ready: false,
            message: "OPENAI_API_KEY no definida".to_string(),
        }
    };

    let status = if db.checks.values().all(|check| *check == CollectionCheck::Ok) {
        OverallStatus::Ok
    } else {
        OverallStatus::Degraded
    };

    HealthReport {
        status,
        db,
        ai,
        env: state.config.env_presence().clone(),
    }
}

/// Estado del sistema
///
/// # Respuesta
/// ```json
/// {
///   "status": "ok",
///   "db": { "backend": "mongodb", "checks": { "reservations": { "state": "ok" } }, "missing": [] },
///   "ai": { "ready": false, "message": "OPENAI_API_KEY no definida" },
///   "env": { "MONGODB_URI": true, "OPENAI_API_KEY": false }
/// }
/// ```
#[get("/api/system/health")]
async fn system_health(state: web::Data<AppState>) -> impl Responder {
    let report = health_report(state.get_ref()).await;
    if report.status == OverallStatus::Degraded {
        tracing::warn!(missing = ?report.db.missing, "Sistema degradado");
    }
    HttpResponse::Ok().json(report)
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(system_health);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AiError, Summarizer};
    use crate::api::init_routes;
    use crate::config::AppConfig;
    use crate::db::{
        InMemoryStore, NewReservation, Reservation, ReservationChanges, ReservationFilter,
        ReservationStore, StoreResult, UpdateOutcome,
    };
    use actix_web::test::{self, TestRequest};
    use chrono::{DateTime, Utc};
    use actix_web::App;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Arc;

    struct NeverCalled;

    #[async_trait]
    impl Summarizer for NeverCalled {
        async fn summarize(&self, _text: &str, _language: &str) -> Result<String, AiError> {
            Err(AiError::EmptyCompletion)
        }
    }

    /// Store cuyo backend no responde
    struct UnreachableStore;

    impl UnreachableStore {
        fn timeout<T>() -> StoreResult<T> {
            Err(StoreError::Unavailable("timeout".to_string()))
        }
    }

    #[async_trait]
    impl ReservationStore for UnreachableStore {
        async fn list(&self, _filter: &ReservationFilter) -> StoreResult<Vec<Reservation>> {
            Self::timeout()
        }

        async fn insert(&self, _reservation: NewReservation) -> StoreResult<Reservation> {
            Self::timeout()
        }

        async fn update(
            &self,
            _id: &str,
            _changes: &ReservationChanges,
            _expected_updated_at: Option<DateTime<Utc>>,
        ) -> StoreResult<UpdateOutcome> {
            Self::timeout()
        }

        async fn delete(&self, _id: &str) -> StoreResult<bool> {
            Self::timeout()
        }

        async fn check_collection(&self, _collection: &str) -> StoreResult<()> {
            Self::timeout()
        }

        fn backend_name(&self) -> &'static str {
            "unreachable"
        }
    }

    async fn get_health(state: AppState) -> Value {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(init_routes),
        )
        .await;
        let resp =
            test::call_service(&app, TestRequest::get().uri("/api/system/health").to_request())
                .await;
        assert!(resp.status().is_success());
        test::read_body_json(resp).await
    }

    #[actix_web::test]
    async fn all_collections_present_is_ok() {
        let state = AppState::new(
            Arc::new(InMemoryStore::new()),
            Some(Arc::new(NeverCalled)),
            AppConfig::default(),
        );
        let body = get_health(state).await;

        assert_eq!(body["status"], "ok");
        assert_eq!(body["db"]["missing"], json!([]));
        assert_eq!(body["db"]["checks"]["reservations"]["state"], "ok");
        assert_eq!(body["ai"]["ready"], true);
    }

    #[actix_web::test]
    async fn missing_collection_degrades() {
        let state = AppState::new(
            Arc::new(InMemoryStore::with_collections(&["reservations"])),
            None,
            AppConfig::default(),
        );
        let body = get_health(state).await;

        assert_eq!(body["status"], "degraded");
        assert_eq!(body["db"]["missing"], json!(["restaurant_tables", "restaurants"]));
        assert_eq!(body["db"]["checks"]["restaurants"]["state"], "missing");
        assert_eq!(body["ai"]["ready"], false);
    }

    #[actix_web::test]
    async fn store_error_is_reported_per_collection_and_degrades() {
        let state = AppState::new(Arc::new(UnreachableStore), None, AppConfig::default());
        let body = get_health(state).await;

        assert_eq!(body["status"], "degraded");
        assert_eq!(body["db"]["backend"], "unreachable");
        assert_eq!(body["db"]["missing"], json!([]));
        for name in EXPECTED_COLLECTIONS {
            assert_eq!(
                body["db"]["checks"][name],
                json!({ "state": "error", "message": "timeout" })
            );
        }
    }

    #[actix_web::test]
    async fn env_reports_presence_not_values() {
        let config = AppConfig::from_lookup(|name| match name {
            "MONGODB_URI" => Some("mongodb://user:secret@db:27017".to_string()),
            _ => None,
        });
        let state = AppState::new(Arc::new(InMemoryStore::new()), None, config);
        let body = get_health(state).await;

        assert_eq!(body["env"]["MONGODB_URI"], true);
        assert_eq!(body["env"]["OPENAI_API_KEY"], false);
        assert!(!body.to_string().contains("secret"));
    }
}
