//! # Módulo API
//!
//! Este módulo contiene todas las rutas y controladores de la API REST.
//!
//! ## Módulos principales
//!
//! - [`reservation`] - CRUD de reservas
//! - [`health`] - Diagnóstico del sistema
//! - [`summary`] - Resumen de reservas con IA
//! - [`validation`] - Validación de cuerpos de reserva
//! - [`errors`] - Manejo de errores de la aplicación

pub mod errors;
pub mod health;
mod middleware;
pub mod reservation;
pub mod summary;
pub mod validation;

// Re-exportar tipos comunes para facilitar su uso
pub use errors::{AppError, AppResult, ErrorResponse, ResultExt};

use actix_web::{error, web};
use std::sync::Arc;

use crate::ai::Summarizer;
use crate::config::AppConfig;
use crate::db::ReservationStore;

/// Dependencias compartidas por todos los handlers
///
/// Se inyecta con `web::Data`; los tests lo construyen con un
/// [`InMemoryStore`](crate::db::InMemoryStore) y un `Summarizer` falso.
pub struct AppState {
    pub store: Arc<dyn ReservationStore>,
    /// `None` cuando no hay clave de IA configurada
    pub summarizer: Option<Arc<dyn Summarizer>>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ReservationStore>,
        summarizer: Option<Arc<dyn Summarizer>>,
        config: AppConfig,
    ) -> Self {
        Self {
            store,
            summarizer,
            config: Arc::new(config),
        }
    }
}

/// Errores de extracción JSON como `400 { "error": ... }`
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = format!("JSON inválido: {}", err);
        error::Error::from(AppError::BadRequest(message))
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let message = format!("Parámetros inválidos: {}", err);
        error::Error::from(AppError::BadRequest(message))
    })
}

/// Configura todas las rutas de la API
///
/// ## Rutas configuradas
///
/// - `/api/reservations/crud` - Ver [`reservation::routes`]
/// - `/api/system/health` - Ver [`health::routes`]
/// - `/api/ai/reservation-summary` - Ver [`summary::routes`]
///
/// # Ejemplo
///
/// ```no_run
/// use actix_web::{web, App};
/// use restaurant_platform::api;
///
/// let app = App::new()
///     .configure(api::init_routes);
/// ```
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config());
    cfg.app_data(query_config());
    reservation::routes(cfg);
    health::routes(cfg);
    summary::routes(cfg);
}
