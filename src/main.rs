//! # Restaurant Platform Server
//!
//! Servidor web de reservas de restaurantes construido con Rust, Actix Web y MongoDB.
//!
//! ## Configuración
//!
//! El servidor se configura mediante variables de entorno (archivo `.env`):
//!
//! ```env
//! # Base de datos MongoDB (o STORE_BACKEND=memory para probar sin base de datos)
//! MONGODB_URI=mongodb://localhost:27017
//! MONGODB_DATABASE=restaurant_platform
//! DEFAULT_RESTAURANT_ID=
//!
//! # Servicio de IA (opcional; sin clave el endpoint responde 501)
//! OPENAI_API_KEY=
//! OPENAI_MODEL=gpt-4o-mini
//!
//! # Servidor
//! BIND_ADDRESS=0.0.0.0:8080
//!
//! # Logging
//! RUST_LOG=debug,mongodb=info
//! ```

use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;

use restaurant_platform::ai::{OpenAiSummarizer, Summarizer};
use restaurant_platform::api::{self, AppState};
use restaurant_platform::config::{AppConfig, StoreBackend};
use restaurant_platform::db::{InMemoryStore, MongoRepo, ReservationStore};

/// Función principal que inicia el servidor web
///
/// 1. Carga variables de entorno desde `.env`
/// 2. Configura el sistema de logging con tracing
/// 3. Conecta el store (MongoDB con índices, o memoria)
/// 4. Prepara el cliente de IA si hay clave
/// 5. Inicia el servidor HTTP en `BIND_ADDRESS`
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    // Configurar sistema de logging con tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("restaurant_platform=debug".parse().unwrap())
                .add_directive("mongodb=info".parse().unwrap()),
        )
        .init();

    let config = AppConfig::from_env();
    tracing::info!(backend = ?config.store_backend, "Iniciando Restaurant Platform Server...");

    let store: Arc<dyn ReservationStore> = match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("Usando store en memoria: los datos se pierden al reiniciar");
            Arc::new(InMemoryStore::new())
        }
        StoreBackend::MongoDb => match MongoRepo::init(&config).await {
            Ok(repo) => {
                // Intentar crear índices para optimizar consultas
                if let Err(e) = repo.create_indexes().await {
                    tracing::warn!("Advertencia creando índices: {}", e);
                    // No es un error fatal, continuamos sin índices
                }
                Arc::new(repo)
            }
            Err(e) => {
                tracing::error!("Error conectando a MongoDB: {}", e);
                return Err(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("Error de MongoDB: {}", e),
                ));
            }
        },
    };

    let summarizer: Option<Arc<dyn Summarizer>> = match OpenAiSummarizer::from_config(&config) {
        Ok(Some(client)) => Some(Arc::new(client)),
        Ok(None) => {
            tracing::warn!("OPENAI_API_KEY no definida: resumen con IA deshabilitado");
            None
        }
        Err(e) => {
            tracing::error!("Error creando cliente de IA: {}", e);
            None
        }
    };

    let bind_address = config.bind_address.clone();
    let state = web::Data::new(AppState::new(store, summarizer, config));

    tracing::info!("Servidor iniciando en {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(api::init_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}
