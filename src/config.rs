//! # Configuración
//!
//! Lectura de variables de entorno (previamente cargadas desde `.env` con
//! `dotenvy`) hacia un [`AppConfig`] inmutable que se comparte entre workers.

use std::collections::BTreeMap;
use std::env;

/// Variables cuya presencia se informa en el endpoint de salud.
pub const REPORTED_ENV_VARS: [&str; 4] = [
    "MONGODB_URI",
    "MONGODB_DATABASE",
    "OPENAI_API_KEY",
    "DEFAULT_RESTAURANT_ID",
];

/// Backend de persistencia seleccionado con `STORE_BACKEND`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    MongoDb,
    Memory,
}

impl StoreBackend {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "mock" => StoreBackend::Memory,
            _ => StoreBackend::MongoDb,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub store_backend: StoreBackend,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    pub default_restaurant_id: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    env_presence: BTreeMap<String, bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            store_backend: StoreBackend::MongoDb,
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            mongodb_database: "restaurant_platform".to_string(),
            default_restaurant_id: None,
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            env_presence: REPORTED_ENV_VARS
                .iter()
                .map(|name| (name.to_string(), false))
                .collect(),
        }
    }
}

impl AppConfig {
    /// Construye la configuración a partir del entorno del proceso
    ///
    /// Todas las variables tienen valor por defecto salvo los secretos, que
    /// quedan en `None` cuando faltan o están vacíos.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Igual que [`AppConfig::from_env`] pero con una fuente de variables
    /// arbitraria.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let env_presence = REPORTED_ENV_VARS
            .iter()
            .map(|name| (name.to_string(), get(name).is_some()))
            .collect();

        Self {
            bind_address: get("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            store_backend: get("STORE_BACKEND")
                .map(|v| StoreBackend::parse(&v))
                .unwrap_or(defaults.store_backend),
            mongodb_uri: get("MONGODB_URI").unwrap_or(defaults.mongodb_uri),
            mongodb_database: get("MONGODB_DATABASE").unwrap_or(defaults.mongodb_database),
            default_restaurant_id: get("DEFAULT_RESTAURANT_ID"),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.openai_base_url),
            openai_model: get("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            env_presence,
        }
    }

    /// Fija el restaurante asignado a reservas creadas sin `restaurant_id`
    pub fn with_default_restaurant(mut self, restaurant_id: impl Into<String>) -> Self {
        self.default_restaurant_id = Some(restaurant_id.into());
        self.env_presence.insert("DEFAULT_RESTAURANT_ID".to_string(), true);
        self
    }

    /// Presencia (nunca el valor) de cada variable informada
    pub fn env_presence(&self) -> &BTreeMap<String, bool> {
        &self.env_presence
    }

    pub fn ai_ready(&self) -> bool {
        self.openai_api_key.is_some()
    }
}
