//! # Restaurant Platform
//!
//! Backend HTTP de la plataforma de restaurantes: CRUD de reservas sobre
//! MongoDB, diagnóstico del sistema y resumen de reservas con IA.
//!
//! ```text
//! Frontend (React)
//!     ↓ HTTP/JSON
//! API REST (Actix Web)
//!     ↓ ReservationStore            ↓ Summarizer
//! MongoDB / store en memoria     API de completions (OpenAI)
//! ```

pub mod ai;
pub mod api;
pub mod config;
pub mod db;
