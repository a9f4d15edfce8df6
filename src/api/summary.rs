//! # API de resumen con IA
//!
//! Convierte notas de reserva en texto libre en un JSON estructurado de
//! mejor esfuerzo usando el [`Summarizer`](crate::ai::Summarizer) configurado.

use actix_web::{post, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use super::{AppError, AppResult, AppState};
use crate::ai::{parse_completion, SummaryParse};

/// Longitud mínima (en caracteres, tras recortar) del texto a resumir
pub const MIN_TEXT_CHARS: usize = 5;

pub const DEFAULT_LANGUAGE: &str = "zh-TW";

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub text: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub ok: bool,
    pub raw: String,
    pub parsed: SummaryParse,
}

/// Resume texto libre de una reserva
///
/// # Respuesta
/// ```json
/// {
///   "ok": true,
///   "raw": "{\"party_size\": 4}",
///   "parsed": { "status": "parsed", "value": { "party_size": 4 } }
/// }
/// ```
///
/// Si la salida del modelo no es JSON, `parsed` es
/// `{ "status": "unparsed", "value": "<texto>" }` y la respuesta sigue siendo `200`.
///
/// # Errores
/// - `400 Bad Request`: texto ausente o demasiado corto
/// - `500 Internal Server Error`: fallo del proveedor de IA
/// - `501 Not Implemented`: no hay clave de IA configurada
#[post("/api/ai/reservation-summary")]
async fn reservation_summary(
    state: web::Data<AppState>,
    data: web::Json<SummaryRequest>,
) -> AppResult<impl Responder> {
    let summarizer = state
        .summarizer
        .as_ref()
        .ok_or_else(|| AppError::AiNotConfigured("OPENAI_API_KEY no definida".to_string()))?;

    let body = data.into_inner();
    let text = body.text.as_deref().map(str::trim).unwrap_or_default();
    if text.chars().count() < MIN_TEXT_CHARS {
        return Err(AppError::BadRequest(format!(
            "text debe tener al menos {} caracteres",
            MIN_TEXT_CHARS
        )));
    }

    let language = body
        .language
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LANGUAGE);

    let raw = summarizer.summarize(text, language).await?;
    let parsed = parse_completion(&raw);

    tracing::info!(
        language = %language,
        chars = text.chars().count(),
        parsed = matches!(parsed, SummaryParse::Parsed(_)),
        "Resumen de reserva generado"
    );

    Ok(HttpResponse::Ok().json(SummaryResponse {
        ok: true,
        raw,
        parsed,
    }))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(reservation_summary);
}
