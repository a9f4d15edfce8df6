//! Ciclo de vida completo de una reserva a través de la API pública.

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{web, App};
use serde_json::{json, Value};
use std::sync::Arc;

use restaurant_platform::api::{init_routes, AppState};
use restaurant_platform::config::AppConfig;
use restaurant_platform::db::InMemoryStore;

const URI: &str = "/api/reservations/crud";

#[actix_web::test]
async fn create_confirm_list_and_delete() {
    let store = Arc::new(InMemoryStore::new());
    let state = AppState::new(store.clone(), None, AppConfig::default());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(init_routes),
    )
    .await;

    // Crear
    let req = TestRequest::post()
        .uri(URI)
        .set_json(json!({
            "customer_name": "王小姐",
            "customer_phone": "0912345678",
            "party_size": 4,
            "reservation_date": "2025-08-12",
            "reservation_time": "19:00"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["data"]["status"], "pending");
    let id = created["data"]["id"].as_str().unwrap().to_string();

    // Confirmar
    let req = TestRequest::patch()
        .uri(URI)
        .set_json(json!({ "id": id, "status": "confirmed" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Listar confirmadas
    let req = TestRequest::get()
        .uri(&format!("{}?status=confirmed&date=2025-08-12", URI))
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    let rows = listed["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], id.as_str());

    // Eliminar
    let req = TestRequest::delete()
        .uri(&format!("{}?id={}", URI, id))
        .to_request();
    let deleted: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(deleted["success"], true);
    assert!(store.is_empty().await);

    // La salud sigue respondiendo con el store vacío
    let req = TestRequest::get().uri("/api/system/health").to_request();
    let health: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["db"]["backend"], "memory");
}
