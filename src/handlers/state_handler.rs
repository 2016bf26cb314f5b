use std::sync::Arc;

use actix_web::{get, web, HttpResponse};

use crate::{app_state::AppState, auth::SignedIn, errors::AppError};

#[get("/state")]
pub async fn get_state(
    state: web::Data<Arc<AppState>>,
    _auth: SignedIn,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(state.session.snapshot()))
}

#[get("/dashboard")]
pub async fn get_dashboard(
    state: web::Data<Arc<AppState>>,
    _auth: SignedIn,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(state.session.dashboard_today()))
}

#[get("/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[get("/health/ready")]
pub async fn health_check_ready(state: web::Data<Arc<AppState>>) -> HttpResponse {
    let backend = match &state.db {
        Some(db) => db.health_check().await.map(|_| "mongodb"),
        None => Ok("local"),
    };

    match backend {
        Ok(name) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ready",
            "version": env!("CARGO_PKG_VERSION"),
            "backend": name
        })),
        Err(e) => {
            log::warn!("Readiness check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "not_ready",
                "version": env!("CARGO_PKG_VERSION"),
                "backend": "mongodb"
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_helpers::{assert_success_status, local_app_state};
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(App::new().service(health_check)).await;

        let req = test::TestRequest::get().uri("/health").to_request();

        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_ready_with_local_backend() {
        let state = local_app_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(health_check_ready),
        )
        .await;

        let req = test::TestRequest::get().uri("/health/ready").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["backend"], "local");
    }

    #[actix_web::test]
    async fn test_state_and_dashboard_need_session() {
        let state = local_app_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .service(get_state)
                .service(get_dashboard),
        )
        .await;

        for uri in ["/state", "/dashboard"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }

        state
            .session
            .login("student@uni.example", "pw")
            .await
            .unwrap();

        let req = test::TestRequest::get().uri("/state").to_request();
        let resp = test::call_service(&app, req).await;
        assert_success_status(resp.status());
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["exams"].as_array().unwrap().len(), 4);
        assert_eq!(body["is_loading"], false);

        let req = test::TestRequest::get().uri("/dashboard").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["average_exam_grade"], 84);
        assert_eq!(body["total_absence_hours"], 4.0);
        assert_eq!(body["tracks"].as_array().unwrap().len(), 9);
    }
}
