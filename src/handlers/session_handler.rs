use std::sync::Arc;

use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::SignedIn,
    errors::AppError,
    models::dto::{
        request::{LoginRequest, ResetPasswordRequest},
        response::{MessageResponse, SessionResponse, ThemeResponse},
    },
};

#[get("/session")]
pub async fn get_session(state: web::Data<Arc<AppState>>) -> HttpResponse {
    let response = match state.session.current_user() {
        Some(user) => SessionResponse::signed_in(user),
        None => SessionResponse::signed_out(),
    };
    HttpResponse::Ok().json(response)
}

#[post("/session/login")]
pub async fn login(
    state: web::Data<Arc<AppState>>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let LoginRequest { email, password } = request.into_inner();
    let user = state.session.login(&email, &password).await?;
    Ok(HttpResponse::Ok().json(SessionResponse::signed_in(user)))
}

#[post("/session/register")]
pub async fn register(
    state: web::Data<Arc<AppState>>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let LoginRequest { email, password } = request.into_inner();
    let user = state.session.sign_up(&email, &password).await?;
    Ok(HttpResponse::Created().json(SessionResponse::signed_in(user)))
}

#[post("/session/logout")]
pub async fn logout(state: web::Data<Arc<AppState>>) -> HttpResponse {
    state.session.logout().await;
    HttpResponse::Ok().json(SessionResponse::signed_out())
}

#[post("/session/reset-password")]
pub async fn reset_password(
    state: web::Data<Arc<AppState>>,
    request: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    state.session.reset_password(&request.email).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "If an account exists for this address, a reset link has been sent".to_string(),
    }))
}

#[post("/session/refresh")]
pub async fn refresh(
    state: web::Data<Arc<AppState>>,
    _auth: SignedIn,
) -> Result<HttpResponse, AppError> {
    state.session.refresh().await;
    Ok(HttpResponse::Ok().json(state.session.snapshot()))
}

#[post("/theme/toggle")]
pub async fn toggle_theme(state: web::Data<Arc<AppState>>) -> Result<HttpResponse, AppError> {
    let theme = state.session.toggle_theme().await?;
    Ok(HttpResponse::Ok().json(ThemeResponse { theme }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_helpers::{assert_error_status, local_app_state};
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    macro_rules! session_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state.clone()))
                    .service(get_session)
                    .service(login)
                    .service(register)
                    .service(logout)
                    .service(reset_password)
                    .service(refresh)
                    .service(toggle_theme),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_login_then_logout() {
        let state = local_app_state();
        let app = session_app!(state);

        let req = test::TestRequest::post()
            .uri("/session/login")
            .set_json(json!({ "email": "student@uni.example", "password": "pw" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["authenticated"], true);
        assert_eq!(body["user"]["email"], "student@uni.example");
        assert!(state.session.snapshot().is_authenticated());

        let req = test::TestRequest::post().uri("/session/logout").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["authenticated"], false);

        let req = test::TestRequest::get().uri("/session").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "authenticated": false }));
    }

    #[actix_web::test]
    async fn test_failed_login_uses_generic_message() {
        let state = local_app_state();
        let app = session_app!(state);

        let req = test::TestRequest::post()
            .uri("/session/login")
            .set_json(json!({ "email": "student@uni.example", "password": "" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Invalid email or password");
        assert_eq!(body["code"], "INVALID_CREDENTIALS");
    }

    #[actix_web::test]
    async fn test_register_signs_in() {
        let state = local_app_state();
        let app = session_app!(state);

        let req = test::TestRequest::post()
            .uri("/session/register")
            .set_json(json!({ "email": "new@uni.example", "password": "longenough" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert!(state.session.snapshot().is_authenticated());
    }

    #[actix_web::test]
    async fn test_reset_password_rejects_malformed_email() {
        let state = local_app_state();
        let app = session_app!(state);

        let req = test::TestRequest::post()
            .uri("/session/reset-password")
            .set_json(json!({ "email": "nope" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/session/reset-password")
            .set_json(json!({ "email": "student@uni.example" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_refresh_requires_session() {
        let state = local_app_state();
        let app = session_app!(state);

        let req = test::TestRequest::post().uri("/session/refresh").to_request();
        let resp = test::call_service(&app, req).await;
        assert_error_status(resp.status());
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_toggle_theme_without_session() {
        let state = local_app_state();
        let app = session_app!(state);

        let req = test::TestRequest::post().uri("/theme/toggle").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["theme"], "dark");
    }
}
