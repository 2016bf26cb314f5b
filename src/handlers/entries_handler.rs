use std::sync::Arc;

use actix_web::{get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::SignedIn,
    errors::AppError,
    models::{
        domain::User,
        dto::{
            request::{
                ExamFilterParams, NewAssignment, NewAttendance, NewExam, UpdateTrackScoreRequest,
            },
            response::ApiResponse,
        },
    },
    services::aggregation::{exams_of_type, track_contributions},
};

#[get("/exams")]
pub async fn list_exams(
    state: web::Data<Arc<AppState>>,
    query: web::Query<ExamFilterParams>,
    _auth: SignedIn,
) -> Result<HttpResponse, AppError> {
    let snapshot = state.session.snapshot();
    Ok(HttpResponse::Ok().json(exams_of_type(&snapshot.exams, query.exam_type)))
}

#[post("/exams")]
pub async fn add_exam(
    state: web::Data<Arc<AppState>>,
    request: web::Json<NewExam>,
    _auth: SignedIn,
) -> Result<HttpResponse, AppError> {
    let created = state.session.add_exam(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::new(created, "Exam added")))
}

#[post("/assignments")]
pub async fn add_assignment(
    state: web::Data<Arc<AppState>>,
    request: web::Json<NewAssignment>,
    _auth: SignedIn,
) -> Result<HttpResponse, AppError> {
    let created = state.session.add_assignment(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::new(created, "Assignment added")))
}

#[post("/attendance")]
pub async fn add_attendance(
    state: web::Data<Arc<AppState>>,
    request: web::Json<NewAttendance>,
    _auth: SignedIn,
) -> Result<HttpResponse, AppError> {
    let created = state.session.add_attendance(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::new(created, "Attendance recorded")))
}

#[get("/tracks")]
pub async fn list_tracks(
    state: web::Data<Arc<AppState>>,
    _auth: SignedIn,
) -> Result<HttpResponse, AppError> {
    let snapshot = state.session.snapshot();
    Ok(HttpResponse::Ok().json(track_contributions(&snapshot.tracks)))
}

#[put("/tracks/{id}/score")]
pub async fn update_track_score(
    state: web::Data<Arc<AppState>>,
    track_id: web::Path<String>,
    request: web::Json<UpdateTrackScoreRequest>,
    _auth: SignedIn,
) -> Result<HttpResponse, AppError> {
    let tracks = state
        .session
        .update_track_score(&track_id, request.score)
        .await?;
    Ok(HttpResponse::Ok().json(track_contributions(&tracks)))
}

#[put("/profile")]
pub async fn update_profile(
    state: web::Data<Arc<AppState>>,
    request: web::Json<User>,
    _auth: SignedIn,
) -> Result<HttpResponse, AppError> {
    let updated = state.session.update_user(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(updated, "Profile saved")))
}
