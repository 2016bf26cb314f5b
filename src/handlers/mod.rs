pub mod entries_handler;
pub mod session_handler;
pub mod state_handler;

use actix_web::web;

pub use entries_handler::{
    add_assignment, add_attendance, add_exam, list_exams, list_tracks, update_profile,
    update_track_score,
};
pub use session_handler::{
    get_session, login, logout, refresh, register, reset_password, toggle_theme,
};
pub use state_handler::{get_dashboard, get_state, health_check, health_check_ready};

/// Registers every route of the daemon API.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(health_check_ready)
        .service(get_session)
        .service(login)
        .service(register)
        .service(logout)
        .service(reset_password)
        .service(refresh)
        .service(toggle_theme)
        .service(get_state)
        .service(get_dashboard)
        .service(list_exams)
        .service(add_exam)
        .service(add_assignment)
        .service(add_attendance)
        .service(list_tracks)
        .service(update_track_score)
        .service(update_profile);
}
