pub mod local_gateway;
pub mod remote_gateway;
pub mod seed;

pub use local_gateway::LocalGateway;
pub use remote_gateway::RemoteGateway;

use async_trait::async_trait;

use crate::{
    errors::AppResult,
    models::{
        domain::{AssessmentTrack, Assignment, Attendance, Exam, User},
        dto::request::{NewAssignment, NewAttendance, NewExam},
    },
};

/// Key under which the gateway-independent session marker is stored.
pub const SESSION_MARKER_KEY: &str = "isLoggedIn";
/// Key under which the theme preference is stored.
pub const THEME_KEY: &str = "theme";
/// Key under which the remote session token is kept for silent sign-in.
pub const SESSION_TOKEN_KEY: &str = "session_token";

/// Uniform access to the signed-in user's data, whatever the backing store.
///
/// All reads and writes are scoped to the current session's owner.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> AppResult<User>;
    /// Creates credentials for a new account and signs in with them.
    async fn sign_up(&self, email: &str, password: &str) -> AppResult<User>;
    async fn logout(&self) -> AppResult<()>;
    async fn reset_password(&self, email: &str) -> AppResult<()>;
    /// `None` when no session exists.
    async fn get_user(&self) -> AppResult<Option<User>>;
    async fn update_user(&self, user: User) -> AppResult<User>;

    async fn get_exams(&self) -> AppResult<Vec<Exam>>;
    async fn add_exam(&self, exam: NewExam) -> AppResult<Exam>;

    async fn get_assignments(&self) -> AppResult<Vec<Assignment>>;
    async fn add_assignment(&self, assignment: NewAssignment) -> AppResult<Assignment>;

    async fn get_attendance(&self) -> AppResult<Vec<Attendance>>;
    async fn add_attendance(&self, attendance: NewAttendance) -> AppResult<Attendance>;

    /// Always the full fixed schedule, in schedule order.
    async fn get_tracks(&self) -> AppResult<Vec<AssessmentTrack>>;
    async fn update_track_score(
        &self,
        track_id: &str,
        score: f64,
    ) -> AppResult<Vec<AssessmentTrack>>;
}

/// Email shape check shared by both gateways.
pub(crate) fn check_email(email: &str) -> AppResult<()> {
    use validator::ValidateEmail;

    if email.validate_email() {
        Ok(())
    } else {
        Err(crate::errors::AppError::InvalidEmail(email.to_string()))
    }
}
