use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{AssignmentStatus, AttendanceStatus, ExamType};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Validate)]
pub struct NewExam {
    #[validate(length(min = 1, max = 200))]
    pub exam_title: String,

    pub exam_type: ExamType,

    pub exam_date: NaiveDate,

    #[validate(range(max = 100, message = "Grade must be between 0 and 100"))]
    pub grade: u8,

    #[validate(length(max = 1000))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Validate)]
pub struct NewAssignment {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(max = 2000))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub due_date: NaiveDate,

    #[serde(default)]
    pub status: AssignmentStatus,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Validate)]
pub struct NewAttendance {
    pub date: NaiveDate,

    #[validate(range(min = 1.0, max = 10.0, message = "Hours must be between 1 and 10"))]
    pub hours: f64,

    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTrackScoreRequest {
    pub score: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExamFilterParams {
    #[serde(rename = "type")]
    pub exam_type: Option<ExamType>,
}
