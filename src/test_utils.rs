#[cfg(test)]
pub mod fixtures {
    use chrono::NaiveDate;

    use crate::models::{
        domain::{Exam, ExamType},
        dto::request::NewExam,
    };

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// A quiz owned by the test user.
    pub fn exam(id: &str, exam_date: NaiveDate, grade: u8) -> Exam {
        Exam {
            id: id.to_string(),
            user_id: "test-user".to_string(),
            exam_title: format!("Exam {}", id),
            exam_type: ExamType::Quiz,
            exam_date,
            grade,
            notes: None,
        }
    }

    pub fn new_exam(grade: u8) -> NewExam {
        NewExam {
            exam_title: "Unit 3 Quiz".to_string(),
            exam_type: ExamType::Quiz,
            exam_date: date(2024, 3, 1),
            grade,
            notes: None,
        }
    }
}

#[cfg(test)]
pub mod test_helpers {
    use std::sync::Arc;

    use actix_web::http::StatusCode;

    use crate::{
        app_state::AppState, config::Config, db::KeyValueStore, gateway::LocalGateway,
        services::session_service::SessionService,
    };

    /// App state over the local gateway and an in-memory store.
    pub fn local_app_state() -> Arc<AppState> {
        let store = Arc::new(KeyValueStore::in_memory());
        let gateway = Arc::new(LocalGateway::new(store.clone()));
        let session = Arc::new(SessionService::new(gateway, store));
        Arc::new(AppState::with_session(session, Config::test_config()))
    }

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_fixtures_exam() {
        let exam = exam("e1", date(2024, 1, 2), 77);
        assert_eq!(exam.exam_title, "Exam e1");
        assert_eq!(exam.grade, 77);
    }

    #[test]
    fn test_fixtures_new_exam_is_valid() {
        use validator::Validate;
        assert!(new_exam(100).validate().is_ok());
    }
}
