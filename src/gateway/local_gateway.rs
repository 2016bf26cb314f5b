use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    db::KeyValueStore,
    errors::{AppError, AppResult},
    gateway::{check_email, seed, Gateway},
    models::{
        domain::{AssessmentTrack, Assignment, Attendance, Exam, TrackScoreRow, User},
        dto::request::{NewAssignment, NewAttendance, NewExam},
    },
    services::tracks::{clamp_score, reconcile_tracks, resolve_track_name, TRACK_SCHEDULE},
};

const USER_KEY: &str = "user";
const EXAMS_KEY: &str = "exams";
const ASSIGNMENTS_KEY: &str = "assignments";
const ATTENDANCE_KEY: &str = "attendance";
const TRACKS_KEY: &str = "tracks";

/// Offline gateway over a local key-value store.
///
/// There is no real authentication: any non-empty credentials sign in as the
/// stored profile. Collections start out as the demo data until first written.
/// Every load-modify-save runs under `writes`.
pub struct LocalGateway {
    store: Arc<KeyValueStore>,
    writes: Mutex<()>,
}

impl LocalGateway {
    pub fn new(store: Arc<KeyValueStore>) -> Self {
        Self {
            store,
            writes: Mutex::new(()),
        }
    }

    async fn stored_user(&self) -> User {
        self.store
            .load_json(USER_KEY)
            .await
            .unwrap_or_else(seed::demo_user)
    }

    async fn owner_id(&self) -> String {
        self.stored_user().await.id
    }

    async fn stored_exams(&self) -> Vec<Exam> {
        self.store
            .load_json(EXAMS_KEY)
            .await
            .unwrap_or_else(seed::demo_exams)
    }

    async fn stored_assignments(&self) -> Vec<Assignment> {
        self.store
            .load_json(ASSIGNMENTS_KEY)
            .await
            .unwrap_or_else(seed::demo_assignments)
    }

    async fn stored_attendance(&self) -> Vec<Attendance> {
        self.store
            .load_json(ATTENDANCE_KEY)
            .await
            .unwrap_or_else(seed::demo_attendance)
    }
}

fn fresh_id(taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if !taken(&id) {
            return id;
        }
    }
}

#[async_trait]
impl Gateway for LocalGateway {
    async fn login(&self, email: &str, password: &str) -> AppResult<User> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AppError::InvalidCredentials);
        }

        let user = self.stored_user().await;
        Ok(User {
            email: email.to_string(),
            ..user
        })
    }

    async fn sign_up(&self, email: &str, password: &str) -> AppResult<User> {
        check_email(email)?;
        self.login(email, password).await
    }

    async fn logout(&self) -> AppResult<()> {
        Ok(())
    }

    async fn reset_password(&self, email: &str) -> AppResult<()> {
        check_email(email)
    }

    async fn get_user(&self) -> AppResult<Option<User>> {
        Ok(Some(self.stored_user().await))
    }

    async fn update_user(&self, user: User) -> AppResult<User> {
        let _guard = self.writes.lock().await;
        let current = self.stored_user().await;
        let stored = User {
            id: current.id,
            email: current.email,
            ..user.clone()
        };
        self.store.save_json(USER_KEY, &stored).await?;
        Ok(user)
    }

    async fn get_exams(&self) -> AppResult<Vec<Exam>> {
        Ok(self.stored_exams().await)
    }

    async fn add_exam(&self, exam: NewExam) -> AppResult<Exam> {
        let _guard = self.writes.lock().await;
        let mut exams = self.stored_exams().await;
        let created = Exam {
            id: fresh_id(|id| exams.iter().any(|e| e.id == id)),
            user_id: self.owner_id().await,
            exam_title: exam.exam_title,
            exam_type: exam.exam_type,
            exam_date: exam.exam_date,
            grade: exam.grade,
            notes: exam.notes,
        };

        exams.insert(0, created.clone());
        self.store.save_json(EXAMS_KEY, &exams).await?;
        Ok(created)
    }

    async fn get_assignments(&self) -> AppResult<Vec<Assignment>> {
        let mut assignments = self.stored_assignments().await;
        assignments.sort_by_key(|a| a.due_date);
        Ok(assignments)
    }

    async fn add_assignment(&self, assignment: NewAssignment) -> AppResult<Assignment> {
        let _guard = self.writes.lock().await;
        let mut assignments = self.stored_assignments().await;
        let created = Assignment {
            id: fresh_id(|id| assignments.iter().any(|a| a.id == id)),
            user_id: self.owner_id().await,
            title: assignment.title,
            description: assignment.description,
            due_date: assignment.due_date,
            status: assignment.status,
        };

        assignments.insert(0, created.clone());
        self.store.save_json(ASSIGNMENTS_KEY, &assignments).await?;
        Ok(created)
    }

    async fn get_attendance(&self) -> AppResult<Vec<Attendance>> {
        let mut attendance = self.stored_attendance().await;
        attendance.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(attendance)
    }

    async fn add_attendance(&self, attendance: NewAttendance) -> AppResult<Attendance> {
        let _guard = self.writes.lock().await;
        let mut records = self.stored_attendance().await;
        let created = Attendance {
            id: fresh_id(|id| records.iter().any(|r| r.id == id)),
            user_id: self.owner_id().await,
            date: attendance.date,
            hours: attendance.hours,
            status: attendance.status,
        };

        records.insert(0, created.clone());
        self.store.save_json(ATTENDANCE_KEY, &records).await?;
        Ok(created)
    }

    async fn get_tracks(&self) -> AppResult<Vec<AssessmentTrack>> {
        let rows: Vec<TrackScoreRow> = self
            .store
            .load_json(TRACKS_KEY)
            .await
            .unwrap_or_default();
        Ok(reconcile_tracks(&TRACK_SCHEDULE, &rows, &self.owner_id().await))
    }

    async fn update_track_score(
        &self,
        track_id: &str,
        score: f64,
    ) -> AppResult<Vec<AssessmentTrack>> {
        let _guard = self.writes.lock().await;
        let mut tracks = self.get_tracks().await?;
        let name = resolve_track_name(&tracks, track_id)?.to_string();
        let score = clamp_score(score);

        for track in tracks.iter_mut().filter(|t| t.name == name) {
            track.score = score;
        }

        self.store.save_json(TRACKS_KEY, &tracks).await?;
        self.get_tracks().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::{AttendanceStatus, ExamType};
    use chrono::NaiveDate;

    fn gateway() -> LocalGateway {
        LocalGateway::new(Arc::new(KeyValueStore::in_memory()))
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let gateway = gateway();
        assert!(matches!(
            gateway.login("student@uni.example", "").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            gateway.login("", "secret").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_login_overwrites_email_without_persisting_it() {
        let gateway = gateway();
        let user = gateway.login("someone@uni.example", "pw").await.unwrap();
        assert_eq!(user.email, "someone@uni.example");
        assert_eq!(user.first_name, "Alex");

        let stored = gateway.get_user().await.unwrap().unwrap();
        assert_eq!(stored.email, seed::demo_user().email);
    }

    #[tokio::test]
    async fn test_update_user_keeps_identity() {
        let gateway = gateway();
        let mut edited = seed::demo_user();
        edited.first_name = "Sam".to_string();
        edited.email = "hijack@uni.example".to_string();
        edited.id = "user-2".to_string();

        let echoed = gateway.update_user(edited.clone()).await.unwrap();
        assert_eq!(echoed, edited);

        let stored = gateway.get_user().await.unwrap().unwrap();
        assert_eq!(stored.first_name, "Sam");
        assert_eq!(stored.id, seed::DEMO_USER_ID);
        assert_eq!(stored.email, seed::demo_user().email);
    }

    #[tokio::test]
    async fn test_add_attendance_is_listed_newest_first() {
        let gateway = gateway();
        let created = gateway
            .add_attendance(NewAttendance {
                date: NaiveDate::from_ymd_opt(2024, 2, 2).unwrap(),
                hours: 6.0,
                status: AttendanceStatus::Absent,
            })
            .await
            .unwrap();

        let records = gateway.get_attendance().await.unwrap();
        assert_eq!(records.len(), 6);
        assert_eq!(records[0].id, created.id);
        assert!(records.windows(2).all(|w| w[0].date >= w[1].date));
    }

    #[tokio::test]
    async fn test_add_exam_is_prepended_in_storage() {
        let gateway = gateway();
        let created = gateway
            .add_exam(NewExam {
                exam_title: "Unit 2 Quiz".to_string(),
                exam_type: ExamType::Quiz,
                exam_date: NaiveDate::from_ymd_opt(2024, 2, 2).unwrap(),
                grade: 91,
                notes: Some("open book".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(created.user_id, seed::DEMO_USER_ID);
        let exams = gateway.get_exams().await.unwrap();
        assert_eq!(exams.len(), 5);
        assert_eq!(exams[0], created);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_are_all_kept() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyValueStore::open(dir.path().join("tracker.json"))
            .await
            .unwrap();
        let gateway = Arc::new(LocalGateway::new(Arc::new(store)));

        let handles: Vec<_> = (0..20u8)
            .map(|i| {
                let gateway = Arc::clone(&gateway);
                tokio::spawn(async move {
                    gateway
                        .add_exam(NewExam {
                            exam_title: format!("Quiz {}", i),
                            exam_type: ExamType::Quiz,
                            exam_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
                            grade: 50 + i,
                            notes: None,
                        })
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let exams = gateway.get_exams().await.unwrap();
        assert_eq!(exams.len(), 24);
        let mut ids: Vec<_> = exams.iter().map(|e| e.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 24);
    }

    #[tokio::test]
    async fn test_reset_password_validates_email() {
        let gateway = gateway();
        assert!(gateway.reset_password("student@uni.example").await.is_ok());
        assert!(matches!(
            gateway.reset_password("not-an-email").await,
            Err(AppError::InvalidEmail(_))
        ));
    }

    #[tokio::test]
    async fn test_stored_tracks_are_reconciled() {
        let store = Arc::new(KeyValueStore::in_memory());
        store
            .set_item(
                TRACKS_KEY,
                concat!(
                    r#"[{"id":"t3","user_id":"user-1","name":"ELAT-1","#,
                    r#""weight_percentage":99,"score":70}]"#,
                ),
            )
            .await
            .unwrap();

        let tracks = LocalGateway::new(store).get_tracks().await.unwrap();
        assert_eq!(tracks.len(), 9);
        let elat = &tracks[2];
        assert_eq!(elat.name, "ELAT-1");
        assert_eq!(elat.weight_percentage, 25);
        assert_eq!(elat.score, 70.0);
    }
}
