use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, DateTime as BsonDateTime, Document},
    options::{IndexOptions, ReplaceOptions, UpdateOptions},
    Collection, IndexModel,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    auth::{hash_password, hash_token, new_salt, verify_password, SessionClaims, SessionTokens},
    db::{collections, Database, KeyValueStore},
    errors::{AppError, AppResult},
    gateway::{check_email, Gateway, SESSION_TOKEN_KEY},
    models::{
        domain::{AssessmentTrack, Assignment, Attendance, Exam, TrackScoreRow, User},
        dto::request::{NewAssignment, NewAttendance, NewExam},
    },
    services::tracks::{clamp_score, reconcile_tracks, resolve_track_name, TRACK_SCHEDULE},
};

const MIN_PASSWORD_LEN: usize = 8;
const RESET_TOKEN_TTL_MS: i64 = 60 * 60 * 1000;

#[derive(Clone, Debug, Deserialize, Serialize)]
struct CredentialRecord {
    user_id: String,
    email: String,
    salt: String,
    password_hash: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
struct PasswordResetRecord {
    id: String,
    user_id: String,
    token_hash: String,
    requested_at: BsonDateTime,
    expires_at: BsonDateTime,
    used: bool,
}

#[derive(Clone, Debug)]
struct Session {
    user_id: String,
    email: String,
    expires_at: usize,
}

impl Session {
    fn is_live(&self) -> bool {
        (Utc::now().timestamp() as usize) < self.expires_at
    }
}

impl From<SessionClaims> for Session {
    fn from(claims: SessionClaims) -> Self {
        Session {
            user_id: claims.sub,
            email: claims.email,
            expires_at: claims.exp,
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Logs a failed read and substitutes an empty list.
fn lenient<T>(collection: &str, result: AppResult<Vec<T>>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            log::error!("Failed to read {}: {}", collection, e);
            Vec::new()
        }
    }
}

async fn find_owned<T>(
    collection: &Collection<T>,
    user_id: &str,
    sort: Document,
) -> AppResult<Vec<T>>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let cursor = collection
        .find(doc! { "user_id": user_id })
        .sort(sort)
        .await?;
    Ok(cursor.try_collect().await?)
}

/// MongoDB-backed gateway with credential sign-in and signed session tokens.
///
/// The session token is mirrored into the local key-value store so that a
/// restarted process can resume the session without asking for credentials.
pub struct RemoteGateway {
    users: Collection<User>,
    credentials: Collection<CredentialRecord>,
    exams: Collection<Exam>,
    assignments: Collection<Assignment>,
    attendance: Collection<Attendance>,
    tracks: Collection<TrackScoreRow>,
    password_resets: Collection<PasswordResetRecord>,
    tokens: SessionTokens,
    preferences: Arc<KeyValueStore>,
    session: RwLock<Option<Session>>,
}

impl RemoteGateway {
    pub fn new(db: &Database, tokens: SessionTokens, preferences: Arc<KeyValueStore>) -> Self {
        Self {
            users: db.collection(collections::USERS),
            credentials: db.collection(collections::CREDENTIALS),
            exams: db.collection(collections::EXAMS),
            assignments: db.collection(collections::ASSIGNMENTS),
            attendance: db.collection(collections::ATTENDANCE),
            tracks: db.collection(collections::TRACKS),
            password_resets: db.collection(collections::PASSWORD_RESETS),
            tokens,
            preferences,
            session: RwLock::new(None),
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for study tracker collections");

        let unique = |keys: Document, name: &str| {
            IndexModel::builder()
                .keys(keys)
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name(name.to_string())
                        .build(),
                )
                .build()
        };
        let by_owner = || {
            IndexModel::builder()
                .keys(doc! { "user_id": 1 })
                .options(IndexOptions::builder().name("user_id".to_string()).build())
                .build()
        };

        self.users
            .create_index(unique(doc! { "id": 1 }, "id_unique"))
            .await?;
        self.credentials
            .create_index(unique(doc! { "email": 1 }, "email_unique"))
            .await?;
        self.exams.create_index(by_owner()).await?;
        self.assignments.create_index(by_owner()).await?;
        self.attendance.create_index(by_owner()).await?;
        self.tracks
            .create_index(unique(doc! { "user_id": 1, "name": 1 }, "user_track_unique"))
            .await?;
        self.password_resets
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "expires_at": 1 })
                    .options(
                        IndexOptions::builder()
                            .name("expires_at".to_string())
                            .build(),
                    )
                    .build(),
            )
            .await?;

        log::info!("Successfully created indexes for study tracker collections");
        Ok(())
    }

    /// The live session, restoring it from the persisted token if needed.
    ///
    /// The restore holds the session write lock; a concurrent logout lands
    /// wholly before or wholly after it.
    async fn current_session(&self) -> Option<Session> {
        if let Some(session) = self.session.read().await.clone() {
            if session.is_live() {
                return Some(session);
            }
        }

        let mut slot = self.session.write().await;
        if let Some(session) = slot.as_ref().filter(|s| s.is_live()) {
            return Some(session.clone());
        }

        let restored = match self.preferences.get_item(SESSION_TOKEN_KEY).await {
            Some(token) => self.tokens.verify(&token).map(Session::from),
            None => None,
        };

        if restored.is_none() {
            if let Err(e) = self.preferences.remove_item(SESSION_TOKEN_KEY).await {
                log::warn!("Could not clear stale session token: {}", e);
            }
        }

        *slot = restored.clone();
        restored
    }

    async fn require_session(&self) -> AppResult<Session> {
        self.current_session().await.ok_or(AppError::AuthRequired)
    }

    async fn fetch_profile(&self, session: &Session) -> AppResult<User> {
        let profile = self
            .users
            .find_one(doc! { "id": &session.user_id })
            .await?;

        Ok(match profile {
            Some(user) => User {
                id: session.user_id.clone(),
                email: session.email.clone(),
                ..user
            },
            None => User::default_profile(&session.user_id, &session.email),
        })
    }

    async fn start_session(&self, credential: &CredentialRecord) -> AppResult<Session> {
        let (token, claims) = self.tokens.issue(&credential.user_id, &credential.email)?;

        let mut slot = self.session.write().await;
        self.preferences.set_item(SESSION_TOKEN_KEY, token).await?;
        let session = Session::from(claims);
        *slot = Some(session.clone());
        Ok(session)
    }
}

#[async_trait]
impl Gateway for RemoteGateway {
    async fn login(&self, email: &str, password: &str) -> AppResult<User> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AppError::InvalidCredentials);
        }

        let credential = self
            .credentials
            .find_one(doc! { "email": &email })
            .await?
            .filter(|c| verify_password(&c.salt, password, &c.password_hash))
            .ok_or_else(|| {
                log::info!("Rejected sign-in attempt");
                AppError::InvalidCredentials
            })?;

        let session = self.start_session(&credential).await?;
        log::info!("Signed in user {}", session.user_id);
        self.fetch_profile(&session).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> AppResult<User> {
        let email = normalize_email(email);
        check_email(&email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::ValidationError(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let existing = self.credentials.find_one(doc! { "email": &email }).await?;
        if existing.is_some() {
            return Err(AppError::ValidationError(
                "Unable to register with these credentials".to_string(),
            ));
        }

        let salt = new_salt();
        let credential = CredentialRecord {
            user_id: Uuid::new_v4().to_string(),
            password_hash: hash_password(&salt, password),
            salt,
            email: email.clone(),
        };
        self.credentials.insert_one(&credential).await?;
        self.users
            .insert_one(&User::default_profile(&credential.user_id, &email))
            .await?;

        log::info!("Registered user {}", credential.user_id);
        self.login(&email, password).await
    }

    async fn logout(&self) -> AppResult<()> {
        let mut slot = self.session.write().await;
        *slot = None;
        self.preferences.remove_item(SESSION_TOKEN_KEY).await
    }

    async fn reset_password(&self, email: &str) -> AppResult<()> {
        let email = normalize_email(email);
        check_email(&email)?;

        let Some(credential) = self.credentials.find_one(doc! { "email": &email }).await? else {
            // same outcome as a known address
            return Ok(());
        };

        let token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let now = BsonDateTime::now();
        let record = PasswordResetRecord {
            id: Uuid::new_v4().to_string(),
            user_id: credential.user_id,
            token_hash: hash_token(&token),
            requested_at: now,
            expires_at: BsonDateTime::from_millis(now.timestamp_millis() + RESET_TOKEN_TTL_MS),
            used: false,
        };
        self.password_resets.insert_one(&record).await?;

        log::info!("Recorded password reset request {}", record.id);
        Ok(())
    }

    async fn get_user(&self) -> AppResult<Option<User>> {
        let Some(session) = self.current_session().await else {
            return Ok(None);
        };
        self.fetch_profile(&session).await.map(Some)
    }

    async fn update_user(&self, user: User) -> AppResult<User> {
        let session = self.require_session().await?;
        let stored = User {
            id: session.user_id.clone(),
            email: session.email.clone(),
            ..user.clone()
        };

        let options = ReplaceOptions::builder().upsert(true).build();
        self.users
            .replace_one(doc! { "id": &session.user_id }, &stored)
            .with_options(options)
            .await?;

        Ok(user)
    }

    async fn get_exams(&self) -> AppResult<Vec<Exam>> {
        let Some(session) = self.current_session().await else {
            log::warn!("Reading exams without a session");
            return Ok(Vec::new());
        };
        let result = find_owned(&self.exams, &session.user_id, doc! { "exam_date": -1 }).await;
        Ok(lenient("exams", result))
    }

    async fn add_exam(&self, exam: NewExam) -> AppResult<Exam> {
        let session = self.require_session().await?;
        let created = Exam {
            id: Uuid::new_v4().to_string(),
            user_id: session.user_id,
            exam_title: exam.exam_title,
            exam_type: exam.exam_type,
            exam_date: exam.exam_date,
            grade: exam.grade,
            notes: exam.notes,
        };
        self.exams.insert_one(&created).await?;
        Ok(created)
    }

    async fn get_assignments(&self) -> AppResult<Vec<Assignment>> {
        let Some(session) = self.current_session().await else {
            log::warn!("Reading assignments without a session");
            return Ok(Vec::new());
        };
        let result = find_owned(&self.assignments, &session.user_id, doc! { "due_date": 1 }).await;
        Ok(lenient("assignments", result))
    }

    async fn add_assignment(&self, assignment: NewAssignment) -> AppResult<Assignment> {
        let session = self.require_session().await?;
        let created = Assignment {
            id: Uuid::new_v4().to_string(),
            user_id: session.user_id,
            title: assignment.title,
            description: assignment.description,
            due_date: assignment.due_date,
            status: assignment.status,
        };
        self.assignments.insert_one(&created).await?;
        Ok(created)
    }

    async fn get_attendance(&self) -> AppResult<Vec<Attendance>> {
        let Some(session) = self.current_session().await else {
            log::warn!("Reading attendance without a session");
            return Ok(Vec::new());
        };
        let result = find_owned(&self.attendance, &session.user_id, doc! { "date": -1 }).await;
        Ok(lenient("attendance", result))
    }

    async fn add_attendance(&self, attendance: NewAttendance) -> AppResult<Attendance> {
        let session = self.require_session().await?;
        let created = Attendance {
            id: Uuid::new_v4().to_string(),
            user_id: session.user_id,
            date: attendance.date,
            hours: attendance.hours,
            status: attendance.status,
        };
        self.attendance.insert_one(&created).await?;
        Ok(created)
    }

    async fn get_tracks(&self) -> AppResult<Vec<AssessmentTrack>> {
        let Some(session) = self.current_session().await else {
            log::warn!("Reading tracks without a session");
            return Ok(reconcile_tracks(&TRACK_SCHEDULE, &[], ""));
        };
        let result = find_owned(&self.tracks, &session.user_id, doc! {}).await;
        let rows = lenient("tracks", result);
        Ok(reconcile_tracks(&TRACK_SCHEDULE, &rows, &session.user_id))
    }

    async fn update_track_score(
        &self,
        track_id: &str,
        score: f64,
    ) -> AppResult<Vec<AssessmentTrack>> {
        let session = self.require_session().await?;
        let tracks = self.get_tracks().await?;
        let name = resolve_track_name(&tracks, track_id)?;
        let score = clamp_score(score);

        let options = UpdateOptions::builder().upsert(true).build();
        self.tracks
            .update_one(
                doc! { "user_id": &session.user_id, "name": name },
                doc! {
                    "$set": { "score": score },
                    "$setOnInsert": { "id": Uuid::new_v4().to_string() },
                },
            )
            .with_options(options)
            .await?;

        self.get_tracks().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, test_utils::fixtures::new_exam};

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Student@Uni.Example "), "student@uni.example");
    }

    #[test]
    fn test_lenient_swallows_errors() {
        let ok: Vec<u8> = lenient("exams", Ok(vec![1, 2]));
        assert_eq!(ok, vec![1, 2]);

        let failed: Vec<u8> = lenient(
            "exams",
            Err(AppError::BackendUnavailable("timeout".to_string())),
        );
        assert!(failed.is_empty());
    }

    #[test]
    fn test_session_liveness() {
        let live = Session::from(SessionClaims::new("user-1", "a@b.c", 1));
        assert!(live.is_live());

        let expired = Session::from(SessionClaims::new("user-1", "a@b.c", -1));
        assert!(!expired.is_live());
    }

    async fn offline_gateway(tokens: SessionTokens) -> RemoteGateway {
        let config = Config::test_config();
        let db = Database::connect_lazy(&config).await.unwrap();
        RemoteGateway::new(&db, tokens, Arc::new(KeyValueStore::in_memory()))
    }

    fn session_tokens(hours: i64) -> SessionTokens {
        SessionTokens::new(&Config::test_config().session_secret, hours)
    }

    #[tokio::test]
    async fn test_writes_without_session_require_auth() {
        let gateway = offline_gateway(session_tokens(1)).await;

        assert!(matches!(
            gateway.add_exam(new_exam(80)).await,
            Err(AppError::AuthRequired)
        ));
        assert!(matches!(
            gateway.update_track_score("1", 50.0).await,
            Err(AppError::AuthRequired)
        ));
        assert!(matches!(
            gateway
                .update_user(User::default_profile("u-1", "a@uni.example"))
                .await,
            Err(AppError::AuthRequired)
        ));
    }

    #[tokio::test]
    async fn test_reads_without_session_are_empty() {
        let gateway = offline_gateway(session_tokens(1)).await;

        assert!(gateway.get_user().await.unwrap().is_none());
        assert!(gateway.get_exams().await.unwrap().is_empty());
        assert!(gateway.get_assignments().await.unwrap().is_empty());
        assert!(gateway.get_attendance().await.unwrap().is_empty());

        let tracks = gateway.get_tracks().await.unwrap();
        assert_eq!(tracks.len(), TRACK_SCHEDULE.len());
        assert!(tracks.iter().all(|t| t.score == 0.0));
    }

    #[tokio::test]
    async fn test_expired_token_is_discarded() {
        let gateway = offline_gateway(session_tokens(1)).await;
        let (token, _) = session_tokens(-2).issue("u-1", "a@uni.example").unwrap();
        gateway
            .preferences
            .set_item(SESSION_TOKEN_KEY, token)
            .await
            .unwrap();

        assert!(gateway.get_user().await.unwrap().is_none());
        assert!(gateway.preferences.get_item(SESSION_TOKEN_KEY).await.is_none());
    }

    #[tokio::test]
    async fn test_persisted_token_restores_session() {
        let gateway = offline_gateway(session_tokens(1)).await;
        let (token, _) = session_tokens(1).issue("u-1", "a@uni.example").unwrap();
        gateway
            .preferences
            .set_item(SESSION_TOKEN_KEY, token)
            .await
            .unwrap();

        let session = gateway.current_session().await.unwrap();
        assert_eq!(session.user_id, "u-1");
        assert_eq!(session.email, "a@uni.example");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_logout_during_restore_stays_signed_out() {
        let gateway = Arc::new(offline_gateway(session_tokens(1)).await);

        for _ in 0..50 {
            let (token, _) = session_tokens(1).issue("u-1", "a@uni.example").unwrap();
            gateway
                .preferences
                .set_item(SESSION_TOKEN_KEY, token)
                .await
                .unwrap();

            let restoring = {
                let gateway = Arc::clone(&gateway);
                tokio::spawn(async move { gateway.current_session().await })
            };
            gateway.logout().await.unwrap();
            restoring.await.unwrap();

            assert!(gateway.current_session().await.is_none());
            assert!(gateway.preferences.get_item(SESSION_TOKEN_KEY).await.is_none());
        }
    }

    #[test]
    fn test_gateway_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RemoteGateway>();
    }
}
