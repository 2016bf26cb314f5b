use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tokio::sync::watch;
use validator::Validate;

use crate::{
    db::KeyValueStore,
    errors::{AppError, AppResult},
    gateway::{Gateway, SESSION_MARKER_KEY, THEME_KEY},
    models::{
        domain::{AssessmentTrack, Assignment, Attendance, Exam, Theme, User},
        dto::request::{NewAssignment, NewAttendance, NewExam},
    },
    services::aggregation::Dashboard,
};

/// Everything the presentation layer renders from.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub user: Option<User>,
    pub exams: Vec<Exam>,
    pub assignments: Vec<Assignment>,
    pub attendance: Vec<Attendance>,
    pub tracks: Vec<AssessmentTrack>,
    pub is_loading: bool,
    pub theme: Theme,
}

impl Snapshot {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Replaces `slot` on success; on failure logs and keeps the previous value.
fn keep_on_error<T>(slot: &mut Vec<T>, result: AppResult<Vec<T>>, collection: &str) {
    match result {
        Ok(items) => *slot = items,
        Err(e) => log::error!("Failed to refresh {}: {}", collection, e),
    }
}

/// Owns the session snapshot and routes every mutation through the gateway.
///
/// Each login and logout starts a new session epoch. Work that began under an
/// earlier epoch never writes into the snapshot.
pub struct SessionService {
    gateway: Arc<dyn Gateway>,
    preferences: Arc<KeyValueStore>,
    state: watch::Sender<Snapshot>,
    epoch: AtomicU64,
}

impl SessionService {
    pub fn new(gateway: Arc<dyn Gateway>, preferences: Arc<KeyValueStore>) -> Self {
        let (state, _) = watch::channel(Snapshot::default());
        Self {
            gateway,
            preferences,
            state,
            epoch: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.state.subscribe()
    }

    pub fn dashboard(&self, today: NaiveDate) -> Dashboard {
        Dashboard::from_snapshot(&self.state.borrow(), today)
    }

    pub fn dashboard_today(&self) -> Dashboard {
        self.dashboard(Local::now().date_naive())
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn theme(&self) -> Theme {
        self.state.borrow().theme
    }

    fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    fn set_loading(&self, is_loading: bool) {
        self.state.send_if_modified(|snapshot| {
            let changed = snapshot.is_loading != is_loading;
            snapshot.is_loading = is_loading;
            changed
        });
    }

    /// Applies `update` only if no session change happened since `epoch`.
    fn apply_if_current(&self, epoch: u64, update: impl FnOnce(&mut Snapshot)) -> bool {
        let applied = self.state.send_if_modified(|snapshot| {
            if self.epoch.load(Ordering::SeqCst) != epoch {
                return false;
            }
            update(snapshot);
            true
        });
        if !applied {
            log::info!("Discarding result from an earlier session");
        }
        applied
    }

    fn require_user(&self) -> AppResult<User> {
        self.current_user().ok_or(AppError::AuthRequired)
    }

    /// Reads the persisted theme, falling back to the system preference.
    pub async fn load_theme(&self, system_theme: Theme) {
        let theme = self
            .preferences
            .get_item(THEME_KEY)
            .await
            .and_then(|value| Theme::from_preference(&value))
            .unwrap_or(system_theme);
        self.state.send_modify(|snapshot| snapshot.theme = theme);
    }

    pub async fn toggle_theme(&self) -> AppResult<Theme> {
        let mut theme = Theme::default();
        self.state.send_modify(|snapshot| {
            snapshot.theme = snapshot.theme.toggled();
            theme = snapshot.theme;
        });
        self.preferences.set_item(THEME_KEY, theme.as_str()).await?;
        Ok(theme)
    }

    /// Silent sign-in at startup. Only consults the gateway when the session
    /// marker says the last run ended signed in. Returns whether a user is
    /// now signed in.
    pub async fn restore_session(&self) -> bool {
        let marker = self.preferences.get_item(SESSION_MARKER_KEY).await;
        if marker.as_deref() != Some("true") {
            self.set_loading(false);
            return false;
        }

        let epoch = self.current_epoch();
        self.set_loading(true);

        match self.gateway.get_user().await {
            Ok(Some(user)) => {
                log::info!("Restored session for user {}", user.id);
                if !self.apply_if_current(epoch, |snapshot| snapshot.user = Some(user)) {
                    return false;
                }
                self.refresh().await;
                true
            }
            Ok(None) => {
                log::info!("Session marker present but no active session");
                if let Err(e) = self.preferences.remove_item(SESSION_MARKER_KEY).await {
                    log::warn!("Could not clear session marker: {}", e);
                }
                self.set_loading(false);
                false
            }
            Err(e) => {
                log::error!("Failed to restore session: {}", e);
                self.set_loading(false);
                false
            }
        }
    }

    async fn begin_session(&self, user: User) {
        self.state.send_modify(|snapshot| {
            self.epoch.fetch_add(1, Ordering::SeqCst);
            snapshot.user = Some(user);
        });
        if let Err(e) = self.preferences.set_item(SESSION_MARKER_KEY, "true").await {
            log::warn!("Could not persist session marker: {}", e);
        }
        self.refresh().await;
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<User> {
        self.set_loading(true);
        match self.gateway.login(email, password).await {
            Ok(user) => {
                log::info!("User {} signed in", user.id);
                self.begin_session(user.clone()).await;
                Ok(user)
            }
            Err(e) => {
                log::warn!("Sign-in failed: {}", e.error_code());
                self.set_loading(false);
                Err(e)
            }
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> AppResult<User> {
        self.set_loading(true);
        match self.gateway.sign_up(email, password).await {
            Ok(user) => {
                log::info!("User {} registered", user.id);
                self.begin_session(user.clone()).await;
                Ok(user)
            }
            Err(e) => {
                log::warn!("Registration failed: {}", e.error_code());
                self.set_loading(false);
                Err(e)
            }
        }
    }

    pub async fn reset_password(&self, email: &str) -> AppResult<()> {
        self.set_loading(true);
        let result = self.gateway.reset_password(email).await;
        if let Err(e) = &result {
            log::warn!("Password reset request failed: {}", e.error_code());
        }
        self.set_loading(false);
        result
    }

    /// Clears the in-memory session before touching storage. Collections are
    /// left as they are.
    pub async fn logout(&self) {
        self.state.send_modify(|snapshot| {
            self.epoch.fetch_add(1, Ordering::SeqCst);
            snapshot.user = None;
            snapshot.is_loading = false;
        });

        if let Err(e) = self.preferences.remove_item(SESSION_MARKER_KEY).await {
            log::warn!("Could not clear session marker: {}", e);
        }
        if let Err(e) = self.gateway.logout().await {
            log::warn!("Gateway sign-out failed: {}", e);
        }
        log::info!("User signed out");
    }

    /// Reloads all four collections concurrently. A failed read keeps the
    /// previous value of that collection.
    pub async fn refresh(&self) {
        let signed_in = self.state.borrow().is_authenticated();
        if !signed_in {
            return;
        }

        let epoch = self.current_epoch();
        self.set_loading(true);

        let (exams, assignments, attendance, tracks) = tokio::join!(
            self.gateway.get_exams(),
            self.gateway.get_assignments(),
            self.gateway.get_attendance(),
            self.gateway.get_tracks(),
        );

        self.apply_if_current(epoch, |snapshot| {
            keep_on_error(&mut snapshot.exams, exams, "exams");
            keep_on_error(&mut snapshot.assignments, assignments, "assignments");
            keep_on_error(&mut snapshot.attendance, attendance, "attendance");
            keep_on_error(&mut snapshot.tracks, tracks, "tracks");
            snapshot.is_loading = false;
        });
    }

    pub async fn add_exam(&self, exam: NewExam) -> AppResult<Exam> {
        self.require_user()?;
        exam.validate()?;
        let created = self.gateway.add_exam(exam).await?;
        self.refresh().await;
        Ok(created)
    }

    pub async fn add_assignment(&self, assignment: NewAssignment) -> AppResult<Assignment> {
        self.require_user()?;
        assignment.validate()?;
        let created = self.gateway.add_assignment(assignment).await?;
        self.refresh().await;
        Ok(created)
    }

    pub async fn add_attendance(&self, attendance: NewAttendance) -> AppResult<Attendance> {
        self.require_user()?;
        attendance.validate()?;
        let created = self.gateway.add_attendance(attendance).await?;
        self.refresh().await;
        Ok(created)
    }

    pub async fn update_track_score(
        &self,
        track_id: &str,
        score: f64,
    ) -> AppResult<Vec<AssessmentTrack>> {
        self.require_user()?;
        let epoch = self.current_epoch();
        let tracks = self.gateway.update_track_score(track_id, score).await?;
        self.apply_if_current(epoch, |snapshot| snapshot.tracks = tracks.clone());
        Ok(tracks)
    }

    /// Saves profile edits. The signed-in user's id and email always win over
    /// whatever the caller passed.
    pub async fn update_user(&self, user: User) -> AppResult<User> {
        let current = self.require_user()?;
        let epoch = self.current_epoch();
        let edited = User {
            id: current.id,
            email: current.email,
            ..user
        };

        let updated = self.gateway.update_user(edited).await?;
        self.apply_if_current(epoch, |snapshot| snapshot.user = Some(updated.clone()));
        Ok(updated)
    }
}
