use std::sync::Arc;

use crate::{
    auth::SessionTokens,
    config::{BackendKind, Config},
    db::{Database, KeyValueStore},
    errors::AppResult,
    gateway::{Gateway, LocalGateway, RemoteGateway},
    services::{
        session_service::SessionService,
        tracks::{verify_schedule, TRACK_SCHEDULE},
    },
};

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionService>,
    pub config: Arc<Config>,
    /// Only present for the remote backend.
    pub db: Option<Database>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        verify_schedule(&TRACK_SCHEDULE)?;

        let preferences = Arc::new(KeyValueStore::open(&config.local_store_path).await?);

        let (gateway, db): (Arc<dyn Gateway>, Option<Database>) = match config.backend {
            BackendKind::Remote => {
                let db = Database::connect(&config).await?;
                let tokens =
                    SessionTokens::new(&config.session_secret, config.session_expiration_hours);
                let remote = RemoteGateway::new(&db, tokens, preferences.clone());
                remote.ensure_indexes().await?;
                (Arc::new(remote), Some(db))
            }
            BackendKind::Local => {
                log::info!(
                    "Using local store at {}",
                    config.local_store_path.display()
                );
                (Arc::new(LocalGateway::new(preferences.clone())), None)
            }
        };

        let session = Arc::new(SessionService::new(gateway, preferences));
        session.load_theme(config.system_theme).await;

        Ok(Self {
            session,
            config: Arc::new(config),
            db,
        })
    }

    /// Builds state around an existing session service, without a database.
    pub fn with_session(session: Arc<SessionService>, config: Config) -> Self {
        Self {
            session,
            config: Arc::new(config),
            db: None,
        }
    }
}
