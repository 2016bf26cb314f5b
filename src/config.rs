use std::{env, path::PathBuf, str::FromStr};

use secrecy::{ExposeSecret, SecretString};

use crate::{
    errors::{AppError, AppResult},
    models::domain::Theme,
};

const DEFAULT_SESSION_SECRET: &str = "dev_session_secret_change_in_production";

/// Which backing store the gateway talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Remote,
    Local,
}

impl FromStr for BackendKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" | "mongo" | "mongodb" => Ok(BackendKind::Remote),
            "local" | "offline" | "demo" => Ok(BackendKind::Local),
            other => Err(AppError::ValidationError(format!(
                "Unknown backend '{}', expected 'remote' or 'local'",
                other
            ))),
        }
    }
}

impl BackendKind {
    /// Reads the `BACKEND` setting. Unset means remote; an unrecognized
    /// value is logged and also falls back to remote.
    fn from_setting(value: Option<&str>) -> Self {
        match value.map(str::parse::<BackendKind>) {
            None => BackendKind::Remote,
            Some(Ok(kind)) => kind,
            Some(Err(e)) => {
                log::warn!("{}; falling back to the remote backend", e);
                BackendKind::Remote
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub backend: BackendKind,
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub local_store_path: PathBuf,
    pub session_secret: SecretString,
    pub session_expiration_hours: i64,
    pub system_theme: Theme,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub ui_origin: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            backend: BackendKind::from_setting(env::var("BACKEND").ok().as_deref()),
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "study-tracker-local".to_string()),
            local_store_path: env::var("LOCAL_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("study-tracker.json")),
            session_secret: SecretString::from(
                env::var("SESSION_SECRET").unwrap_or_else(|_| DEFAULT_SESSION_SECRET.to_string()),
            ),
            session_expiration_hours: env::var("SESSION_EXPIRATION_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(168),
            system_theme: env::var("PREFERS_COLOR_SCHEME")
                .ok()
                .and_then(|t| Theme::from_preference(&t))
                .unwrap_or(Theme::Light),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "127.0.0.1".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8787),
            ui_origin: env::var("UI_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
        }
    }

    /// Rejects configurations that would sign sessions with a guessable key.
    /// The local backend never issues tokens, so it is always accepted.
    pub fn validate(&self) -> AppResult<()> {
        if self.backend == BackendKind::Local {
            return Ok(());
        }

        let secret = self.session_secret.expose_secret();
        if secret == DEFAULT_SESSION_SECRET {
            return Err(AppError::ValidationError(
                "SESSION_SECRET is using the default value".to_string(),
            ));
        }
        if secret.len() < 32 {
            return Err(AppError::ValidationError(format!(
                "SESSION_SECRET is too short ({}), must be at least 32 characters",
                secret.len()
            )));
        }
        if self.session_expiration_hours <= 0 {
            return Err(AppError::ValidationError(
                "SESSION_EXPIRATION_HOURS must be positive".to_string(),
            ));
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            backend: BackendKind::Local,
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "study-tracker-test".to_string(),
            local_store_path: PathBuf::from("study-tracker-test.json"),
            session_secret: SecretString::from("test_session_secret_key".to_string()),
            session_expiration_hours: 1,
            system_theme: Theme::Light,
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8787,
            ui_origin: "http://localhost:5173".to_string(),
        }
    }
}
