pub mod key_value;

pub use key_value::KeyValueStore;

use mongodb::{
    bson::doc,
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection, Database as MongoDatabase,
};
use std::time::Duration;

use crate::{config::Config, errors::AppResult};

/// Collection names of the remote store.
pub mod collections {
    pub const USERS: &str = "users";
    pub const CREDENTIALS: &str = "credentials";
    pub const EXAMS: &str = "exams";
    pub const ASSIGNMENTS: &str = "assignments";
    pub const ATTENDANCE: &str = "attendance";
    pub const TRACKS: &str = "tracks";
    pub const PASSWORD_RESETS: &str = "password_resets";
}

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the tracker's MongoDB database.
#[derive(Clone)]
pub struct Database {
    client: Client,
    database: MongoDatabase,
}

impl Database {
    /// Connects and pings the server.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let db = Self::connect_lazy(config).await?;
        db.health_check().await?;

        log::info!("Connected to MongoDB database '{}'", config.mongo_db_name);
        Ok(db)
    }

    /// Builds the client without contacting the server; the driver connects
    /// on first use.
    pub async fn connect_lazy(config: &Config) -> AppResult<Self> {
        let mut options = ClientOptions::parse(&config.mongo_conn_string).await?;
        options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        options.max_pool_size = Some(4);
        options.connect_timeout = Some(CONNECT_TIMEOUT);
        options.server_selection_timeout = Some(CONNECT_TIMEOUT);

        let client = Client::with_options(options)?;
        Ok(Self {
            database: client.database(&config.mongo_db_name),
            client,
        })
    }

    pub fn collection<T>(&self, name: &str) -> Collection<T>
    where
        T: Send + Sync,
    {
        self.database.collection(name)
    }

    pub async fn health_check(&self) -> AppResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }
}
