use super::error::{CouchDaoError, CouchResult};

const BASE_URL_ENV: &str = "COUCH_BASE_URL";
const DATABASE_ENV: &str = "COUCH_DB";
const DEFAULT_DATABASE: &str = "golf_comp";

/// Runtime configuration describing how to connect to CouchDB.
#[derive(Debug, Clone)]
pub struct CouchConfig {
    pub base_url: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl CouchConfig {
    /// Construct a configuration from explicit base URL and database name.
    pub fn new(base_url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            database: database.into(),
            username: None,
            password: None,
        }
    }

    /// Attach basic-auth credentials to the configuration.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Whether the environment asks for the CouchDB backend at all.
    pub fn is_configured() -> bool {
        std::env::var_os(BASE_URL_ENV).is_some_and(|value| !value.is_empty())
    }

    /// Build a configuration by reading the expected environment variables.
    ///
    /// `COUCH_DB` falls back to `golf_comp` when unset.
    pub fn from_env() -> CouchResult<Self> {
        let base_url = std::env::var(BASE_URL_ENV)
            .map_err(|_| CouchDaoError::MissingEnvVar { var: BASE_URL_ENV })?;
        let database =
            std::env::var(DATABASE_ENV).unwrap_or_else(|_| DEFAULT_DATABASE.to_string());

        let mut config = Self::new(base_url, database);

        if let (Some(username), Some(password)) = (
            std::env::var("COUCH_USERNAME").ok(),
            std::env::var("COUCH_PASSWORD").ok(),
        ) {
            config = config.with_credentials(username, password);
        }

        Ok(config)
    }
}
