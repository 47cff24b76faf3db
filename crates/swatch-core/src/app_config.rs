use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Realtime Database root, e.g. `https://my-app-default-rtdb.firebaseio.com`.
    pub firebase_database_url: String,
    pub firebase_storage_bucket: String,
    pub firebase_storage_base_url: String,
    /// Passed as `auth` to the database and as a bearer token to storage.
    pub firebase_auth_token: Option<String>,
    pub webdriver_url: String,
    /// Root of the local staging area; per-kind subdirectories live below it.
    pub staging_dir: PathBuf,
    /// Top-level blob store prefix for uploaded media.
    pub media_root: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub fetch_max_attempts: u32,
    pub fetch_backoff_base_ms: u64,
    /// `0` waits indefinitely for navigation.
    pub page_load_timeout_secs: u64,
    pub optional_element_timeout_ms: u64,
}

impl AppConfig {
    #[must_use]
    pub fn image_staging_dir(&self) -> PathBuf {
        self.staging_dir.join("images")
    }

    #[must_use]
    pub fn big_image_staging_dir(&self) -> PathBuf {
        self.staging_dir.join("big")
    }

    #[must_use]
    pub fn video_staging_dir(&self) -> PathBuf {
        self.staging_dir.join("video")
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("firebase_database_url", &self.firebase_database_url)
            .field("firebase_storage_bucket", &self.firebase_storage_bucket)
            .field("firebase_storage_base_url", &self.firebase_storage_base_url)
            .field(
                "firebase_auth_token",
                &self.firebase_auth_token.as_ref().map(|_| "[redacted]"),
            )
            .field("webdriver_url", &self.webdriver_url)
            .field("staging_dir", &self.staging_dir)
            .field("media_root", &self.media_root)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("fetch_max_attempts", &self.fetch_max_attempts)
            .field("fetch_backoff_base_ms", &self.fetch_backoff_base_ms)
            .field("page_load_timeout_secs", &self.page_load_timeout_secs)
            .field(
                "optional_element_timeout_ms",
                &self.optional_element_timeout_ms,
            )
            .finish()
    }
}
