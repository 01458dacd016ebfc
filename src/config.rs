use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_CLAUDE_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_CLAUDE_MODEL: &str = "claude-3-opus-20240229";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:5000/callback";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:5000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not configured")]
    Missing(&'static str),
}

/// Completion service settings
#[derive(Clone, Debug)]
pub struct ClaudeConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
}

impl ClaudeConfig {
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::Missing("API key"))
    }
}

#[derive(Clone, Debug)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
}

impl SpotifyConfig {
    /// Client id and secret, both required for the code flow
    pub fn credentials(&self) -> Result<(&str, &str), ConfigError> {
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) => Ok((id, secret)),
            _ => Err(ConfigError::Missing("Spotify client ID or secret")),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BillingEnvironment {
    #[default]
    Sandbox,
    Live,
}

impl BillingEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "live" => BillingEnvironment::Live,
            _ => BillingEnvironment::Sandbox,
        }
    }

    pub fn api_url(&self) -> &'static str {
        match self {
            BillingEnvironment::Sandbox => "https://api-sandbox.gocardless.com",
            BillingEnvironment::Live => "https://api.gocardless.com",
        }
    }
}

#[derive(Clone, Debug)]
pub struct BillingConfig {
    pub access_token: Option<String>,
    pub environment: BillingEnvironment,
    /// Overrides the environment's API host
    pub api_url: Option<String>,
}

impl BillingConfig {
    pub fn access_token(&self) -> Result<&str, ConfigError> {
        self.access_token
            .as_deref()
            .ok_or(ConfigError::Missing("Payment provider access token"))
    }

    pub fn base_url(&self) -> &str {
        self.api_url
            .as_deref()
            .unwrap_or_else(|| self.environment.api_url())
            .trim_end_matches('/')
    }
}

/// Everything the handlers need, built once at startup.
///
/// Missing credentials are kept as `None` so the server still starts; the
/// affected routes answer with a 500 naming what is missing.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub claude: ClaudeConfig,
    pub spotify: SpotifyConfig,
    pub billing: BillingConfig,
    pub public_base_url: String,
    pub static_dir: PathBuf,
}

impl AppConfig {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            claude: ClaudeConfig {
                api_key: get("CLAUDE_API_KEY"),
                api_url: get("CLAUDE_API_URL").unwrap_or_else(|| DEFAULT_CLAUDE_API_URL.to_string()),
                model: get("CLAUDE_MODEL").unwrap_or_else(|| DEFAULT_CLAUDE_MODEL.to_string()),
            },
            spotify: SpotifyConfig {
                client_id: get("SPOTIFY_CLIENT_ID"),
                client_secret: get("SPOTIFY_CLIENT_SECRET"),
                redirect_uri: get("SPOTIFY_REDIRECT_URI")
                    .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
            },
            billing: BillingConfig {
                access_token: get("GOCARDLESS_ACCESS_TOKEN"),
                environment: get("GOCARDLESS_ENVIRONMENT")
                    .map(|v| BillingEnvironment::parse(&v))
                    .unwrap_or_default(),
                api_url: get("GOCARDLESS_API_URL"),
            },
            public_base_url: get("PUBLIC_BASE_URL")
                .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            static_dir: get("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static")),
        }
    }

    /// Log-safe summary of which integrations are usable.
    pub fn describe(&self) -> String {
        let flag = |present: bool| if present { "configured" } else { "missing" };
        format!(
            "completion: {}, spotify: {}, billing: {} ({:?})",
            flag(self.claude.api_key.is_some()),
            flag(self.spotify.credentials().is_ok()),
            flag(self.billing.access_token.is_some()),
            self.billing.environment,
        )
    }
}
