//! Client configuration from environment variables.
//!
//! Every setting has a default so the client starts against a local backend
//! with zero configuration.

use std::path::PathBuf;

use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:5001";

/// Client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the REST API.
    /// Env: `HEXCHAT_API_URL`
    /// Default: `http://localhost:5001`
    pub api_url: String,

    /// Base URL of the socket.io server.
    /// Env: `HEXCHAT_SOCKET_URL`
    /// Default: `api_url` with `http` mapped to `ws` and `https` to `wss`.
    pub socket_url: String,

    /// Directory for persisted state.
    /// Env: `HEXCHAT_DATA_DIR`
    /// Default: none, meaning the platform config directory.
    pub data_dir: Option<PathBuf>,

    /// Credentials for a non-interactive login.
    /// Env: `HEXCHAT_USERNAME`, `HEXCHAT_PASSWORD`
    pub login: Option<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            socket_url: http_to_ws(DEFAULT_API_URL),
            data_dir: None,
            login: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = var("HEXCHAT_API_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let socket_url = var("HEXCHAT_SOCKET_URL").unwrap_or_else(|| http_to_ws(&api_url));
        let data_dir = var("HEXCHAT_DATA_DIR").map(PathBuf::from);
        let login = var("HEXCHAT_USERNAME").zip(var("HEXCHAT_PASSWORD"));

        Self {
            api_url,
            socket_url,
            data_dir,
            login,
        }
    }
}

/// Convert an HTTP/HTTPS URL to WS/WSS. Other inputs are returned unchanged.
pub fn http_to_ws(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };
    let scheme = match parsed.scheme() {
        "https" => "wss",
        "http" => "ws",
        _ => return url.to_string(),
    };
    if parsed.set_scheme(scheme).is_err() {
        return url.to_string();
    }
    parsed.as_str().trim_end_matches('/').to_string()
}
