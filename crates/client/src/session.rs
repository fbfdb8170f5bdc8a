//! Authentication: stored credentials, login/signup and the session guard.

use std::sync::Arc;

use hexchat_shared::{ApiError, AuthRequest, DEFAULT_USERNAME};

use crate::api_client::ApiClient;
use crate::storage::{keys, Storage};

/// Token and display name of the signed-in user.
///
/// Both are kept as plain strings under `token` and `username`, the layout
/// the web client uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub username: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            username: username.into(),
        }
    }

    /// Returns `None` unless a non-empty token is stored.
    pub fn load(storage: &dyn Storage) -> Option<Self> {
        let token = storage.load_raw(keys::TOKEN).filter(|t| !t.is_empty())?;
        let username = storage.load_raw(keys::USERNAME).unwrap_or_default();
        Some(Self { token, username })
    }

    pub fn save(&self, storage: &dyn Storage) -> bool {
        storage.save_raw(keys::TOKEN, &self.token) && storage.save_raw(keys::USERNAME, &self.username)
    }

    pub fn clear(storage: &dyn Storage) {
        storage.remove(keys::TOKEN);
        storage.remove(keys::USERNAME);
    }
}

/// Stored token, if any.
pub fn stored_token(storage: &dyn Storage) -> Option<String> {
    Credentials::load(storage).map(|c| c.token)
}

/// Author name for outgoing messages.
pub fn stored_username(storage: &dyn Storage) -> String {
    storage
        .load_raw(keys::USERNAME)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_USERNAME.to_string())
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("user already exists")]
    UserExists,
    #[error("server error")]
    Server,
    #[error("signup failed")]
    Failed,
    #[error("network error: {0}")]
    Network(String),
}

impl AuthError {
    /// Translation key for the form error line.
    pub fn i18n_key(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "login.errors.invalidCredentials",
            AuthError::UserExists => "signup.errors.userExists",
            AuthError::Server => "signup.errors.serverError",
            AuthError::Failed => "signup.errors.signupFailed",
            AuthError::Network(_) => "errors.network",
        }
    }

    fn from_signup(err: &ApiError) -> Self {
        match err.status() {
            Some(409) => AuthError::UserExists,
            Some(status) if status >= 500 => AuthError::Server,
            Some(_) => AuthError::Failed,
            None => match err {
                ApiError::Network(msg) => AuthError::Network(msg.clone()),
                _ => AuthError::Failed,
            },
        }
    }
}

/// Login, signup and logout against the REST API.
#[derive(Clone)]
pub struct SessionClient {
    api: ApiClient,
    storage: Arc<dyn Storage>,
}

impl SessionClient {
    pub fn new(api: ApiClient, storage: Arc<dyn Storage>) -> Self {
        Self { api, storage }
    }

    /// Any failure, including an unreachable server, reads as bad credentials.
    pub async fn login(&self, username: &str, password: &str) -> Result<Credentials, AuthError> {
        let req = AuthRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        match self.api.login(&req).await {
            Ok(resp) => Ok(self.store(resp.token, resp.username, username)),
            Err(e) => {
                crate::log_warn!("login failed for {}: {}", username, e);
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    pub async fn signup(&self, username: &str, password: &str) -> Result<Credentials, AuthError> {
        let req = AuthRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        match self.api.signup(&req).await {
            Ok(resp) => Ok(self.store(resp.token, resp.username, username)),
            Err(e) => {
                crate::log_warn!("signup failed for {}: {}", username, e);
                Err(AuthError::from_signup(&e))
            }
        }
    }

    pub fn logout(&self) {
        Credentials::clear(self.storage.as_ref());
        crate::log_info!("logged out");
    }

    fn store(&self, token: String, username: Option<String>, submitted: &str) -> Credentials {
        let username = username
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| submitted.to_string());
        let creds = Credentials { token, username };
        if !creds.save(self.storage.as_ref()) {
            crate::log_warn!("could not persist credentials for {}", creds.username);
        }
        crate::log_info!("signed in as {}", creds.username);
        creds
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Pending,
    Granted,
    Denied,
}

/// Decides whether the protected chat view may be entered.
pub struct SessionGuard {
    api: ApiClient,
    storage: Arc<dyn Storage>,
    state: GuardState,
}

impl SessionGuard {
    /// `api` should carry the base URL; the stored token is attached per check.
    pub fn new(api: ApiClient, storage: Arc<dyn Storage>) -> Self {
        Self {
            api,
            storage,
            state: GuardState::Pending,
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Validate the stored token with an authenticated channel listing.
    /// Only the status counts.
    ///
    /// No token means `Denied` without touching the network. A rejected or
    /// failed check clears the stored credentials.
    pub async fn verify(&mut self) -> GuardState {
        self.state = GuardState::Pending;

        let Some(token) = stored_token(self.storage.as_ref()) else {
            self.state = GuardState::Denied;
            return self.state;
        };

        let api = self.api.clone().with_token(Some(token));
        self.state = match api.check_access().await {
            Ok(_) => GuardState::Granted,
            Err(e) => {
                crate::log_warn!("stored token rejected: {}", e);
                Credentials::clear(self.storage.as_ref());
                GuardState::Denied
            }
        };
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn credentials_round_trip_as_plain_strings() {
        let storage = MemoryStorage::new();
        assert_eq!(Credentials::load(&storage), None);

        assert!(Credentials::new("abc", "ann").save(&storage));
        assert_eq!(storage.load_raw(keys::TOKEN).as_deref(), Some("abc"));
        assert_eq!(Credentials::load(&storage), Some(Credentials::new("abc", "ann")));

        Credentials::clear(&storage);
        assert_eq!(Credentials::load(&storage), None);
        assert!(!storage.exists(keys::USERNAME));
    }

    #[test]
    fn empty_token_is_no_session() {
        let storage = MemoryStorage::new();
        storage.save_raw(keys::TOKEN, "");
        assert_eq!(stored_token(&storage), None);
    }

    #[test]
    fn username_falls_back_to_anonymous() {
        let storage = MemoryStorage::new();
        assert_eq!(stored_username(&storage), "anonymous");
        storage.save_raw(keys::USERNAME, "ann");
        assert_eq!(stored_username(&storage), "ann");
    }

    #[test]
    fn signup_errors_map_by_status() {
        let http = |status| ApiError::Http { status, body: String::new() };
        assert_eq!(AuthError::from_signup(&http(409)), AuthError::UserExists);
        assert_eq!(AuthError::from_signup(&http(500)), AuthError::Server);
        assert_eq!(AuthError::from_signup(&http(503)), AuthError::Server);
        assert_eq!(AuthError::from_signup(&http(400)), AuthError::Failed);
        assert_eq!(
            AuthError::from_signup(&ApiError::Network("refused".into())),
            AuthError::Network("refused".into())
        );
        assert_eq!(AuthError::UserExists.i18n_key(), "signup.errors.userExists");
    }

    #[tokio::test]
    async fn guard_denies_without_token() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        // Unroutable base URL: the check must not reach the network.
        let api = ApiClient::new().with_base_url("http://127.0.0.1:9");
        let mut guard = SessionGuard::new(api, storage);
        assert_eq!(guard.state(), GuardState::Pending);
        assert_eq!(guard.verify().await, GuardState::Denied);
    }
}
