//! HTTP API client with bearer-token authentication.

use hexchat_shared::{
    ApiError, AuthRequest, AuthResponse, NewChannelAttributes, NewMessageAttributes,
    RenameChannelRequest, ResourceDocument,
};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub const CHANNELS_PATH: &str = "/api/v1/channels";
pub const MESSAGES_PATH: &str = "/api/v1/messages";
pub const LOGIN_PATH: &str = "/api/v1/login";
pub const SIGNUP_PATH: &str = "/api/v1/signup";

/// HTTP client for the chat REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: String::new(),
            token: None,
        }
    }

    /// Set the base URL for API requests
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Attach a bearer token to every request
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if self.base_url.is_empty() {
            if path.starts_with('/') {
                path.to_string()
            } else {
                format!("/{path}")
            }
        } else {
            let base = self.base_url.trim_end_matches('/');
            let path = path.trim_start_matches('/');
            format!("{base}/{path}")
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let rb = self.client.request(method, self.url(path));
        match &self.token {
            Some(token) => rb.bearer_auth(token),
            None => rb,
        }
    }

    /// Send a request and return the raw body of a success response.
    async fn send_raw(&self, rb: RequestBuilder) -> Result<String, ApiError> {
        let resp = rb.send().await.map_err(|e| ApiError::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        let is_success = resp.status().is_success();

        let text = resp
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("failed to read body: {e}")))?;

        if !is_success {
            return Err(ApiError::Http { status, body: text });
        }
        Ok(text)
    }

    /// Send a request and decode the response body.
    ///
    /// An empty body decodes as `null` and a body that is not JSON as a
    /// string, so any 2xx response can still be read as a [`Value`].
    async fn send<TRes: DeserializeOwned>(&self, rb: RequestBuilder) -> Result<TRes, ApiError> {
        let text = self.send_raw(rb).await?;
        serde_json::from_value(body_value(text)).map_err(|e| ApiError::Deserialize(e.to_string()))
    }

    async fn send_json<TReq: Serialize, TRes: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &TReq,
    ) -> Result<TRes, ApiError> {
        let body_bytes = serde_json::to_vec(body).map_err(|e| ApiError::Deserialize(e.to_string()))?;
        let rb = self
            .request(method, path)
            .body(body_bytes)
            .header("Content-Type", "application/json");
        self.send(rb).await
    }

    /// Make a GET request
    pub async fn get_json<TRes: DeserializeOwned>(&self, path: &str) -> Result<TRes, ApiError> {
        self.send(self.request(Method::GET, path)).await
    }

    /// Make a POST request with JSON body
    pub async fn post_json<TReq: Serialize, TRes: DeserializeOwned>(
        &self,
        path: &str,
        body: &TReq,
    ) -> Result<TRes, ApiError> {
        self.send_json(Method::POST, path, body).await
    }

    /// Make a PATCH request with JSON body
    pub async fn patch_json<TReq: Serialize, TRes: DeserializeOwned>(
        &self,
        path: &str,
        body: &TReq,
    ) -> Result<TRes, ApiError> {
        self.send_json(Method::PATCH, path, body).await
    }

    /// Make a DELETE request, returning whatever body the server sent
    pub async fn delete_json<TRes: DeserializeOwned>(&self, path: &str) -> Result<TRes, ApiError> {
        self.send(self.request(Method::DELETE, path)).await
    }

    /// Succeeds on any 2xx answer to an authenticated channel listing,
    /// whatever the body.
    pub async fn check_access(&self) -> Result<(), ApiError> {
        self.send_raw(self.request(Method::GET, CHANNELS_PATH))
            .await
            .map(|_| ())
    }

    // --- Chat API methods ---
    //
    // Responses stay as raw JSON: the store normalizes every accepted shape.

    pub async fn fetch_channels(&self) -> Result<Value, ApiError> {
        self.get_json(CHANNELS_PATH).await
    }

    pub async fn fetch_messages(&self) -> Result<Value, ApiError> {
        self.get_json(MESSAGES_PATH).await
    }

    pub async fn post_message(
        &self,
        body: &str,
        channel_id: i64,
        username: Option<String>,
    ) -> Result<Value, ApiError> {
        let doc = ResourceDocument::new(NewMessageAttributes {
            body: body.to_string(),
            channel_id,
            username,
        });
        self.post_json(MESSAGES_PATH, &doc).await
    }

    pub async fn create_channel(&self, name: &str) -> Result<Value, ApiError> {
        let doc = ResourceDocument::new(NewChannelAttributes {
            name: name.to_string(),
        });
        self.post_json(CHANNELS_PATH, &doc).await
    }

    pub async fn rename_channel(&self, id: i64, name: &str) -> Result<Value, ApiError> {
        let req = RenameChannelRequest {
            name: name.to_string(),
        };
        self.patch_json(&format!("{CHANNELS_PATH}/{id}"), &req).await
    }

    pub async fn remove_channel(&self, id: i64) -> Result<Value, ApiError> {
        self.delete_json(&format!("{CHANNELS_PATH}/{id}")).await
    }

    // --- Auth API methods ---

    pub async fn login(&self, req: &AuthRequest) -> Result<AuthResponse, ApiError> {
        self.post_json(LOGIN_PATH, req).await
    }

    pub async fn signup(&self, req: &AuthRequest) -> Result<AuthResponse, ApiError> {
        self.post_json(SIGNUP_PATH, req).await
    }
}

fn body_value(text: String) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}
