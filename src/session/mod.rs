//! Authenticated access to the Netw API.
//!
//! [`SessionClient`] owns the credential lifecycle: it logs in, persists the
//! token pair, attaches the bearer token to every request and refreshes it
//! at most once per request when it is rejected or expired.

pub mod credential;
pub mod storage;
pub mod transport;

pub use credential::{decode_session_user, AuthResponse, Credential, SessionUser, TokenDecodeError};
pub use storage::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

use chrono::Utc;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::AppConfig;
use crate::error::{NetwError, NetwResult};
use crate::models::ApiEnvelope;
use credential::AuthBody;

const AUTH_USER_ENDPOINT: &str = "/Auth/AuthUser";
const REFRESH_TOKEN_ENDPOINT: &str = "/Auth/refreshToken";

/// A call against an API endpoint, relative to the configured base URL
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub endpoint: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, endpoint).with_body(body)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

// Whether this request has already spent its one refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetryState {
    NotAttempted,
    Attempted,
}

pub struct SessionClient {
    base_url: String,
    client_id: String,
    client_secret: String,
    timeout: Duration,
    access_ttl: chrono::Duration,
    refresh_ttl: chrono::Duration,
    transport: Arc<dyn Transport>,
    storage: Arc<dyn CredentialStore>,
}

impl SessionClient {
    pub fn new(
        config: &AppConfig,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn CredentialStore>,
    ) -> NetwResult<Self> {
        let base_url = config.base_url()?;

        Ok(Self {
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            client_id: config.api.client_id.clone(),
            client_secret: config.api.client_secret.clone(),
            timeout: config.request_timeout(),
            access_ttl: config.access_token_ttl()?,
            refresh_ttl: config.refresh_token_ttl()?,
            transport,
            storage,
        })
    }

    /// Session client over the production reqwest transport
    pub fn with_reqwest(config: &AppConfig, storage: Arc<dyn CredentialStore>) -> NetwResult<Self> {
        Self::new(config, Arc::new(ReqwestTransport::new()), storage)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint_url(&self, endpoint: &str) -> NetwResult<Url> {
        let joined = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        Url::parse(&joined).map_err(|e| NetwError::Config(format!("invalid endpoint '{}': {}", joined, e)))
    }

    // ---- Authentication ----

    /// Exchange a user's login and password for a credential
    pub async fn authenticate_with_password(&self, username: &str, password: &str) -> NetwResult<Credential> {
        let body = json!({
            "username": username,
            "password": password,
            "return": "TOKEN"
        });
        self.authenticate(AUTH_USER_ENDPOINT, body, "password login").await
    }

    /// Service-account login with the configured application id and secret
    pub async fn authenticate_with_app_credentials(&self) -> NetwResult<Credential> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(NetwError::auth(
                "application credentials are not configured (NETW_CLIENT_ID / NETW_CLIENT_SECRET)",
            ));
        }

        let body = json!({
            "client_name": self.client_id,
            "client_secret": self.client_secret,
            "return": "PTOKEN"
        });
        self.authenticate(AUTH_USER_ENDPOINT, body, "application login").await
    }

    /// Exchange the stored refresh token for a new credential
    pub async fn refresh(&self) -> NetwResult<Credential> {
        let refresh_token = self
            .credential()
            .and_then(|c| c.live_refresh_token(Utc::now()).map(str::to_string))
            .ok_or_else(|| NetwError::auth("no refresh token available"))?;

        let body = json!({ "refreshtoken": refresh_token });
        self.authenticate(REFRESH_TOKEN_ENDPOINT, body, "token refresh").await
    }

    async fn authenticate(&self, endpoint: &str, body: Value, operation: &str) -> NetwResult<Credential> {
        let request = HttpRequest {
            method: Method::POST,
            url: self.endpoint_url(endpoint)?,
            bearer: None,
            query: Vec::new(),
            body: Some(body),
            timeout: self.timeout,
        };

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            warn!("{} rejected with status {}", operation, response.status);
            let detail = serde_json::from_str::<ApiEnvelope<Value>>(&response.body)
                .map(|envelope| envelope.failure_message())
                .unwrap_or_else(|_| format!("status {}", response.status));
            return Err(NetwError::auth(format!("{} rejected: {}", operation, detail)));
        }

        let auth = serde_json::from_str::<AuthBody>(&response.body)
            .map_err(|e| NetwError::auth(format!("{} returned an unreadable body: {}", operation, e)))?
            .into_response()
            .map_err(|msg| NetwError::auth(format!("{} rejected: {}", operation, msg)))?;

        let credential = Credential::issue(&auth, Utc::now(), self.access_ttl, self.refresh_ttl);
        self.storage.save(&credential)?;

        info!("{} succeeded, access token valid until {}", operation, credential.access_expires_at);
        Ok(credential)
    }

    /// Forget the stored credential. There is no remote logout endpoint.
    pub fn logout(&self) -> NetwResult<()> {
        info!("Clearing stored credential");
        self.storage.clear()
    }

    // ---- Credential state ----

    /// Stored credential, if readable
    pub fn credential(&self) -> Option<Credential> {
        match self.storage.load() {
            Ok(credential) => credential,
            Err(e) => {
                warn!("Unable to read credential: {}", e);
                None
            }
        }
    }

    /// True iff a non-expired access token is present
    pub fn is_authenticated(&self) -> bool {
        self.credential()
            .map(|c| c.live_access_token(Utc::now()).is_some())
            .unwrap_or(false)
    }

    /// Identity from the live access token; `None` when absent or malformed
    pub fn current_user(&self) -> Option<SessionUser> {
        let credential = self.credential()?;
        let token = credential.live_access_token(Utc::now())?;
        match decode_session_user(token) {
            Ok(user) => Some(user),
            Err(e) => {
                debug!("Access token has no readable identity: {}", e);
                None
            }
        }
    }

    // ---- Authenticated requests ----

    /// Issue an authenticated request and decode its JSON body.
    ///
    /// An expired access token is refreshed before sending; a `401` is
    /// answered with one refresh and one retry. Once the refresh is spent,
    /// any further rejection clears the credential and yields
    /// [`NetwError::SessionExpired`].
    pub async fn request<T: DeserializeOwned>(&self, request: &ApiRequest) -> NetwResult<T> {
        let mut state = RetryState::NotAttempted;
        let mut token = self.access_token_for_request(&mut state).await?;

        loop {
            let response = self.send(request, token.as_deref()).await?;

            if !response.is_unauthorized() {
                return self.decode_response(request, response);
            }

            match state {
                RetryState::NotAttempted => {
                    warn!("{} {} unauthorized, refreshing token", request.method, request.endpoint);
                    state = RetryState::Attempted;
                    token = Some(self.refresh_or_expire().await?.access_token);
                }
                RetryState::Attempted => {
                    error!("{} {} still unauthorized after refresh", request.method, request.endpoint);
                    self.expire_session();
                    return Err(NetwError::SessionExpired);
                }
            }
        }
    }

    async fn access_token_for_request(&self, state: &mut RetryState) -> NetwResult<Option<String>> {
        let credential = match self.credential() {
            Some(credential) => credential,
            None => return Ok(None),
        };

        let now = Utc::now();
        if let Some(token) = credential.live_access_token(now) {
            return Ok(Some(token.to_string()));
        }
        if credential.live_refresh_token(now).is_none() {
            return Ok(None);
        }

        debug!("Access token expired, refreshing before request");
        *state = RetryState::Attempted;
        Ok(Some(self.refresh_or_expire().await?.access_token))
    }

    async fn refresh_or_expire(&self) -> NetwResult<Credential> {
        match self.refresh().await {
            Ok(credential) => Ok(credential),
            Err(e) => {
                error!("Token refresh failed: {}", e);
                self.expire_session();
                Err(NetwError::SessionExpired)
            }
        }
    }

    fn expire_session(&self) {
        if let Err(e) = self.storage.clear() {
            warn!("Unable to clear expired credential: {}", e);
        }
    }

    async fn send(&self, request: &ApiRequest, token: Option<&str>) -> NetwResult<HttpResponse> {
        let http_request = HttpRequest {
            method: request.method.clone(),
            url: self.endpoint_url(&request.endpoint)?,
            bearer: token.map(str::to_string),
            query: request.query.clone(),
            body: request.body.clone(),
            timeout: self.timeout,
        };
        self.transport.send(http_request).await
    }

    fn decode_response<T: DeserializeOwned>(&self, request: &ApiRequest, response: HttpResponse) -> NetwResult<T> {
        if response.is_success() {
            return serde_json::from_str(&response.body).map_err(|e| {
                NetwError::decode(format!("{} {}: {}", request.method, request.endpoint, e))
            });
        }

        if response.status == 404 {
            return Err(NetwError::not_found(request.endpoint.clone()));
        }

        let message = serde_json::from_str::<ApiEnvelope<Value>>(&response.body)
            .map(|envelope| envelope.failure_message())
            .unwrap_or_else(|_| format!("{} {} failed with status {}", request.method, request.endpoint, response.status));
        Err(NetwError::api(response.status, message))
    }
}
