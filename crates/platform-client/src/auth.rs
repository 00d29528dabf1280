//! OAuth 2.0 installed-application flow against the platform's identity
//! provider.
//!
//! ## Flow
//! 1. Read the client secret issued for this tool (`installed` or `web` section)
//! 2. Read the stored token; refresh it when it is about to expire
//! 3. If there is no usable token, print the consent URL, read the code the
//!    operator pastes back, exchange it, and store the result
//!
//! The token file uses the quickstart layout (`expiry_date` in epoch
//! milliseconds) so tokens written by other tooling keep working.

use chrono::{DateTime, Duration, Utc};
use oauth2::basic::{BasicClient, BasicErrorResponse, BasicTokenResponse};
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret as OAuthClientSecret, CsrfToken,
    EndpointNotSet, EndpointSet, RedirectUrl, RefreshToken, RequestTokenError, Scope,
    TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{PlatformError, Result};

/// Full read/write access to the user's account; playlist inserts need it.
pub const YOUTUBE_SCOPE: &str = "https://www.googleapis.com/auth/youtube";

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// How close to expiry a stored token may be before it is refreshed
const REFRESH_MARGIN_MINUTES: i64 = 5;

// =============================================================================
// Client secret
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

/// OAuth client registration for this tool
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
    pub auth_uri: Option<String>,
    pub token_uri: Option<String>,
}

impl ClientSecret {
    /// Load the client secret JSON downloaded from the developer console.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PlatformError::Credentials(format!(
                "Error loading client secret file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let file: ClientSecretFile = serde_json::from_str(content)
            .map_err(|e| PlatformError::Credentials(format!("Malformed client secret: {e}")))?;
        file.installed.or(file.web).ok_or_else(|| {
            PlatformError::Credentials(
                "Client secret has neither an 'installed' nor a 'web' section".to_string(),
            )
        })
    }

    fn redirect_uri(&self) -> Result<&str> {
        self.redirect_uris
            .first()
            .map(String::as_str)
            .ok_or_else(|| PlatformError::Credentials("Client secret lists no redirect URI".into()))
    }

    fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI)
    }

    fn auth_uri(&self) -> &str {
        self.auth_uri.as_deref().unwrap_or(DEFAULT_AUTH_URI)
    }

    /// Client credentials travel in the form body, as installed apps expect.
    fn oauth_client(&self) -> Result<OAuthClient> {
        let invalid = |what: &str, e: oauth2::url::ParseError| {
            PlatformError::Credentials(format!("Invalid {what} in client secret: {e}"))
        };
        Ok(BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(OAuthClientSecret::new(self.client_secret.clone()))
            .set_auth_uri(
                AuthUrl::new(self.auth_uri().to_string()).map_err(|e| invalid("auth URI", e))?,
            )
            .set_token_uri(
                TokenUrl::new(self.token_uri().to_string()).map_err(|e| invalid("token URI", e))?,
            )
            .set_redirect_uri(
                RedirectUrl::new(self.redirect_uri()?.to_string())
                    .map_err(|e| invalid("redirect URI", e))?,
            )
            .set_auth_type(AuthType::RequestBody))
    }
}

// =============================================================================
// Stored token
// =============================================================================

/// Token persisted between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Expiry as epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<i64>,
}

impl StoredToken {
    /// True when the token expires before `now + margin`. Tokens without a
    /// recorded expiry are assumed valid and left to the API to reject.
    pub fn expires_within(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        match self.expiry_date {
            Some(expiry_ms) => expiry_ms <= (now + margin).timestamp_millis(),
            None => false,
        }
    }

    /// Convert a token endpoint response, stamping the expiry relative to `now`.
    pub fn from_response(response: &BasicTokenResponse, now: DateTime<Utc>) -> Self {
        let scope = response.scopes().map(|scopes| {
            scopes
                .iter()
                .map(|scope| scope.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        });
        Self {
            access_token: response.access_token().secret().clone(),
            refresh_token: response.refresh_token().map(|token| token.secret().clone()),
            scope,
            token_type: Some(response.token_type().as_ref().to_string()),
            expiry_date: response
                .expires_in()
                .and_then(|expires_in| Duration::from_std(expires_in).ok())
                .map(|expires_in| (now + expires_in).timestamp_millis()),
        }
    }
}

fn token_error<RE>(err: RequestTokenError<RE, BasicErrorResponse>) -> PlatformError
where
    RE: std::error::Error + 'static,
{
    match err {
        RequestTokenError::ServerResponse(response) => {
            PlatformError::Credentials(format!("Token endpoint rejected the request: {response}"))
        }
        RequestTokenError::Parse(e, body) => PlatformError::Credentials(format!(
            "Malformed token response ({e}): {}",
            String::from_utf8_lossy(&body)
        )),
        other => PlatformError::Credentials(format!("Token request failed: {other}")),
    }
}

// =============================================================================
// Authenticator
// =============================================================================

/// Client with the authorization and token endpoints configured
type OAuthClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Produces an access token for the platform client.
pub struct Authenticator {
    oauth: OAuthClient,
    token_path: PathBuf,
    http: reqwest::Client,
}

impl Authenticator {
    /// `http` should not follow redirects; the token endpoint never issues them.
    pub fn new(
        secret: ClientSecret,
        token_path: impl Into<PathBuf>,
        http: reqwest::Client,
    ) -> Result<Self> {
        Ok(Self {
            oauth: secret.oauth_client()?,
            token_path: token_path.into(),
            http,
        })
    }

    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    /// Consent page the operator must visit to grant access.
    pub fn authorization_url(&self) -> String {
        let (url, _state) = self
            .oauth
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new(YOUTUBE_SCOPE.to_string()))
            .add_extra_param("access_type", "offline")
            .url();
        url.to_string()
    }

    /// Trade an authorization code for a token.
    pub async fn exchange_code(&self, code: &str, now: DateTime<Utc>) -> Result<StoredToken> {
        let response = self
            .oauth
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http)
            .await
            .map_err(token_error)?;
        Ok(StoredToken::from_response(&response, now))
    }

    /// Refresh `token`, keeping its refresh token when the response omits one.
    pub async fn refresh(&self, token: &StoredToken, now: DateTime<Utc>) -> Result<StoredToken> {
        let refresh_token = token
            .refresh_token
            .clone()
            .map(RefreshToken::new)
            .ok_or_else(|| {
                PlatformError::Credentials("Stored token has no refresh token".to_string())
            })?;
        let mut response = self
            .oauth
            .exchange_refresh_token(&refresh_token)
            .request_async(&self.http)
            .await
            .map_err(token_error)?;
        if response.refresh_token().is_none() {
            debug!("Refresh response lacks a refresh token, keeping the original");
            response.set_refresh_token(Some(refresh_token));
        }
        Ok(StoredToken::from_response(&response, now))
    }

    /// Read the stored token. A missing or unparseable file yields `None`.
    pub fn read_token(&self) -> Result<Option<StoredToken>> {
        let content = match fs::read_to_string(&self.token_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&content) {
            Ok(token) => Ok(Some(token)),
            Err(e) => {
                warn!(
                    "Ignoring unreadable token file {}: {}",
                    self.token_path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    /// Persist `token`, creating the auth directory when needed.
    pub fn store_token(&self, token: &StoredToken) -> Result<()> {
        if let Some(parent) = self.token_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.token_path, serde_json::to_string(token)?)?;
        info!("Token stored to {}", self.token_path.display());
        Ok(())
    }

    /// Return a usable token, refreshing or running the interactive consent
    /// flow as required.
    ///
    /// `prompt` receives the consent URL and must return the code the
    /// operator copied from that page.
    pub async fn load_or_authorize<F>(&self, now: DateTime<Utc>, prompt: F) -> Result<StoredToken>
    where
        F: FnOnce(&str) -> std::io::Result<String>,
    {
        if let Some(token) = self.read_token()? {
            if !token.expires_within(now, Duration::minutes(REFRESH_MARGIN_MINUTES)) {
                return Ok(token);
            }
            if token.refresh_token.is_some() {
                info!("Access token is expiring, refreshing");
                let refreshed = self.refresh(&token, now).await?;
                self.store_token(&refreshed)?;
                return Ok(refreshed);
            }
            warn!("Stored token expired and cannot be refreshed, re-authorizing");
        }

        let url = self.authorization_url();
        let code = prompt(&url)?;
        let code = code.trim();
        if code.is_empty() {
            return Err(PlatformError::Credentials(
                "No authorization code entered".to_string(),
            ));
        }
        let token = self.exchange_code(code, now).await?;
        self.store_token(&token)?;
        Ok(token)
    }
}
