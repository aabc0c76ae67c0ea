//! Service credentials
//!
//! Organization calls run either with a static token or as a GitHub App
//! installation. An App proves itself with a short-lived RS256 JWT and trades
//! it for an installation token; that token is cached and re-minted shortly
//! before it expires.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::GitHubClient;
use crate::error::{ClientError, Result};

/// Installation tokens are re-minted once they are this close to expiry
const REFRESH_MARGIN_SECS: i64 = 300;

/// How the service authenticates its organization calls
#[derive(Debug)]
pub enum ServiceAuth {
    /// A fixed token (personal access token or pre-minted installation token)
    Token(SecretString),
    /// A GitHub App installation
    App(AppCredentials),
}

impl From<&str> for ServiceAuth {
    fn from(token: &str) -> Self {
        Self::Token(SecretString::from(token))
    }
}

impl From<String> for ServiceAuth {
    fn from(token: String) -> Self {
        Self::Token(SecretString::from(token))
    }
}

/// Identity of a GitHub App installation
#[derive(Debug)]
pub struct AppCredentials {
    pub app_id: String,
    pub installation_id: u64,
    pub private_key: SecretString,
}

impl AppCredentials {
    pub fn new(
        app_id: impl Into<String>,
        installation_id: u64,
        private_key: impl Into<SecretString>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            installation_id,
            private_key: private_key.into(),
        }
    }
}

/// Resolved form of [`ServiceAuth`] held by the client
#[derive(Clone)]
pub(crate) enum ServiceCredential {
    Token(Arc<SecretString>),
    App(Arc<Installation>),
}

impl ServiceCredential {
    /// Validate `auth`, parsing the App key up front
    ///
    /// # Errors
    /// Returns `ClientError::Credential` when a value is empty or the private
    /// key is not an RSA PEM.
    pub(crate) fn resolve(auth: ServiceAuth) -> Result<Self> {
        match auth {
            ServiceAuth::Token(token) => Ok(Self::Token(Arc::new(token))),
            ServiceAuth::App(app) => Installation::new(app).map(|i| Self::App(Arc::new(i))),
        }
    }
}

pub(crate) struct Installation {
    app_id: String,
    installation_id: u64,
    key: EncodingKey,
    cached: Mutex<Option<InstallationToken>>,
}

struct InstallationToken {
    token: SecretString,
    expires_at: DateTime<Utc>,
}

impl InstallationToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - now > TimeDelta::seconds(REFRESH_MARGIN_SECS)
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iat: i64,
    exp: i64,
    iss: &'a str,
}

#[derive(Deserialize)]
struct AccessToken {
    token: String,
    expires_at: String,
}

impl Installation {
    fn new(app: AppCredentials) -> Result<Self> {
        if app.app_id.trim().is_empty() {
            return Err(ClientError::Credential("app id must not be empty".to_string()));
        }
        let pem = app.private_key.expose_secret();
        if pem.trim().is_empty() {
            return Err(ClientError::Credential(
                "private key must not be empty".to_string(),
            ));
        }
        let key = EncodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| ClientError::Credential(format!("invalid App private key: {e}")))?;

        Ok(Self {
            app_id: app.app_id,
            installation_id: app.installation_id,
            key,
            cached: Mutex::new(None),
        })
    }

    /// Sign the JWT the App authenticates as itself with
    ///
    /// Backdated a minute against clock drift; GitHub rejects lifetimes over
    /// ten minutes.
    fn jwt(&self, now: i64) -> Result<String> {
        let claims = Claims {
            iat: now - 60,
            exp: now + 600,
            iss: &self.app_id,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .map_err(|e| ClientError::Credential(format!("failed signing App JWT: {e}")))
    }
}

impl GitHubClient {
    /// Token for the next organization call
    pub(crate) async fn service_token(&self) -> Result<String> {
        match &self.service {
            ServiceCredential::Token(token) => Ok(token.expose_secret().to_string()),
            ServiceCredential::App(installation) => self.installation_token(installation).await,
        }
    }

    /// Cached installation token, minting a new one when it is close to expiry
    ///
    /// The lock is held across the exchange so concurrent callers wait for a
    /// single mint.
    async fn installation_token(&self, installation: &Installation) -> Result<String> {
        let mut cached = installation.cached.lock().await;
        let now = Utc::now();
        if let Some(current) = cached.as_ref().filter(|token| token.is_fresh(now)) {
            return Ok(current.token.expose_secret().to_string());
        }

        tracing::info!(
            app_id = %installation.app_id,
            installation_id = installation.installation_id,
            "Minting installation token"
        );
        let jwt = installation.jwt(now.timestamp())?;
        let installation_id = installation.installation_id.to_string();
        let url = self.endpoint(&["app", "installations", &installation_id, "access_tokens"])?;
        let response = self.request(Method::POST, url, &jwt).send().await?;
        let minted: AccessToken = Self::handle_response(response).await?;

        let expires_at = DateTime::parse_from_rfc3339(&minted.expires_at)
            .map_err(|e| {
                ClientError::ParseError(format!(
                    "invalid installation token expiry {}: {e}",
                    minted.expires_at
                ))
            })?
            .with_timezone(&Utc);

        let token = minted.token.clone();
        *cached = Some(InstallationToken {
            token: SecretString::from(minted.token),
            expires_at,
        });
        Ok(token)
    }
}
