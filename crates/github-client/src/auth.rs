//! Authentication: personal/actions tokens and GitHub App installations.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::models::InstallationTokenRecord;

/// Installation tokens are refreshed this long before GitHub expires them.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 300;

/// How the client authenticates, resolved once when the client is built.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// Personal access token or the workflow's `GITHUB_TOKEN`.
    Token(String),
    /// GitHub App installation credentials.
    App {
        app_id: String,
        private_key: String,
        installation_id: u64,
    },
}

impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(_) => f.debug_tuple("Token").field(&"<redacted>").finish(),
            Self::App {
                app_id,
                installation_id,
                ..
            } => f
                .debug_struct("App")
                .field("app_id", app_id)
                .field("private_key", &"<redacted>")
                .field("installation_id", installation_id)
                .finish(),
        }
    }
}

impl AuthMethod {
    /// Short label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Token(_) => "token",
            Self::App { .. } => "app",
        }
    }
}

/// Live credentials held by a client.
#[derive(Clone)]
pub(crate) enum Credentials {
    Token(String),
    App(Arc<AppAuthenticator>),
}

impl Credentials {
    pub(crate) fn new(method: AuthMethod) -> ApiResult<Self> {
        match method {
            AuthMethod::Token(token) => {
                if token.trim().is_empty() {
                    return Err(ApiError::Auth("token is empty".to_string()));
                }
                Ok(Self::Token(token))
            }
            AuthMethod::App {
                app_id,
                private_key,
                installation_id,
            } => Ok(Self::App(Arc::new(AppAuthenticator::new(
                app_id,
                &private_key,
                installation_id,
            )?))),
        }
    }

    /// Value for the `Authorization` header.
    pub(crate) async fn authorization(
        &self,
        http: &reqwest::Client,
        base_url: &str,
    ) -> ApiResult<String> {
        match self {
            Self::Token(token) => Ok(format!("Bearer {token}")),
            Self::App(app) => {
                let token = app.installation_token(http, base_url).await?;
                Ok(format!("Bearer {token}"))
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct AppClaims {
    iss: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Mints app JWTs and caches the installation token they buy.
pub(crate) struct AppAuthenticator {
    app_id: String,
    installation_id: u64,
    encoding_key: EncodingKey,
    cache: RwLock<Option<CachedToken>>,
}

impl AppAuthenticator {
    fn new(app_id: String, private_key: &str, installation_id: u64) -> ApiResult<Self> {
        let pem = normalize_private_key(private_key);
        let encoding_key = EncodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| ApiError::Auth(format!("invalid app private key: {e}")))?;

        Ok(Self {
            app_id,
            installation_id,
            encoding_key,
            cache: RwLock::new(None),
        })
    }

    fn generate_jwt(&self, now: DateTime<Utc>) -> ApiResult<String> {
        let claims = AppClaims {
            iss: self.app_id.clone(),
            // Backdated to absorb clock skew between runner and GitHub.
            iat: (now - Duration::seconds(60)).timestamp(),
            exp: (now + Duration::seconds(600)).timestamp(),
        };

        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Auth(format!("failed to sign app JWT: {e}")))
    }

    async fn installation_token(
        &self,
        http: &reqwest::Client,
        base_url: &str,
    ) -> ApiResult<String> {
        let now = Utc::now();
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.expires_at - now > Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) {
                    return Ok(cached.token.clone());
                }
            }
        }

        let mut cache = self.cache.write().await;
        // Another caller may have refreshed while we waited for the lock.
        if let Some(cached) = cache.as_ref() {
            if cached.expires_at - now > Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) {
                return Ok(cached.token.clone());
            }
        }

        let jwt = self.generate_jwt(now)?;
        let url = format!(
            "{base_url}/app/installations/{}/access_tokens",
            self.installation_id
        );

        info!(
            installation_id = self.installation_id,
            "Requesting installation access token"
        );

        let response = http
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {jwt}"))
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Auth(format!(
                "installation token request failed: {status} - {body}"
            )));
        }

        let record: InstallationTokenRecord = serde_json::from_str(&body)?;
        let expires_at = DateTime::parse_from_rfc3339(&record.expires_at)
            .map_err(|e| ApiError::Auth(format!("bad token expiry {:?}: {e}", record.expires_at)))?
            .with_timezone(&Utc);

        debug!(expires_at = %expires_at, "Installation access token obtained");

        *cache = Some(CachedToken {
            token: record.token.clone(),
            expires_at,
        });
        Ok(record.token)
    }
}

/// Private keys pasted into CI secrets often arrive with literal `\n`.
fn normalize_private_key(key: &str) -> String {
    let key = key.trim();
    if key.contains("\\n") && !key.contains('\n') {
        key.replace("\\n", "\n")
    } else {
        key.to_string()
    }
}
