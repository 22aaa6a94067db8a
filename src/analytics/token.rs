// OAuth2 access tokens for the provider.
// Service accounts sign an RS256 JWT assertion and trade it at the token endpoint
// (jwt-bearer grant). Tokens are cached until shortly before expiry.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::instrument;

use crate::error::ProviderError;

pub const ANALYTICS_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/analytics",
    "https://www.googleapis.com/auth/analytics.edit",
];

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh this long before the token actually expires.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, ProviderError>;
}

/// Fixed bearer token (pre-issued tokens, tests).
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String, ProviderError> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

struct CachedToken {
    token: String,
    refresh_at: Instant,
}

pub struct ServiceAccountTokenSource {
    client_email: String,
    key: EncodingKey,
    token_url: String,
    scopes: Vec<String>,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenSource {
    /// `private_key_pem` is the service account's PEM key (PKCS#8 or PKCS#1).
    pub fn new(
        client_email: &str,
        private_key_pem: &str,
        token_url: &str,
        http: reqwest::Client,
    ) -> Result<Self, ProviderError> {
        let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| ProviderError::Auth(format!("invalid private key: {}", e)))?;
        Ok(Self {
            client_email: client_email.to_string(),
            key,
            token_url: token_url.to_string(),
            scopes: ANALYTICS_SCOPES.iter().map(|s| s.to_string()).collect(),
            http,
            cached: Mutex::new(None),
        })
    }

    fn sign_assertion(&self) -> Result<String, ProviderError> {
        let iat = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: self.scopes.join(" "),
            aud: &self.token_url,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .map_err(|e| ProviderError::Auth(format!("signing assertion: {}", e)))
    }

    #[instrument(skip(self), fields(provider = "google", operation = "exchange_token"))]
    async fn exchange(&self) -> Result<TokenResponse, ProviderError> {
        let assertion = self.sign_assertion()?;
        let resp = self
            .http
            .post(&self.token_url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Auth(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }
        resp.json::<TokenResponse>()
            .await
            .map_err(|e| ProviderError::Auth(format!("token response: {}", e)))
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> Result<String, ProviderError> {
        let mut cached = self.cached.lock().await;
        if let Some(c) = cached.as_ref()
            && Instant::now() < c.refresh_at
        {
            return Ok(c.token.clone());
        }
        let fresh = self.exchange().await?;
        let lifetime = Duration::from_secs(fresh.expires_in).saturating_sub(EXPIRY_MARGIN);
        tracing::debug!(expires_in = fresh.expires_in, "access token refreshed");
        *cached = Some(CachedToken {
            token: fresh.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(fresh.access_token)
    }
}
