//! Bot-protection token verification against Cloudflare Turnstile.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Turnstile error code for an expired or already-redeemed token.
pub const TIMEOUT_OR_DUPLICATE: &str = "timeout-or-duplicate";

/// Header the Turnstile widget uses when the form posts it directly.
pub const TOKEN_HEADER: &str = "cf-turnstile-response";

/// Verifies a one-time challenge token before a public submission is processed.
#[async_trait]
pub trait BotVerifier: Send + Sync {
    async fn verify(&self, token: Option<&str>, remote_ip: Option<&str>) -> Result<(), AppError>;
}

#[derive(Debug, Serialize)]
struct SiteverifyRequest<'a> {
    secret: &'a str,
    response: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    remoteip: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SiteverifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Verifier backed by the Turnstile siteverify endpoint.
///
/// Without a secret every token is accepted, which is only meant for local development.
pub struct TurnstileVerifier {
    client: reqwest::Client,
    secret: Option<String>,
    verify_url: String,
}

impl TurnstileVerifier {
    pub fn new(secret: Option<String>, verify_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret,
            verify_url: verify_url.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }
}

#[async_trait]
impl BotVerifier for TurnstileVerifier {
    async fn verify(&self, token: Option<&str>, remote_ip: Option<&str>) -> Result<(), AppError> {
        let Some(secret) = self.secret.as_deref() else {
            tracing::debug!("Turnstile disabled; skipping verification");
            return Ok(());
        };

        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::BotTokenMissing)?;

        let reply: SiteverifyResponse = self
            .client
            .post(self.verify_url.as_str())
            .json(&SiteverifyRequest {
                secret,
                response: token,
                remoteip: remote_ip,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        check_reply(&reply)
    }
}

fn check_reply(reply: &SiteverifyResponse) -> Result<(), AppError> {
    if reply.success {
        return Ok(());
    }

    tracing::warn!(error_codes = ?reply.error_codes, "Turnstile verification failed");

    if reply.error_codes.iter().any(|c| c == TIMEOUT_OR_DUPLICATE) {
        Err(AppError::BotProtection {
            retryable: true,
            message: "Verification expired or was already used. Please try again.".to_string(),
        })
    } else {
        Err(AppError::BotProtection {
            retryable: false,
            message: "Bot protection verification failed".to_string(),
        })
    }
}
