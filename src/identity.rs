//! Client for the external identity service.
//!
//! Credential storage and verification live in a separate backend; this
//! module validates lengths locally, delegates the call, and reports the
//! outcome. No roster mutation happens here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{GameError, GameResult};

const DEFAULT_BACKEND_ENDPOINT: &str = "http://localhost:8181";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Payload sent to the backend for both register and login.
#[derive(Debug, Clone, Serialize)]
struct CredentialRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Backend response shape: `{ "result": bool, "msg": "..." }`.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityResponse {
    pub result: bool,
    #[serde(default)]
    pub msg: String,
}

/// Username must be more than 4 and less than 8 characters.
pub fn validate_username(username: &str) -> GameResult<()> {
    let len = username.chars().count();
    if len <= 4 || len >= 8 {
        return Err(GameError::UsernameLength);
    }
    Ok(())
}

/// Password must be more than 8 and less than 16 characters.
pub fn validate_password(password: &str) -> GameResult<()> {
    let len = password.chars().count();
    if len <= 8 || len >= 16 {
        return Err(GameError::PasswordLength);
    }
    Ok(())
}

/// Credential backend seam. The HTTP implementation talks to the real
/// identity service; [`AcceptAll`] serves offline development and tests.
#[async_trait]
pub trait IdentityBackend: Send + Sync {
    async fn register(&self, username: &str, password: &str) -> GameResult<IdentityResponse>;
    async fn login(&self, username: &str, password: &str) -> GameResult<IdentityResponse>;
}

#[derive(Debug, Clone)]
pub struct HttpIdentity {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpIdentity {
    /// Build a client from `BACKEND_ENDPOINT` (falls back to localhost).
    pub fn from_env() -> Self {
        let endpoint = std::env::var("BACKEND_ENDPOINT")
            .ok()
            .map(|s| s.trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_ENDPOINT.to_string());

        tracing::info!("Identity backend endpoint: {}", endpoint);

        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            endpoint,
        }
    }

    async fn post(&self, path: &str, username: &str, password: &str) -> GameResult<IdentityResponse> {
        validate_username(username)?;
        validate_password(password)?;

        let url = format!("{}{}", self.endpoint, path);
        let response = self
            .client
            .post(&url)
            .json(&CredentialRequest { username, password })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Identity service request to {} failed: {}", url, e);
                GameError::IdentityService(
                    "An error occurred contacting the identity service.".to_string(),
                )
            })?;

        let status = response.status();
        let body: IdentityResponse = response.json().await.map_err(|e| {
            tracing::error!("Identity service returned malformed body: {}", e);
            GameError::IdentityService(
                "An error occurred contacting the identity service.".to_string(),
            )
        })?;

        if status.is_success() && body.result {
            Ok(body)
        } else if body.msg.is_empty() {
            Err(GameError::IdentityService("Authentication failed.".to_string()))
        } else {
            Err(GameError::IdentityService(body.msg))
        }
    }
}

#[async_trait]
impl IdentityBackend for HttpIdentity {
    async fn register(&self, username: &str, password: &str) -> GameResult<IdentityResponse> {
        self.post("/player/register", username, password).await
    }

    async fn login(&self, username: &str, password: &str) -> GameResult<IdentityResponse> {
        self.post("/player/login", username, password).await
    }
}

/// Backend that accepts any length-valid credentials. Selected with
/// `IDENTITY_BACKEND=none` for offline development; also used by tests.
#[derive(Debug, Default)]
pub struct AcceptAll;

#[async_trait]
impl IdentityBackend for AcceptAll {
    async fn register(&self, username: &str, password: &str) -> GameResult<IdentityResponse> {
        validate_username(username)?;
        validate_password(password)?;
        Ok(IdentityResponse {
            result: true,
            msg: "Registration successful.".to_string(),
        })
    }

    async fn login(&self, username: &str, password: &str) -> GameResult<IdentityResponse> {
        validate_username(username)?;
        validate_password(password)?;
        Ok(IdentityResponse {
            result: true,
            msg: "Login successful.".to_string(),
        })
    }
}

/// Pick the identity backend from the environment.
pub fn backend_from_env() -> Box<dyn IdentityBackend> {
    match std::env::var("IDENTITY_BACKEND").as_deref() {
        Ok("none") => {
            tracing::warn!("Identity verification DISABLED - any credentials are accepted!");
            Box::new(AcceptAll)
        }
        _ => Box::new(HttpIdentity::from_env()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_username_bounds_are_exclusive() {
        assert!(validate_username("abcd").is_err()); // 4: too short
        assert!(validate_username("abcde").is_ok()); // 5
        assert!(validate_username("abcdefg").is_ok()); // 7
        assert!(validate_username("abcdefgh").is_err()); // 8: too long
    }

    #[test]
    fn test_password_bounds_are_exclusive() {
        assert!(validate_password("12345678").is_err()); // 8: too short
        assert!(validate_password("123456789").is_ok()); // 9
        assert!(validate_password("123456789012345").is_ok()); // 15
        assert!(validate_password("1234567890123456").is_err()); // 16: too long
    }

    #[tokio::test]
    async fn test_accept_all_still_validates_lengths() {
        let backend = AcceptAll;
        assert!(backend.register("alice", "longenough123").await.is_ok());
        assert_eq!(
            backend.register("al", "longenough123").await.unwrap_err(),
            GameError::UsernameLength
        );
        assert_eq!(
            backend.login("alice", "short").await.unwrap_err(),
            GameError::PasswordLength
        );
    }

    #[test]
    #[serial]
    fn test_endpoint_from_env() {
        std::env::set_var("BACKEND_ENDPOINT", "http://backend:9000/");
        let client = HttpIdentity::from_env();
        assert_eq!(client.endpoint, "http://backend:9000");
        std::env::remove_var("BACKEND_ENDPOINT");
    }

    #[test]
    #[serial]
    fn test_endpoint_defaults_to_localhost() {
        std::env::remove_var("BACKEND_ENDPOINT");
        let client = HttpIdentity::from_env();
        assert_eq!(client.endpoint, DEFAULT_BACKEND_ENDPOINT);
    }
}
