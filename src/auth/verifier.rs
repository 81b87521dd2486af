//! Token verification against an identity provider.
//!
//! # Responsibilities
//! - Define the `TokenVerifier` seam the authentication hook depends on
//! - Static token table for development and tests
//! - Identity Toolkit `accounts:lookup` client for production

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{AuthConfig, AuthProvider, StaticTokenConfig};

/// The authenticated caller, as decoded from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            name: None,
            picture: None,
        }
    }
}

/// Errors returned by a token verifier.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The provider rejected the token (unknown, expired, malformed).
    #[error("token rejected: {0}")]
    Invalid(String),

    /// The provider could not be reached or answered unexpectedly.
    #[error("identity provider error: {0}")]
    Provider(String),

    #[error("identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl VerifyError {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            VerifyError::Invalid(_) => "invalid_token",
            VerifyError::Provider(_) | VerifyError::Transport(_) => "provider_error",
        }
    }
}

/// Validates a bearer token and yields the caller's identity.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, VerifyError>;
}

/// Verifies tokens against a fixed table.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, Identity>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.tokens.insert(token.into(), identity);
        self
    }

    pub fn from_config(tokens: &[StaticTokenConfig]) -> Self {
        tokens.iter().fold(Self::new(), |verifier, entry| {
            verifier.with_token(
                entry.token.clone(),
                Identity {
                    uid: entry.uid.clone(),
                    email: entry.email.clone(),
                    name: entry.name.clone(),
                    picture: entry.picture.clone(),
                },
            )
        })
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, VerifyError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| VerifyError::Invalid("unknown token".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
}

/// Verifies ID tokens with the Identity Toolkit `accounts:lookup` API.
#[derive(Debug, Clone)]
pub struct IdentityToolkitVerifier {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl IdentityToolkitVerifier {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self, VerifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl TokenVerifier for IdentityToolkitVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, VerifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&serde_json::json!({ "idToken": token }))
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST {
            return Err(VerifyError::Invalid("rejected by identity provider".to_string()));
        }
        if !status.is_success() {
            return Err(VerifyError::Provider(format!("unexpected status {}", status)));
        }

        let lookup: LookupResponse = response.json().await?;
        let user = lookup
            .users
            .into_iter()
            .next()
            .ok_or_else(|| VerifyError::Invalid("no user for token".to_string()))?;

        Ok(Identity {
            uid: user.local_id,
            email: user.email,
            name: user.display_name,
            picture: user.photo_url,
        })
    }
}

/// Build the verifier selected by configuration.
pub fn build_verifier(config: &AuthConfig) -> Result<Arc<dyn TokenVerifier>, VerifyError> {
    match config.provider {
        AuthProvider::Static => Ok(Arc::new(StaticTokenVerifier::from_config(&config.tokens))),
        AuthProvider::IdentityToolkit => {
            let verifier = IdentityToolkitVerifier::new(
                config.endpoint.clone(),
                config.api_key.clone(),
                Duration::from_secs(config.timeout_secs),
            )?;
            Ok(Arc::new(verifier))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_verifier() {
        let verifier = StaticTokenVerifier::new().with_token("t-alice", Identity::new("alice"));

        let identity = verifier.verify("t-alice").await.unwrap();
        assert_eq!(identity.uid, "alice");

        let err = verifier.verify("t-bob").await.unwrap_err();
        assert!(matches!(err, VerifyError::Invalid(_)));
        assert_eq!(err.reason(), "invalid_token");
    }

    #[tokio::test]
    async fn test_static_verifier_from_config() {
        let verifier = StaticTokenVerifier::from_config(&[StaticTokenConfig {
            token: "dev".into(),
            uid: "u1".into(),
            email: Some("u1@example.com".into()),
            name: None,
            picture: None,
        }]);

        let identity = verifier.verify("dev").await.unwrap();
        assert_eq!(identity.email.as_deref(), Some("u1@example.com"));
    }

    #[test]
    fn test_lookup_response_decoding() {
        let body = r#"{"kind":"identitytoolkit#GetAccountInfoResponse","users":[{"localId":"abc","email":"a@b.c","displayName":"Ann","photoUrl":"http://p"}]}"#;
        let lookup: LookupResponse = serde_json::from_str(body).unwrap();
        assert_eq!(lookup.users[0].local_id, "abc");
        assert_eq!(lookup.users[0].display_name.as_deref(), Some("Ann"));

        let empty: LookupResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.users.is_empty());
    }
}
