//! OAuth client credentials.
//!
//! Credentials are resolved on every operation through a
//! [`CredentialProvider`], so rotating them never requires a restart.

/// OAuth 2.0 client registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Source of OAuth client credentials.
#[async_trait::async_trait]
pub trait CredentialProvider: Send + Sync {
    /// The current credentials, or `None` when the integration is not configured.
    async fn oauth_credentials(&self) -> Option<OAuthCredentials>;
}

/// Reads `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET` and `GOOGLE_REDIRECT_URI`
/// from the environment at call time.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentialProvider;

#[async_trait::async_trait]
impl CredentialProvider for EnvCredentialProvider {
    async fn oauth_credentials(&self) -> Option<OAuthCredentials> {
        let read = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Some(OAuthCredentials {
            client_id: read("GOOGLE_CLIENT_ID")?,
            client_secret: read("GOOGLE_CLIENT_SECRET")?,
            redirect_uri: read("GOOGLE_REDIRECT_URI")?,
        })
    }
}

/// Fixed credentials, or none at all.
#[derive(Debug, Default, Clone)]
pub struct StaticCredentialProvider(pub Option<OAuthCredentials>);

#[async_trait::async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn oauth_credentials(&self) -> Option<OAuthCredentials> {
        self.0.clone()
    }
}
