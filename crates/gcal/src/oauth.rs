//! OAuth 2.0 client for Google accounts.
//!
//! Built per operation from the current [`OAuthCredentials`]; it holds no
//! token state of its own.

use std::time::Duration;

use assist_core::types::Timestamp;
use serde::Deserialize;
use url::Url;

use crate::credentials::OAuthCredentials;
use crate::error::GoogleApiError;

pub const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
pub const REVOKE_ENDPOINT: &str = "https://oauth2.googleapis.com/revoke";
pub const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Scopes requested on connect.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/calendar",
    "https://www.googleapis.com/auth/calendar.events",
    "https://www.googleapis.com/auth/userinfo.email",
];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Only present on the first consent.
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds.
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
}

impl TokenResponse {
    pub fn expires_at(&self, now: Timestamp) -> Option<Timestamp> {
        self.expires_in
            .filter(|secs| *secs > 0)
            .map(|secs| now + chrono::Duration::seconds(secs))
    }
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    email: Option<String>,
}

pub struct OAuthClient {
    http: reqwest::Client,
    credentials: OAuthCredentials,
}

impl OAuthClient {
    pub fn new(credentials: OAuthCredentials) -> Result<Self, GoogleApiError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http, credentials })
    }

    /// The consent URL the professional is redirected to.
    ///
    /// Requests offline access and forces the consent screen so a refresh
    /// token is always issued.
    pub fn authorization_url(&self, state: &str) -> Result<String, GoogleApiError> {
        let scope = SCOPES.join(" ");
        let url = Url::parse_with_params(
            AUTH_ENDPOINT,
            &[
                ("client_id", self.credentials.client_id.as_str()),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("state", state),
            ],
        )?;
        Ok(url.into())
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, GoogleApiError> {
        let response = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("code", code),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;
        parse_response(response).await
    }

    /// Obtain a new access token from a refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, GoogleApiError> {
        let response = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("refresh_token", refresh_token),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;
        parse_response(response).await
    }

    /// Revoke an access or refresh token.
    pub async fn revoke(&self, token: &str) -> Result<(), GoogleApiError> {
        let response = self
            .http
            .post(REVOKE_ENDPOINT)
            .form(&[("token", token)])
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    /// Email address of the account that granted `access_token`.
    pub async fn account_email(&self, access_token: &str) -> Result<Option<String>, GoogleApiError> {
        let response = self
            .http
            .get(USERINFO_ENDPOINT)
            .bearer_auth(access_token)
            .send()
            .await?;
        let info: UserInfo = parse_response(response).await?;
        Ok(info.email)
    }
}

// ---- response helpers shared with the Calendar client ----

/// Ensure the response has a success status code, or return
/// [`GoogleApiError::Api`] carrying the status and body text.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, GoogleApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(GoogleApiError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Parse a successful JSON response body into the expected type.
pub(crate) async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, GoogleApiError> {
    let response = ensure_success(response).await?;
    Ok(response.json::<T>().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn client() -> OAuthClient {
        OAuthClient::new(OAuthCredentials {
            client_id: "client-123".into(),
            client_secret: "s3cret".into(),
            redirect_uri: "https://api.example.com/api/v1/calendar/google/callback".into(),
        })
        .unwrap()
    }

    #[test]
    fn authorization_url_carries_required_params() {
        let raw = client().authorization_url("42.1700000000.abcd").unwrap();
        let url = Url::parse(&raw).unwrap();
        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(params["client_id"], "client-123");
        assert_eq!(params["access_type"], "offline");
        assert_eq!(params["prompt"], "consent");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["state"], "42.1700000000.abcd");
        assert!(params["scope"].contains("auth/calendar.events"));
        assert!(params["scope"].contains("userinfo.email"));
        assert!(!raw.contains("s3cret"));
    }

    #[test]
    fn expires_at_ignores_non_positive_lifetimes() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut token = TokenResponse {
            access_token: "a".into(),
            refresh_token: None,
            expires_in: Some(3600),
            scope: None,
        };
        assert_eq!(token.expires_at(now), Some(now + chrono::Duration::hours(1)));
        token.expires_in = Some(0);
        assert_eq!(token.expires_at(now), None);
    }
}
