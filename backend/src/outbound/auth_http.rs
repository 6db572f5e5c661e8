//! Reqwest-backed auth provider adapter.
//!
//! Exchanges email/password credentials for a provider session over the
//! identity REST API and maps provider failures onto the auth error kinds.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::ports::{AuthGateway, AuthGatewayError};
use crate::domain::{AdminSession, LoginCredentials};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const API_KEY_HEADER: &str = "x-api-key";

/// Auth provider adapter performing HTTP calls against the sign-in endpoint.
pub struct HttpAuthGateway {
    client: Client,
    sign_in: Url,
    api_key: String,
}

impl HttpAuthGateway {
    /// Build an adapter with the default request timeout.
    ///
    /// `sign_in` is the full URL of the password sign-in endpoint, e.g.
    /// `https://auth.example/v1/sign-in`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(sign_in: Url, api_key: String) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(DEFAULT_REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            sign_in,
            api_key,
        })
    }
}

#[derive(Debug, Serialize)]
struct SignInRequestDto<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponseDto {
    uid: String,
    #[serde(default)]
    email: Option<String>,
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn login(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AdminSession, AuthGatewayError> {
        let response = self
            .client
            .post(self.sign_in.clone())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&SignInRequestDto {
                email: credentials.email(),
                password: credentials.password(),
            })
            .send()
            .await
            .map_err(|error| AuthGatewayError::other(error.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| AuthGatewayError::other(error.to_string()))?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let session: SignInResponseDto = serde_json::from_slice(body.as_ref()).map_err(|error| {
            AuthGatewayError::other(format!("invalid sign-in payload: {error}"))
        })?;
        Ok(AdminSession::new(session.uid, session.email))
    }

    async fn logout(&self) -> Result<(), AuthGatewayError> {
        // Password sign-in keeps no provider-side session; discarding the
        // cookie session is the caller's job.
        Ok(())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> AuthGatewayError {
    let preview = body_preview(body);
    let detail = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    };

    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            AuthGatewayError::invalid_credential(detail)
        }
        StatusCode::TOO_MANY_REQUESTS => AuthGatewayError::too_many_requests(detail),
        _ => AuthGatewayError::other(detail),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
