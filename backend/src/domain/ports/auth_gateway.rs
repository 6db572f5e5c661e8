//! Port for the external auth provider.
//!
//! The review flows are gated entirely on "is a session currently active";
//! there are no roles beyond authenticated-or-not. Adapters implement this
//! trait against the provider's REST API or as a fixture for
//! credential-free runs.

use async_trait::async_trait;

use crate::domain::{AdminSession, LoginCredentials};

/// Errors raised by auth gateway adapters.
///
/// The kind drives the user-facing message; the detail retains the full
/// technical cause for optional disclosure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthGatewayError {
    /// The provider rejected the email/password pair.
    #[error("invalid credential: {detail}")]
    InvalidCredential {
        /// Technical cause reported by the provider.
        detail: String,
    },
    /// The provider throttled the caller.
    #[error("too many requests: {detail}")]
    TooManyRequests {
        /// Technical cause reported by the provider.
        detail: String,
    },
    /// Any other provider or transport failure.
    #[error("auth provider failure: {detail}")]
    Other {
        /// Technical cause reported by the provider or transport.
        detail: String,
    },
}

impl AuthGatewayError {
    /// Build an [`AuthGatewayError::InvalidCredential`].
    pub fn invalid_credential(detail: impl Into<String>) -> Self {
        Self::InvalidCredential {
            detail: detail.into(),
        }
    }

    /// Build an [`AuthGatewayError::TooManyRequests`].
    pub fn too_many_requests(detail: impl Into<String>) -> Self {
        Self::TooManyRequests {
            detail: detail.into(),
        }
    }

    /// Build an [`AuthGatewayError::Other`].
    pub fn other(detail: impl Into<String>) -> Self {
        Self::Other {
            detail: detail.into(),
        }
    }
}

/// Port for admin authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchange credentials for an authenticated session.
    async fn login(&self, credentials: &LoginCredentials)
    -> Result<AdminSession, AuthGatewayError>;

    /// Tear down any provider-side session state.
    ///
    /// Password sign-in providers typically keep no server-side session, so
    /// adapters may treat this as a no-op; the cookie session is discarded by
    /// the caller either way.
    async fn logout(&self) -> Result<(), AuthGatewayError>;
}

/// Fixture gateway for credential-free runs and tests.
///
/// Accepts exactly `admin@anonbox.test` / `password`; every other pair is an
/// invalid credential.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAuthGateway;

impl FixtureAuthGateway {
    /// Email accepted by the fixture.
    pub const EMAIL: &'static str = "admin@anonbox.test";
    /// Password accepted by the fixture.
    pub const PASSWORD: &'static str = "password";
}

#[async_trait]
impl AuthGateway for FixtureAuthGateway {
    async fn login(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AdminSession, AuthGatewayError> {
        if credentials.email() == Self::EMAIL && credentials.password() == Self::PASSWORD {
            Ok(AdminSession::new(
                "fixture-admin",
                Some(Self::EMAIL.to_owned()),
            ))
        } else {
            Err(AuthGatewayError::invalid_credential(
                "fixture gateway accepts only the built-in admin account",
            ))
        }
    }

    async fn logout(&self) -> Result<(), AuthGatewayError> {
        Ok(())
    }
}
