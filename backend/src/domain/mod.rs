//! Domain primitives, ports, and services.
//!
//! Purpose: define the strongly typed confession model, the moderation store
//! and auth boundaries as ports, and the review list controller that keeps
//! the admin's working set consistent with store-issued mutations. Keep
//! types immutable where the lifecycle demands it and document invariants
//! and serialisation contracts (serde) in each type's Rustdoc.

pub mod auth;
pub mod confession;
pub mod error;
pub mod export;
pub mod ports;
pub mod review_list;

pub use self::auth::{
    AdminSession, LoginCredentials, LoginValidationError, SessionSubscription, SessionWatch,
};
pub use self::confession::{
    AiAnalysis, CONTENT_MAX_CHARS, Confession, ConfessionContent, ConfessionId,
    ConfessionValidationError, SENTIMENT_SCORE_MAX, SentimentScore,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::review_list::{LoadState, ReviewList};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use anonbox_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::unauthorized("login required"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
