//! Port for durable confession storage.
//!
//! The [`ConfessionStore`] trait is the sole authority translating between
//! the canonical [`Confession`] shape and whatever shape the durable store
//! persists. Adapters implement it against the document-store REST API or an
//! in-memory table for credential-free runs and tests.

use async_trait::async_trait;

use crate::domain::{Confession, ConfessionId};

/// Maximum number of records a [`ConfessionStore::list`] call may return.
pub const LIST_CAP: usize = 100;

/// Errors raised by confession store adapters.
///
/// No operation retries automatically; every variant carries the cause
/// message from the underlying failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfessionStoreError {
    /// The store could not be reached (transport failure or timeout).
    #[error("confession store connection failed: {message}")]
    Connection {
        /// Cause reported by the transport layer.
        message: String,
    },
    /// The store rejected the operation.
    #[error("confession store query failed: {message}")]
    Query {
        /// Cause reported by the store.
        message: String,
    },
    /// The store returned a payload that does not map to the canonical shape.
    #[error("confession store returned an invalid payload: {message}")]
    Decode {
        /// Description of the malformed payload.
        message: String,
    },
}

impl ConfessionStoreError {
    /// Build a [`ConfessionStoreError::Connection`].
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Build a [`ConfessionStoreError::Query`].
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Build a [`ConfessionStoreError::Decode`].
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Port for confession persistence.
///
/// # Contract
///
/// - [`create`](Self::create) is a silent no-op for content that is empty
///   once trimmed; otherwise it performs exactly one durable write with the
///   flags defaulted to false and `created_at` taken from the adapter's
///   clock. The 1000-character cap is *not* re-checked here; the submission
///   boundary owns it.
/// - [`list`](Self::list) returns at most [`LIST_CAP`] records, newest
///   first, mapped into the canonical shape with missing booleans defaulted
///   to false and a missing timestamp defaulted to the adapter clock's now.
///   It fails whole; partial results are never returned.
/// - [`set_read`](Self::set_read) and [`set_archived`](Self::set_archived)
///   update only their own field. Neither verifies the target id exists
///   first; an update against a missing id is a silent no-op at this layer.
/// - [`delete`](Self::delete) is permanent; deleting a missing id is not an
///   error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfessionStore: Send + Sync {
    /// Persist a new confession with both flags false.
    async fn create(&self, content: &str) -> Result<(), ConfessionStoreError>;

    /// Fetch the newest records, capped at [`LIST_CAP`].
    async fn list(&self) -> Result<Vec<Confession>, ConfessionStoreError>;

    /// Update only the read flag of the target record.
    async fn set_read(&self, id: &ConfessionId, value: bool) -> Result<(), ConfessionStoreError>;

    /// Update only the archived flag of the target record.
    async fn set_archived(
        &self,
        id: &ConfessionId,
        value: bool,
    ) -> Result<(), ConfessionStoreError>;

    /// Permanently remove the record. There is no soft-delete state.
    async fn delete(&self, id: &ConfessionId) -> Result<(), ConfessionStoreError>;
}

/// Fixture implementation for tests that do not exercise persistence.
///
/// Accepts every write and always lists an empty store.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureConfessionStore;

#[async_trait]
impl ConfessionStore for FixtureConfessionStore {
    async fn create(&self, _content: &str) -> Result<(), ConfessionStoreError> {
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Confession>, ConfessionStoreError> {
        Ok(Vec::new())
    }

    async fn set_read(&self, _id: &ConfessionId, _value: bool) -> Result<(), ConfessionStoreError> {
        Ok(())
    }

    async fn set_archived(
        &self,
        _id: &ConfessionId,
        _value: bool,
    ) -> Result<(), ConfessionStoreError> {
        Ok(())
    }

    async fn delete(&self, _id: &ConfessionId) -> Result<(), ConfessionStoreError> {
        Ok(())
    }
}
