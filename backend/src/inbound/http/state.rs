//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and services and remain testable without real I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{AuthGateway, ConfessionStore};
use crate::domain::{ReviewList, SessionWatch};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Moderation store port used by the submission path.
    pub store: Arc<dyn ConfessionStore>,
    /// Auth provider port used by the login path.
    pub auth: Arc<dyn AuthGateway>,
    /// Admin working-set controller shared by the moderation endpoints.
    pub review: Arc<ReviewList>,
    /// Observable admin session state.
    pub sessions: SessionWatch,
    /// Clock source for export file names.
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Construct state from the port implementations.
    ///
    /// The review controller is created here so every handler shares one
    /// working set over the same store instance.
    pub fn new(
        store: Arc<dyn ConfessionStore>,
        auth: Arc<dyn AuthGateway>,
        sessions: SessionWatch,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let review = Arc::new(ReviewList::new(store.clone()));
        Self {
            store,
            auth,
            review,
            sessions,
            clock,
        }
    }
}
