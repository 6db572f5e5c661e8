//! Review list controller: the admin's in-memory working set.
//!
//! Loads one snapshot from the store on activation, filters locally, and
//! patches the set optimistically after each successful single-record
//! mutation instead of re-fetching. The set is a read-through cache with a
//! staleness window: it changes only when a controller call completes, never
//! from a background task, and reconciliation is an explicit
//! [`ReviewList::load`] issued by the caller.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::export;
use crate::domain::ports::{ConfessionStore, ConfessionStoreError};
use crate::domain::{Confession, ConfessionId, Error};

/// Load lifecycle of the working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No snapshot has been requested yet.
    Idle,
    /// A snapshot fetch is in flight.
    Loading,
    /// The working set reflects the last successful fetch.
    Loaded,
    /// The last fetch failed; the previous set (possibly empty) is retained.
    Failed,
}

struct Inner {
    records: Vec<Confession>,
    load: LoadState,
}

fn map_store_error(error: ConfessionStoreError) -> Error {
    match error {
        ConfessionStoreError::Connection { message } => {
            Error::service_unavailable(format!("confession store unavailable: {message}"))
        }
        ConfessionStoreError::Query { message } => {
            Error::internal(format!("confession store query failed: {message}"))
        }
        ConfessionStoreError::Decode { message } => {
            Error::internal(format!("confession store payload invalid: {message}"))
        }
    }
}

/// Map a store failure on the submission path to a domain error.
///
/// Shared with the submission handler so both paths surface store failures
/// identically.
pub fn store_error(error: ConfessionStoreError) -> Error {
    map_store_error(error)
}

/// Admin-facing working set of confessions.
///
/// All mutation methods follow the same discipline: issue the store call
/// first and patch the in-memory set only once it has succeeded. On failure
/// the set is left untouched and the error propagates. Within one session,
/// calls against the same record may complete out of order; each completion
/// patches only its own field, so interleavings stay consistent.
pub struct ReviewList {
    store: Arc<dyn ConfessionStore>,
    inner: RwLock<Inner>,
}

impl ReviewList {
    /// Create a controller over the given store with an empty, idle set.
    pub fn new(store: Arc<dyn ConfessionStore>) -> Self {
        Self {
            store,
            inner: RwLock::new(Inner {
                records: Vec::new(),
                load: LoadState::Idle,
            }),
        }
    }

    /// Current load state.
    pub async fn load_state(&self) -> LoadState {
        self.inner.read().await.load
    }

    /// Snapshot of the full working set in display order.
    pub async fn records(&self) -> Vec<Confession> {
        self.inner.read().await.records.clone()
    }

    /// Replace the working set with a fresh snapshot from the store.
    ///
    /// The set is re-sorted newest-first locally; adapter ordering is treated
    /// as advisory. On failure the previous records are retained and the
    /// state moves to [`LoadState::Failed`].
    pub async fn load(&self) -> Result<(), Error> {
        self.inner.write().await.load = LoadState::Loading;
        match self.store.list().await {
            Ok(mut records) => {
                records.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
                let mut inner = self.inner.write().await;
                inner.records = records;
                inner.load = LoadState::Loaded;
                Ok(())
            }
            Err(error) => {
                tracing::warn!(error = %error, "review list load failed");
                self.inner.write().await.load = LoadState::Failed;
                Err(map_store_error(error))
            }
        }
    }

    /// Fetch the initial snapshot if none has been loaded successfully yet.
    pub async fn ensure_loaded(&self) -> Result<(), Error> {
        match self.load_state().await {
            LoadState::Idle | LoadState::Failed => self.load().await,
            LoadState::Loading | LoadState::Loaded => Ok(()),
        }
    }

    /// Project the working set through a case-insensitive substring match on
    /// content only. An empty query returns the full set, order preserved.
    pub async fn filter(&self, query: &str) -> Vec<Confession> {
        let needle = query.to_lowercase();
        self.inner
            .read()
            .await
            .records
            .iter()
            .filter(|record| record.content().as_ref().to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Flip the read flag of the target record.
    ///
    /// Looks up the current value locally, issues the single-field store
    /// update, and patches only the read flag once the store call succeeds.
    pub async fn apply_read_toggle(&self, id: &ConfessionId) -> Result<Confession, Error> {
        let target = {
            let inner = self.inner.read().await;
            let record = find(&inner.records, id)?;
            !record.is_read()
        };

        self.store
            .set_read(id, target)
            .await
            .map_err(map_store_error)?;

        let mut inner = self.inner.write().await;
        let record = find_mut(&mut inner.records, id)?;
        record.set_read(target);
        Ok(record.clone())
    }

    /// Flip the archived flag of the target record. Symmetric to
    /// [`apply_read_toggle`](Self::apply_read_toggle).
    pub async fn apply_archive_toggle(&self, id: &ConfessionId) -> Result<Confession, Error> {
        let target = {
            let inner = self.inner.read().await;
            let record = find(&inner.records, id)?;
            !record.archived()
        };

        self.store
            .set_archived(id, target)
            .await
            .map_err(map_store_error)?;

        let mut inner = self.inner.write().await;
        let record = find_mut(&mut inner.records, id)?;
        record.set_archived(target);
        Ok(record.clone())
    }

    /// Delete the record permanently.
    ///
    /// The store call is issued unconditionally; repeated deletes of the same
    /// id are not errors. The record is removed from the working set only
    /// after the store confirms.
    pub async fn apply_delete(&self, id: &ConfessionId) -> Result<(), Error> {
        self.store.delete(id).await.map_err(map_store_error)?;
        let mut inner = self.inner.write().await;
        inner.records.retain(|record| record.id() != id);
        Ok(())
    }

    /// Render the currently filtered projection as CSV text.
    pub async fn export_csv(&self, query: &str) -> String {
        export::render_csv(&self.filter(query).await)
    }
}

fn find<'a>(records: &'a [Confession], id: &ConfessionId) -> Result<&'a Confession, Error> {
    records
        .iter()
        .find(|record| record.id() == id)
        .ok_or_else(|| Error::not_found(format!("confession {id} not found")))
}

fn find_mut<'a>(
    records: &'a mut [Confession],
    id: &ConfessionId,
) -> Result<&'a mut Confession, Error> {
    records
        .iter_mut()
        .find(|record| record.id() == id)
        .ok_or_else(|| Error::not_found(format!("confession {id} not found")))
}
