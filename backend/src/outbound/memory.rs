//! In-memory confession store.
//!
//! Serves the credential-free review mode and tests: the same contract as
//! the document-store adapter, backed by a process-local table. Ids are
//! generated locally as UUIDs since there is no store to assign them.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::ports::{ConfessionStore, ConfessionStoreError, LIST_CAP};
use crate::domain::{
    AiAnalysis, Confession, ConfessionContent, ConfessionId, SentimentScore,
};

/// Process-local [`ConfessionStore`] implementation.
pub struct MemoryConfessionStore {
    clock: Arc<dyn Clock>,
    rows: RwLock<Vec<Confession>>,
}

impl MemoryConfessionStore {
    /// Create an empty store.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            rows: RwLock::new(Vec::new()),
        }
    }

    /// Create a store pre-populated with review-friendly sample records:
    /// one read and annotated, two unread.
    pub fn with_seed_data(clock: Arc<dyn Clock>) -> Self {
        let now = clock.utc();
        let seeds = vec![
            seed(
                "seed-1",
                "I secretly water my neighbor's plants when they are on vacation \
                 because I saw them dying. They think they have a green thumb now.",
                now - Duration::milliseconds(10_000_000),
                true,
                Some(AiAnalysis {
                    sentiment_score: sentiment(8),
                    tags: vec![
                        "Kindness".to_owned(),
                        "Neighbors".to_owned(),
                        "Secret".to_owned(),
                    ],
                    summary: "User secretly helps neighbor with plants.".to_owned(),
                    risk_flag: false,
                }),
            ),
            seed(
                "seed-2",
                "I feel incredibly lonely in this big city. Everyone seems so busy \
                 and connected, but I haven't spoken to a real person in days.",
                now - Duration::milliseconds(5_000_000),
                false,
                None,
            ),
            seed(
                "seed-3",
                "I ate the last piece of cake and blamed it on the dog. I have no regrets.",
                now - Duration::milliseconds(200_000),
                false,
                None,
            ),
        ];
        Self {
            clock,
            rows: RwLock::new(seeds),
        }
    }
}

fn sentiment(value: u8) -> SentimentScore {
    // Seed values are compile-time constants within the valid range.
    SentimentScore::new(value).unwrap_or_else(|err| panic!("seed sentiment score: {err}"))
}

fn seed(
    id: &str,
    content: &str,
    created_at: chrono::DateTime<chrono::Utc>,
    is_read: bool,
    analysis: Option<AiAnalysis>,
) -> Confession {
    let id = ConfessionId::new(id).unwrap_or_else(|err| panic!("seed id: {err}"));
    let content =
        ConfessionContent::new(content).unwrap_or_else(|err| panic!("seed content: {err}"));
    Confession::from_parts(id, content, created_at, is_read, false, analysis)
}

#[async_trait]
impl ConfessionStore for MemoryConfessionStore {
    async fn create(&self, content: &str) -> Result<(), ConfessionStoreError> {
        if content.trim().is_empty() {
            return Ok(());
        }
        let content = ConfessionContent::new(content)
            .map_err(|err| ConfessionStoreError::query(err.to_string()))?;
        let id = ConfessionId::new(Uuid::new_v4().to_string())
            .map_err(|err| ConfessionStoreError::query(err.to_string()))?;
        let record = Confession::new(id, content, self.clock.utc());

        self.rows.write().await.push(record);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Confession>, ConfessionStoreError> {
        let mut records = self.rows.read().await.clone();
        records.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        records.truncate(LIST_CAP);
        Ok(records)
    }

    async fn set_read(&self, id: &ConfessionId, value: bool) -> Result<(), ConfessionStoreError> {
        let mut rows = self.rows.write().await;
        if let Some(record) = rows.iter_mut().find(|record| record.id() == id) {
            record.set_read(value);
        }
        Ok(())
    }

    async fn set_archived(
        &self,
        id: &ConfessionId,
        value: bool,
    ) -> Result<(), ConfessionStoreError> {
        let mut rows = self.rows.write().await;
        if let Some(record) = rows.iter_mut().find(|record| record.id() == id) {
            record.set_archived(value);
        }
        Ok(())
    }

    async fn delete(&self, id: &ConfessionId) -> Result<(), ConfessionStoreError> {
        self.rows.write().await.retain(|record| record.id() != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::{TimeZone, Utc};
    use mockable::{DefaultClock, MockClock};
    use std::sync::Mutex;

    fn fixed_clock(millis: i64) -> Arc<dyn Clock> {
        let mut clock = MockClock::new();
        clock.expect_utc().returning(move || {
            Utc.timestamp_millis_opt(millis)
                .single()
                .unwrap_or_else(|| panic!("fixture timestamp"))
        });
        Arc::new(clock)
    }

    fn ticking_clock(start_millis: i64) -> Arc<dyn Clock> {
        let next = Mutex::new(start_millis);
        let mut clock = MockClock::new();
        clock.expect_utc().returning(move || {
            let mut guard = next.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            let millis = *guard;
            *guard += 1;
            Utc.timestamp_millis_opt(millis)
                .single()
                .unwrap_or_else(|| panic!("fixture timestamp"))
        });
        Arc::new(clock)
    }

    #[tokio::test]
    async fn create_stamps_clock_time_and_defaults_flags() {
        let store = MemoryConfessionStore::new(fixed_clock(1_700_000_000_000));
        store.create("Test A").await.expect("create");

        let records = store.list().await.expect("list");
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.content().as_ref(), "Test A");
        assert_eq!(record.created_at().timestamp_millis(), 1_700_000_000_000);
        assert!(!record.is_read());
        assert!(!record.archived());
        assert!(record.ai_analysis().is_none());
    }

    #[tokio::test]
    async fn create_silently_skips_blank_content() {
        let store = MemoryConfessionStore::new(fixed_clock(0));
        store.create("   \n ").await.expect("blank create is a no-op");
        assert!(store.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn list_returns_newest_first_capped_at_one_hundred() {
        let store = MemoryConfessionStore::new(ticking_clock(1_000));
        for i in 0..(LIST_CAP + 5) {
            store.create(&format!("confession {i}")).await.expect("create");
        }

        let records = store.list().await.expect("list");
        assert_eq!(records.len(), LIST_CAP);
        assert!(
            records
                .windows(2)
                .all(|pair| pair[0].created_at() > pair[1].created_at()),
            "list must be newest first"
        );
        // The five oldest rows fall off the capped page.
        assert_eq!(records[0].content().as_ref(), "confession 104");
        assert_eq!(
            records[LIST_CAP - 1].content().as_ref(),
            "confession 5"
        );
    }

    #[tokio::test]
    async fn flag_updates_touch_only_their_own_field() {
        let store = MemoryConfessionStore::new(fixed_clock(0));
        store.create("target").await.expect("create");
        let id = store.list().await.expect("list")[0].id().clone();

        store.set_read(&id, true).await.expect("set_read");
        let record = store.list().await.expect("list")[0].clone();
        assert!(record.is_read());
        assert!(!record.archived());

        store.set_archived(&id, true).await.expect("set_archived");
        let record = store.list().await.expect("list")[0].clone();
        assert!(record.is_read(), "archive update must not clear read");
        assert!(record.archived());
    }

    #[tokio::test]
    async fn updates_and_deletes_of_missing_ids_are_silent() {
        let store = MemoryConfessionStore::new(fixed_clock(0));
        let ghost = ConfessionId::new("ghost").expect("valid id");

        store.set_read(&ghost, true).await.expect("silent no-op");
        store.set_archived(&ghost, true).await.expect("silent no-op");
        store.delete(&ghost).await.expect("silent no-op");
        assert!(store.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn delete_removes_permanently() {
        let store = MemoryConfessionStore::new(ticking_clock(0));
        store.create("keep").await.expect("create");
        store.create("remove").await.expect("create");

        let records = store.list().await.expect("list");
        let target = records
            .iter()
            .find(|r| r.content().as_ref() == "remove")
            .expect("target present")
            .id()
            .clone();

        store.delete(&target).await.expect("delete");
        let remaining = store.list().await.expect("list");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].content().as_ref(), "keep");

        store.delete(&target).await.expect("repeat delete is silent");
    }

    #[tokio::test]
    async fn seed_data_matches_the_review_fixture_shape() {
        let store = MemoryConfessionStore::with_seed_data(Arc::new(DefaultClock));
        let records = store.list().await.expect("list");
        assert_eq!(records.len(), 3);

        // Newest first: the cake confession has the smallest age offset.
        assert!(records[0].content().as_ref().contains("cake"));
        assert!(!records[0].is_read());

        let annotated = records
            .iter()
            .find(|r| r.ai_analysis().is_some())
            .expect("one seeded annotation");
        assert!(annotated.is_read());
        let analysis = annotated.ai_analysis().expect("annotation");
        assert_eq!(analysis.sentiment_score.value(), 8);
        assert_eq!(analysis.tags.len(), 3);
    }
}
