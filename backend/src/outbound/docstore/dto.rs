//! DTOs for the document-store wire shape.
//!
//! The durable shape differs from the canonical one: the read flag is named
//! `read` externally and the timestamp is the store's native RFC 3339 form.
//! The adapter decodes into these transport DTOs first, then maps into
//! domain records in one pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AiAnalysis, Confession, ConfessionContent, ConfessionId};

/// One stored row as the document store returns it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct StoredConfessionDto {
    pub(super) id: String,
    pub(super) content: String,
    #[serde(default)]
    pub(super) created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub(super) read: Option<bool>,
    #[serde(default)]
    pub(super) archived: Option<bool>,
    #[serde(default)]
    pub(super) ai_analysis: Option<AiAnalysis>,
}

impl StoredConfessionDto {
    /// Map into the canonical shape.
    ///
    /// Missing booleans default to false and a missing timestamp falls back
    /// to `now` (a defensive fallback, not a correctness guarantee).
    pub(super) fn into_confession(self, now: DateTime<Utc>) -> Result<Confession, String> {
        let row = self.id.clone();
        let id = ConfessionId::new(self.id).map_err(|err| format!("row {row}: {err}"))?;
        let content =
            ConfessionContent::new(self.content).map_err(|err| format!("row {row}: {err}"))?;

        Ok(Confession::from_parts(
            id,
            content,
            self.created_at.unwrap_or(now),
            self.read.unwrap_or(false),
            self.archived.unwrap_or(false),
            self.ai_analysis,
        ))
    }
}

/// Body of a create write: both flags explicitly false.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct NewConfessionDto<'a> {
    pub(super) content: &'a str,
    pub(super) created_at: DateTime<Utc>,
    pub(super) read: bool,
    pub(super) archived: bool,
}

/// Single-field patch body for the read flag.
///
/// Patches carry exactly one field so a read update can never touch
/// `archived` or `content`, and vice versa.
#[derive(Debug, Serialize)]
pub(super) struct ReadPatchDto {
    pub(super) read: bool,
}

/// Single-field patch body for the archived flag.
#[derive(Debug, Serialize)]
pub(super) struct ArchivedPatchDto {
    pub(super) archived: bool,
}
