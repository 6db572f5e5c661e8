//! Confession data model.
//!
//! A confession is the sole entity of the system: anonymous text plus two
//! independent moderation flags and an optional read-only annotation. Keep
//! invariants on the validated newtypes and expose the only legal mutations
//! (`set_read`, `set_archived`) as explicit single-field writes.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum confession length, counted in characters, enforced at the
/// submission boundary only. Stored rows are trusted to predate the cap.
pub const CONTENT_MAX_CHARS: usize = 1000;

/// Upper bound of the sentiment scale attached by the annotation pipeline.
pub const SENTIMENT_SCORE_MAX: u8 = 10;

/// Validation errors returned by the confession constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfessionValidationError {
    EmptyId,
    InvalidId,
    EmptyContent,
    ContentTooLong { max: usize },
    InvalidTimestamp,
    SentimentScoreOutOfRange { max: u8 },
}

impl fmt::Display for ConfessionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "confession id must not be empty"),
            Self::InvalidId => write!(
                f,
                "confession id must not contain whitespace or path separators",
            ),
            Self::EmptyContent => write!(f, "confession content must not be empty"),
            Self::ContentTooLong { max } => {
                write!(f, "confession content must be at most {max} characters")
            }
            Self::InvalidTimestamp => {
                write!(f, "confession timestamp is outside the representable range")
            }
            Self::SentimentScoreOutOfRange { max } => {
                write!(f, "sentiment score must be between 0 and {max}")
            }
        }
    }
}

impl std::error::Error for ConfessionValidationError {}

/// Opaque store-assigned confession identifier.
///
/// The store owns id generation; this type only guards against values that
/// could not have come from a document store (blank, embedded whitespace, or
/// path separators that would break per-document URLs).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConfessionId(String);

impl ConfessionId {
    /// Validate and construct a [`ConfessionId`] from borrowed input.
    pub fn new(id: impl Into<String>) -> Result<Self, ConfessionValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ConfessionValidationError::EmptyId);
        }
        if id.chars().any(char::is_whitespace) || id.contains('/') {
            return Err(ConfessionValidationError::InvalidId);
        }
        Ok(Self(id))
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for ConfessionId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ConfessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ConfessionId> for String {
    fn from(value: ConfessionId) -> Self {
        value.0
    }
}

impl TryFrom<String> for ConfessionId {
    type Error = ConfessionValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Free-text confession body.
///
/// ## Invariants
/// - Never empty once trimmed of whitespace.
/// - The 1000-character cap applies only on the submission path
///   ([`ConfessionContent::submitted`]); rows read back from the store are
///   accepted at any length because the store never enforces the cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConfessionContent(String);

impl ConfessionContent {
    /// Construct content from a trusted source such as a stored row.
    pub fn new(content: impl Into<String>) -> Result<Self, ConfessionValidationError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(ConfessionValidationError::EmptyContent);
        }
        Ok(Self(content))
    }

    /// Construct content from an untrusted submission, enforcing the
    /// character cap in addition to the non-empty invariant.
    ///
    /// Whitespace is preserved; only fully blank submissions are rejected.
    pub fn submitted(content: impl Into<String>) -> Result<Self, ConfessionValidationError> {
        let content = Self::new(content)?;
        if content.0.chars().count() > CONTENT_MAX_CHARS {
            return Err(ConfessionValidationError::ContentTooLong {
                max: CONTENT_MAX_CHARS,
            });
        }
        Ok(content)
    }
}

impl AsRef<str> for ConfessionContent {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ConfessionContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ConfessionContent> for String {
    fn from(value: ConfessionContent) -> Self {
        value.0
    }
}

impl TryFrom<String> for ConfessionContent {
    type Error = ConfessionValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Sentiment score on the 0–10 scale used by the annotation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SentimentScore(u8);

impl SentimentScore {
    /// Validate and construct a score.
    pub fn new(value: u8) -> Result<Self, ConfessionValidationError> {
        if value > SENTIMENT_SCORE_MAX {
            return Err(ConfessionValidationError::SentimentScoreOutOfRange {
                max: SENTIMENT_SCORE_MAX,
            });
        }
        Ok(Self(value))
    }

    /// Raw integer value.
    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for SentimentScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<SentimentScore> for u8 {
    fn from(value: SentimentScore) -> Self {
        value.0
    }
}

impl TryFrom<u8> for SentimentScore {
    type Error = ConfessionValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Structured annotation attached to some stored confessions.
///
/// No write path in this system produces annotations; they pass through
/// read-only when the store returns them. Absence is modelled explicitly as
/// `Option<AiAnalysis>` on [`Confession`] so consumers (CSV export in
/// particular) must handle unannotated records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    /// Sentiment on a 0–10 scale.
    #[schema(value_type = u8, example = 8)]
    pub sentiment_score: SentimentScore,
    /// Ordered topic tags.
    pub tags: Vec<String>,
    /// One-line summary of the confession.
    pub summary: String,
    /// True when the content was flagged as concerning.
    pub risk_flag: bool,
}

/// Anonymous confession record.
///
/// ## Invariants
/// - `id`, `content`, and `created_at` are immutable after construction.
/// - `is_read` and `archived` are independent; each is written only by its
///   own mutator and all four combinations are valid.
/// - `ai_analysis` is read-only passthrough data.
///
/// Wire shape is camelCase with `createdAt` as epoch milliseconds; a missing
/// `archived` field deserialises as `false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "ConfessionDto", into = "ConfessionDto")]
pub struct Confession {
    #[schema(value_type = String, example = "k9Sx2VbqPz")]
    id: ConfessionId,
    #[schema(value_type = String, example = "I ate the last piece of cake.")]
    content: ConfessionContent,
    #[schema(value_type = i64, example = 1_700_000_000_000_i64)]
    created_at: DateTime<Utc>,
    is_read: bool,
    archived: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    ai_analysis: Option<AiAnalysis>,
}

impl Confession {
    /// Build a freshly submitted confession: both flags false, no annotation.
    pub fn new(id: ConfessionId, content: ConfessionContent, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            content,
            created_at,
            is_read: false,
            archived: false,
            ai_analysis: None,
        }
    }

    /// Build a confession from already-persisted parts.
    pub fn from_parts(
        id: ConfessionId,
        content: ConfessionContent,
        created_at: DateTime<Utc>,
        is_read: bool,
        archived: bool,
        ai_analysis: Option<AiAnalysis>,
    ) -> Self {
        Self {
            id,
            content,
            created_at,
            is_read,
            archived,
            ai_analysis,
        }
    }

    /// Store-assigned identifier.
    pub fn id(&self) -> &ConfessionId {
        &self.id
    }

    /// Confession body.
    pub fn content(&self) -> &ConfessionContent {
        &self.content
    }

    /// Creation instant assigned by the clock source at submission.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether the admin has marked the confession read.
    pub fn is_read(&self) -> bool {
        self.is_read
    }

    /// Whether the admin has archived the confession.
    pub fn archived(&self) -> bool {
        self.archived
    }

    /// Annotation, when the store holds one.
    pub fn ai_analysis(&self) -> Option<&AiAnalysis> {
        self.ai_analysis.as_ref()
    }

    /// Flip only the read flag. Never touches any other field.
    pub fn set_read(&mut self, value: bool) {
        self.is_read = value;
    }

    /// Flip only the archived flag. Never touches any other field.
    pub fn set_archived(&mut self, value: bool) {
        self.archived = value;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfessionDto {
    id: String,
    content: String,
    created_at: i64,
    is_read: bool,
    #[serde(default)]
    archived: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ai_analysis: Option<AiAnalysis>,
}

impl From<Confession> for ConfessionDto {
    fn from(value: Confession) -> Self {
        let Confession {
            id,
            content,
            created_at,
            is_read,
            archived,
            ai_analysis,
        } = value;
        Self {
            id: id.into(),
            content: content.into(),
            created_at: created_at.timestamp_millis(),
            is_read,
            archived: Some(archived),
            ai_analysis,
        }
    }
}

impl TryFrom<ConfessionDto> for Confession {
    type Error = ConfessionValidationError;

    fn try_from(value: ConfessionDto) -> Result<Self, Self::Error> {
        let ConfessionDto {
            id,
            content,
            created_at,
            is_read,
            archived,
            ai_analysis,
        } = value;

        let created_at = Utc
            .timestamp_millis_opt(created_at)
            .single()
            .ok_or(ConfessionValidationError::InvalidTimestamp)?;

        Ok(Self {
            id: ConfessionId::new(id)?,
            content: ConfessionContent::new(content)?,
            created_at,
            is_read,
            archived: archived.unwrap_or(false),
            ai_analysis,
        })
    }
}
