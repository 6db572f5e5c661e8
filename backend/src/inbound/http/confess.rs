//! Public submission endpoint.
//!
//! ```text
//! POST /api/confess {"content":"..."}
//! ```
//!
//! The boundary owns content validation: blank submissions and submissions
//! over the 1000-character cap are rejected before any store call, so a
//! failed submission loses no data and the store adapter never needs to
//! re-check. Store failures surface as the shared error schema with no
//! automatic retry.

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::review_list::store_error;
use crate::domain::{ApiResult, ConfessionContent, ConfessionValidationError, Error};
use crate::inbound::http::state::HttpState;

/// Submission body for `POST /api/confess`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ConfessRequest {
    /// Free-text confession, at most 1000 characters.
    #[schema(example = "I ate the last piece of cake.")]
    pub content: String,
}

/// Acknowledgement body returned on acceptance.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ConfessResponse {
    /// Always true; failures use the shared error schema instead.
    pub success: bool,
}

fn map_content_error(err: ConfessionValidationError) -> Error {
    match err {
        ConfessionValidationError::EmptyContent => {
            Error::invalid_request("confession content must not be empty")
                .with_details(json!({ "field": "content", "code": "empty_content" }))
        }
        ConfessionValidationError::ContentTooLong { max } => Error::invalid_request(format!(
            "confession content must be at most {max} characters"
        ))
        .with_details(json!({ "field": "content", "code": "content_too_long", "max": max })),
        other => Error::invalid_request(other.to_string()),
    }
}

/// Accept an anonymous confession.
///
/// Returns `201` with `{"success":true}` once the store confirms the write.
#[utoipa::path(
    post,
    path = "/api/confess",
    request_body = ConfessRequest,
    responses(
        (status = 201, description = "Confession stored", body = ConfessResponse),
        (status = 400, description = "Blank or over-length content", body = Error),
        (status = 500, description = "Store write failed", body = Error),
        (status = 503, description = "Store unreachable", body = Error)
    ),
    tags = ["confessions"],
    operation_id = "submitConfession",
    security([])
)]
#[post("/confess")]
pub async fn submit_confession(
    state: web::Data<HttpState>,
    payload: web::Json<ConfessRequest>,
) -> ApiResult<HttpResponse> {
    let content =
        ConfessionContent::submitted(payload.into_inner().content).map_err(map_content_error)?;

    state
        .store
        .create(content.as_ref())
        .await
        .map_err(store_error)?;

    tracing::info!(chars = content.as_ref().chars().count(), "confession accepted");
    Ok(HttpResponse::Created().json(ConfessResponse { success: true }))
}
