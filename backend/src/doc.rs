//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the REST API: the public submission endpoint, the session-gated admin
//! surface, and the health probes. Swagger UI serves the document at
//! `/docs` in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{AiAnalysis, Confession, Error, ErrorCode};
use crate::inbound::http::admin::LoginRequest;
use crate::inbound::http::confess::{ConfessRequest, ConfessResponse};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/admin/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "AnonBox backend API",
        description = "Anonymous confession submission and session-gated moderation."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::confess::submit_confession,
        crate::inbound::http::admin::login,
        crate::inbound::http::admin::logout,
        crate::inbound::http::admin::list_confessions,
        crate::inbound::http::admin::reload_confessions,
        crate::inbound::http::admin::toggle_read,
        crate::inbound::http::admin::toggle_archive,
        crate::inbound::http::admin::delete_confession,
        crate::inbound::http::admin::export_confessions,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Confession,
        AiAnalysis,
        Error,
        ErrorCode,
        ConfessRequest,
        ConfessResponse,
        LoginRequest,
    )),
    tags(
        (name = "confessions", description = "Anonymous submission"),
        (name = "admin", description = "Session-gated moderation"),
        (name = "health", description = "Probes for orchestration")
    )
)]
pub struct ApiDoc;
