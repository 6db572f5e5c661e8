//! Admin API handlers: session management and moderation.
//!
//! ```text
//! POST /api/admin/login {"email":"...","password":"..."}
//! POST /api/admin/logout
//! GET /api/admin/confessions?search=...
//! POST /api/admin/confessions/reload
//! POST /api/admin/confessions/{id}/read-toggle
//! POST /api/admin/confessions/{id}/archive-toggle
//! DELETE /api/admin/confessions/{id}
//! GET /api/admin/confessions/export?search=...
//! ```
//!
//! Every route except `login` requires an active session; holding one is the
//! only capability checked.

use actix_web::http::header;
use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::export::export_filename;
use crate::domain::ports::AuthGatewayError;
use crate::domain::{
    ApiResult, Confession, ConfessionId, Error, LoginCredentials, LoginValidationError,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/admin/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Admin account email.
    pub email: String,
    /// Admin account password.
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

/// Search parameter shared by the list and export routes.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    /// Case-insensitive substring matched against confession content only.
    #[serde(default)]
    pub search: String,
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyEmail => Error::invalid_request("email must not be empty")
            .with_details(json!({ "field": "email", "code": "empty_email" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

fn map_auth_error(err: AuthGatewayError) -> Error {
    // User-facing message stays generic; the provider detail rides along in
    // the details field for optional disclosure.
    match err {
        AuthGatewayError::InvalidCredential { detail } => {
            Error::unauthorized("invalid email or password")
                .with_details(json!({ "detail": detail }))
        }
        AuthGatewayError::TooManyRequests { detail } => {
            Error::too_many_requests("too many login attempts, try again later")
                .with_details(json!({ "detail": detail }))
        }
        AuthGatewayError::Other { detail } => {
            Error::service_unavailable("authentication service unavailable")
                .with_details(json!({ "detail": detail }))
        }
    }
}

fn parse_id(raw: String) -> Result<ConfessionId, Error> {
    ConfessionId::new(raw)
        .map_err(|err| Error::invalid_request(format!("invalid confession id: {err}")))
}

/// Authenticate the admin and establish a session.
#[utoipa::path(
    post,
    path = "/api/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 429, description = "Provider throttled the caller", body = Error),
        (status = 503, description = "Auth provider unavailable", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminLogin",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let admin = state
        .auth
        .login(&credentials)
        .await
        .map_err(map_auth_error)?;

    session.persist_admin(admin.uid())?;
    tracing::info!(uid = admin.uid(), "admin login succeeded");
    state.sessions.replace(Some(admin));
    Ok(HttpResponse::Ok().finish())
}

/// End the admin session.
#[utoipa::path(
    post,
    path = "/api/admin/logout",
    responses(
        (status = 204, description = "Session cleared"),
        (status = 401, description = "No active session", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminLogout"
)]
#[post("/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    session.require_admin()?;
    if let Err(error) = state.auth.logout().await {
        tracing::warn!(error = %error, "provider logout failed; clearing session anyway");
    }
    session.clear();
    state.sessions.replace(None);
    Ok(HttpResponse::NoContent().finish())
}

/// List the working set, filtered and newest first.
///
/// The first call after startup fetches the snapshot from the store; later
/// calls serve the in-memory set patched by the mutation routes.
#[utoipa::path(
    get,
    path = "/api/admin/confessions",
    params(("search" = Option<String>, Query, description = "Content substring filter")),
    responses(
        (status = 200, description = "Filtered confessions", body = [Confession]),
        (status = 401, description = "No active session", body = Error),
        (status = 503, description = "Store unreachable", body = Error)
    ),
    tags = ["admin"],
    operation_id = "listConfessions"
)]
#[get("/confessions")]
pub async fn list_confessions(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<Vec<Confession>>> {
    session.require_admin()?;
    state.review.ensure_loaded().await?;
    Ok(web::Json(state.review.filter(&query.search).await))
}

/// Discard the working set and re-fetch from the store.
///
/// Reconciliation is always explicit; nothing reloads in the background.
#[utoipa::path(
    post,
    path = "/api/admin/confessions/reload",
    responses(
        (status = 204, description = "Snapshot refreshed"),
        (status = 401, description = "No active session", body = Error),
        (status = 503, description = "Store unreachable", body = Error)
    ),
    tags = ["admin"],
    operation_id = "reloadConfessions"
)]
#[post("/confessions/reload")]
pub async fn reload_confessions(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    session.require_admin()?;
    state.review.load().await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Flip the read flag of one confession and return the patched record.
#[utoipa::path(
    post,
    path = "/api/admin/confessions/{id}/read-toggle",
    params(("id" = String, Path, description = "Confession id")),
    responses(
        (status = 200, description = "Patched record", body = Confession),
        (status = 401, description = "No active session", body = Error),
        (status = 404, description = "Unknown confession id", body = Error)
    ),
    tags = ["admin"],
    operation_id = "toggleConfessionRead"
)]
#[post("/confessions/{id}/read-toggle")]
pub async fn toggle_read(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Confession>> {
    session.require_admin()?;
    let id = parse_id(path.into_inner())?;
    state.review.ensure_loaded().await?;
    Ok(web::Json(state.review.apply_read_toggle(&id).await?))
}

/// Flip the archived flag of one confession and return the patched record.
#[utoipa::path(
    post,
    path = "/api/admin/confessions/{id}/archive-toggle",
    params(("id" = String, Path, description = "Confession id")),
    responses(
        (status = 200, description = "Patched record", body = Confession),
        (status = 401, description = "No active session", body = Error),
        (status = 404, description = "Unknown confession id", body = Error)
    ),
    tags = ["admin"],
    operation_id = "toggleConfessionArchive"
)]
#[post("/confessions/{id}/archive-toggle")]
pub async fn toggle_archive(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Confession>> {
    session.require_admin()?;
    let id = parse_id(path.into_inner())?;
    state.review.ensure_loaded().await?;
    Ok(web::Json(state.review.apply_archive_toggle(&id).await?))
}

/// Delete one confession permanently.
///
/// There is no tombstone or undo; the calling UI must obtain explicit human
/// confirmation before issuing this request. Repeating the delete for an
/// already-removed id succeeds.
#[utoipa::path(
    delete,
    path = "/api/admin/confessions/{id}",
    params(("id" = String, Path, description = "Confession id")),
    responses(
        (status = 204, description = "Record removed"),
        (status = 401, description = "No active session", body = Error)
    ),
    tags = ["admin"],
    operation_id = "deleteConfession"
)]
#[delete("/confessions/{id}")]
pub async fn delete_confession(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    session.require_admin()?;
    let id = parse_id(path.into_inner())?;
    state.review.ensure_loaded().await?;
    state.review.apply_delete(&id).await?;
    tracing::info!(id = %id, "confession deleted");
    Ok(HttpResponse::NoContent().finish())
}

/// Export the currently filtered confessions as CSV.
#[utoipa::path(
    get,
    path = "/api/admin/confessions/export",
    params(("search" = Option<String>, Query, description = "Content substring filter")),
    responses(
        (status = 200, description = "CSV attachment", body = String, content_type = "text/csv"),
        (status = 401, description = "No active session", body = Error),
        (status = 503, description = "Store unreachable", body = Error)
    ),
    tags = ["admin"],
    operation_id = "exportConfessions"
)]
#[get("/confessions/export")]
pub async fn export_confessions(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<SearchQuery>,
) -> ApiResult<HttpResponse> {
    session.require_admin()?;
    state.review.ensure_loaded().await?;
    let csv = state.review.export_csv(&query.search).await;
    let filename = export_filename(state.clock.utc());

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ))
        .body(csv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SessionWatch;
    use crate::domain::ports::{ConfessionStore, FixtureAuthGateway};
    use crate::inbound::http::confess::{ConfessRequest, submit_confession};
    use crate::outbound::MemoryConfessionStore;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test, web};
    use mockable::DefaultClock;
    use serde_json::Value;
    use std::sync::Arc;

    fn seeded_state() -> web::Data<HttpState> {
        let clock: Arc<dyn mockable::Clock> = Arc::new(DefaultClock);
        let store = Arc::new(MemoryConfessionStore::with_seed_data(clock.clone()));
        state_from(store, clock)
    }

    fn empty_state() -> web::Data<HttpState> {
        let clock: Arc<dyn mockable::Clock> = Arc::new(DefaultClock);
        let store = Arc::new(MemoryConfessionStore::new(clock.clone()));
        state_from(store, clock)
    }

    fn state_from(
        store: Arc<MemoryConfessionStore>,
        clock: Arc<dyn mockable::Clock>,
    ) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(
            store,
            Arc::new(FixtureAuthGateway),
            SessionWatch::new(),
            clock,
        ))
    }

    fn test_app(
        state: web::Data<HttpState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
                actix_web::dev::ServiceRequest,
                Config = (),
                Response = actix_web::dev::ServiceResponse,
                Error = actix_web::Error,
                InitError = (),
            >,
    > {
        App::new().app_data(state).service(
            web::scope("/api")
                .wrap(crate::inbound::http::test_utils::test_session_middleware())
                .service(submit_confession)
                .service(
                    web::scope("/admin")
                        .service(login)
                        .service(logout)
                        .service(reload_confessions)
                        .service(export_confessions)
                        .service(list_confessions)
                        .service(toggle_read)
                        .service(toggle_archive)
                        .service(delete_confession),
                ),
        )
    }

    /// Log in with the fixture account and return the session cookie.
    ///
    /// A macro rather than a function: the concrete service type returned by
    /// `init_service` is unnameable here.
    macro_rules! login_for_cookie {
        ($app:expr) => {{
            let request = actix_test::TestRequest::post()
                .uri("/api/admin/login")
                .set_json(&LoginRequest {
                    email: FixtureAuthGateway::EMAIL.to_owned(),
                    password: FixtureAuthGateway::PASSWORD.to_owned(),
                })
                .to_request();
            let response = actix_test::call_service($app, request).await;
            assert!(response.status().is_success(), "login must succeed");
            let cookie: Cookie<'static> = response
                .response()
                .cookies()
                .find(|cookie| cookie.name() == "session")
                .expect("session cookie")
                .into_owned();
            cookie
        }};
    }

    #[actix_web::test]
    async fn login_rejects_wrong_credentials() {
        let app = actix_test::init_service(test_app(seeded_state())).await;
        let request = actix_test::TestRequest::post()
            .uri("/api/admin/login")
            .set_json(&LoginRequest {
                email: "admin@anonbox.test".to_owned(),
                password: "wrong".to_owned(),
            })
            .to_request();

        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let value: Value = actix_test::read_body_json(response).await;
        assert_eq!(value.get("code"), Some(&serde_json::json!("unauthorized")));
        assert_eq!(
            value.get("message"),
            Some(&serde_json::json!("invalid email or password"))
        );
        assert!(
            value.get("details").is_some(),
            "technical detail is retained for disclosure"
        );
    }

    #[actix_web::test]
    async fn login_rejects_blank_email_as_invalid_request() {
        let app = actix_test::init_service(test_app(seeded_state())).await;
        let request = actix_test::TestRequest::post()
            .uri("/api/admin/login")
            .set_json(&LoginRequest {
                email: "   ".to_owned(),
                password: "pw".to_owned(),
            })
            .to_request();

        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let value: Value = actix_test::read_body_json(response).await;
        let details = value.get("details").expect("details present");
        assert_eq!(details.get("code"), Some(&serde_json::json!("empty_email")));
    }

    #[actix_web::test]
    async fn moderation_routes_require_a_session() {
        let app = actix_test::init_service(test_app(seeded_state())).await;
        for (method, uri) in [
            ("GET", "/api/admin/confessions"),
            ("POST", "/api/admin/confessions/reload"),
            ("POST", "/api/admin/confessions/seed-1/read-toggle"),
            ("POST", "/api/admin/confessions/seed-1/archive-toggle"),
            ("DELETE", "/api/admin/confessions/seed-1"),
            ("GET", "/api/admin/confessions/export"),
            ("POST", "/api/admin/logout"),
        ] {
            let request = match method {
                "GET" => actix_test::TestRequest::get(),
                "POST" => actix_test::TestRequest::post(),
                "DELETE" => actix_test::TestRequest::delete(),
                _ => unreachable!("unsupported method in fixture"),
            }
            .uri(uri)
            .to_request();
            let response = actix_test::call_service(&app, request).await;
            assert_eq!(
                response.status(),
                StatusCode::UNAUTHORIZED,
                "{method} {uri} must be gated"
            );
        }
    }

    #[actix_web::test]
    async fn list_serves_the_seeded_snapshot_newest_first() {
        let app = actix_test::init_service(test_app(seeded_state())).await;
        let cookie = login_for_cookie!(&app);

        let request = actix_test::TestRequest::get()
            .uri("/api/admin/confessions")
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let value: Value = actix_test::read_body_json(response).await;
        let records = value.as_array().expect("array body");
        assert_eq!(records.len(), 3);
        assert!(
            records[0]
                .get("content")
                .and_then(Value::as_str)
                .is_some_and(|content| content.contains("cake")),
            "newest seed first"
        );
        assert_eq!(records[0].get("isRead"), Some(&serde_json::json!(false)));
        assert_eq!(records[0].get("archived"), Some(&serde_json::json!(false)));
    }

    #[actix_web::test]
    async fn search_filters_by_content_substring() {
        let app = actix_test::init_service(test_app(seeded_state())).await;
        let cookie = login_for_cookie!(&app);

        let request = actix_test::TestRequest::get()
            .uri("/api/admin/confessions?search=CAKE")
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        let value: Value = actix_test::read_body_json(response).await;
        let records = value.as_array().expect("array body");
        assert_eq!(records.len(), 1);
    }

    #[actix_web::test]
    async fn export_ships_csv_with_attachment_headers() {
        let app = actix_test::init_service(test_app(seeded_state())).await;
        let cookie = login_for_cookie!(&app);

        let request = actix_test::TestRequest::get()
            .uri("/api/admin/confessions/export")
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("text/csv")
        );
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .expect("content disposition");
        assert!(disposition.starts_with("attachment; filename=\"confessions-"));
        assert!(disposition.ends_with(".csv\""));

        let body = actix_test::read_body(response).await;
        let text = std::str::from_utf8(&body).expect("utf8 body");
        assert!(text.starts_with("ID,Content,Date,Sentiment Score,Tags"));
        assert_eq!(text.lines().count(), 4, "header plus three seeds");
    }

    #[actix_web::test]
    async fn reload_picks_up_out_of_band_writes() {
        let state = seeded_state();
        let store = state.store.clone();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = login_for_cookie!(&app);

        // Prime the working set, then write behind its back.
        let request = actix_test::TestRequest::get()
            .uri("/api/admin/confessions")
            .cookie(cookie.clone())
            .to_request();
        actix_test::call_service(&app, request).await;
        store.create("fresh out-of-band entry").await.expect("create");

        let request = actix_test::TestRequest::post()
            .uri("/api/admin/confessions/reload")
            .cookie(cookie.clone())
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let request = actix_test::TestRequest::get()
            .uri("/api/admin/confessions?search=out-of-band")
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        let value: Value = actix_test::read_body_json(response).await;
        assert_eq!(value.as_array().map(Vec::len), Some(1));
    }

    #[actix_web::test]
    async fn logout_clears_the_session() {
        let app = actix_test::init_service(test_app(seeded_state())).await;
        let cookie = login_for_cookie!(&app);

        let request = actix_test::TestRequest::post()
            .uri("/api/admin/logout")
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let replacement = response
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("purge rewrites the cookie")
            .into_owned();
        let request = actix_test::TestRequest::get()
            .uri("/api/admin/confessions")
            .cookie(replacement)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn submitted_confession_walks_the_full_moderation_lifecycle() {
        // Submit → load → read-toggle → archive-toggle → delete, patching the
        // working set without intermediate reloads.
        let app = actix_test::init_service(test_app(empty_state())).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/confess")
            .set_json(&ConfessRequest {
                content: "Test A".to_owned(),
            })
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let cookie = login_for_cookie!(&app);

        let request = actix_test::TestRequest::get()
            .uri("/api/admin/confessions")
            .cookie(cookie.clone())
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        let value: Value = actix_test::read_body_json(response).await;
        let records = value.as_array().expect("array body");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("content"), Some(&serde_json::json!("Test A")));
        assert_eq!(records[0].get("isRead"), Some(&serde_json::json!(false)));
        assert_eq!(records[0].get("archived"), Some(&serde_json::json!(false)));
        let id = records[0]
            .get("id")
            .and_then(Value::as_str)
            .expect("record id")
            .to_owned();

        let request = actix_test::TestRequest::post()
            .uri(&format!("/api/admin/confessions/{id}/read-toggle"))
            .cookie(cookie.clone())
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let value: Value = actix_test::read_body_json(response).await;
        assert_eq!(value.get("isRead"), Some(&serde_json::json!(true)));
        assert_eq!(value.get("archived"), Some(&serde_json::json!(false)));

        let request = actix_test::TestRequest::post()
            .uri(&format!("/api/admin/confessions/{id}/archive-toggle"))
            .cookie(cookie.clone())
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        let value: Value = actix_test::read_body_json(response).await;
        assert_eq!(value.get("isRead"), Some(&serde_json::json!(true)));
        assert_eq!(value.get("archived"), Some(&serde_json::json!(true)));

        let request = actix_test::TestRequest::delete()
            .uri(&format!("/api/admin/confessions/{id}"))
            .cookie(cookie.clone())
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let request = actix_test::TestRequest::get()
            .uri("/api/admin/confessions")
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        let value: Value = actix_test::read_body_json(response).await;
        assert_eq!(value.as_array().map(Vec::len), Some(0));
    }

    #[actix_web::test]
    async fn toggling_an_unknown_id_is_not_found() {
        let app = actix_test::init_service(test_app(seeded_state())).await;
        let cookie = login_for_cookie!(&app);

        let request = actix_test::TestRequest::post()
            .uri("/api/admin/confessions/ghost/read-toggle")
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
