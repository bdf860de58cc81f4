// src/handlers/auth.rs

use axum::{extract::State, http::{HeaderMap, StatusCode}, response::IntoResponse, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::{request_fingerprint, AuthenticatedUser, SessionContext, SESSION_COOKIE},
        i18n::Locale,
    },
    models::{
        audit::ClientInfo,
        auth::{LoginUserPayload, SessionResponse},
    },
};

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Sessão criada; cookie `sid` definido", body = SessionResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Credenciais inválidas"),
        (status = 429, description = "Muitas tentativas a partir deste IP")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    client: ClientInfo,
    headers: HeaderMap,
    jar: CookieJar,
    Json(payload): Json<LoginUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let (user, session) = app_state
        .auth_service
        .login(&payload.email, &payload.password, &request_fingerprint(&headers), &client)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let cookie = Cookie::build((SESSION_COOKIE, session.id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(app_state.settings.cookie_secure);

    Ok((
        StatusCode::OK,
        jar.add(cookie),
        Json(SessionResponse { user, csrf_token: session.csrf_token }),
    ))
}

// POST /api/auth/logout
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 204, description = "Sessão encerrada"),
        (status = 401, description = "Sem sessão"),
        (status = 403, description = "Token CSRF inválido")
    ),
    security(("session_cookie" = []))
)]
pub async fn logout(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    session: SessionContext,
    client: ClientInfo,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .auth_service
        .logout(&session.session_id, user.id, &client)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Cerrar sesión", "sessions", None, &client)
        .await;

    Ok((StatusCode::NO_CONTENT, jar.remove(Cookie::build(SESSION_COOKIE).path("/"))))
}

// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Usuário da sessão e token CSRF", body = SessionResponse),
        (status = 401, description = "Sem sessão")
    ),
    security(("session_cookie" = []))
)]
pub async fn me(
    AuthenticatedUser(user): AuthenticatedUser,
    session: SessionContext,
) -> Json<SessionResponse> {
    Json(SessionResponse { user, csrf_token: session.csrf_token })
}
