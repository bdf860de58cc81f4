// src/middleware/csrf.rs

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::SessionContext, i18n::Locale},
    services::auth::tokens_match,
};

pub const CSRF_HEADER: &str = "x-csrf-token";

fn is_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Exige o token CSRF da sessão em toda requisição que altera estado.
/// Roda depois do `session_guard`.
pub async fn csrf_guard(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if is_safe(request.method()) {
        return Ok(next.run(request).await);
    }

    let received = request
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let valid = request
        .extensions()
        .get::<SessionContext>()
        .map(|session| !received.is_empty() && tokens_match(&session.csrf_token, received))
        .unwrap_or(false);

    if !valid {
        tracing::warn!("🛡️ Token CSRF inválido em {} {}", request.method(), request.uri().path());
        let locale = Locale::from_headers(request.headers());
        return Err(AppError::CsrfTokenMismatch.to_api_error(&locale, &app_state.i18n_store));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    use axum::{
        body::Body,
        http::StatusCode,
        middleware::{from_fn, from_fn_with_state},
        routing::post,
        Router,
    };
    use http_body_util::BodyExt;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::{common::i18n::I18nStore, config::Settings};

    const TOKEN: &str = "a1b2c3d4e5f6";

    async fn inject_session(mut request: Request, next: Next) -> Response {
        request.extensions_mut().insert(SessionContext {
            session_id: "sessao-teste".into(),
            csrf_token: TOKEN.into(),
        });
        next.run(request).await
    }

    fn app(reached: Arc<AtomicBool>) -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/inexistente")
            .expect("url válida");
        let state = AppState::from_parts(pool, Settings::default(), I18nStore::load_embedded().expect("catálogos"));

        Router::new()
            .route(
                "/recurso",
                post(move || {
                    let reached = reached.clone();
                    async move {
                        reached.store(true, Ordering::SeqCst);
                        StatusCode::CREATED
                    }
                })
                .get(|| async { StatusCode::OK }),
            )
            .layer(from_fn_with_state(state, csrf_guard))
            .layer(from_fn(inject_session))
    }

    fn request(method: Method, token: Option<&str>) -> Request {
        let mut builder = Request::builder().method(method).uri("/recurso");
        if let Some(token) = token {
            builder = builder.header(CSRF_HEADER, token);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_post_without_token_is_rejected_before_handler() {
        let reached = Arc::new(AtomicBool::new(false));
        let response = app(reached.clone()).oneshot(request(Method::POST, None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(!reached.load(Ordering::SeqCst));

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].as_str().is_some_and(|msg| !msg.is_empty()));
    }

    #[tokio::test]
    async fn test_post_with_wrong_token_is_rejected() {
        let reached = Arc::new(AtomicBool::new(false));
        let response = app(reached.clone())
            .oneshot(request(Method::POST, Some("outro-token")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(!reached.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_post_with_session_token_passes() {
        let reached = Arc::new(AtomicBool::new(false));
        let response = app(reached.clone()).oneshot(request(Method::POST, Some(TOKEN))).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(reached.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_safe_methods_skip_check() {
        let response = app(Arc::new(AtomicBool::new(false)))
            .oneshot(request(Method::GET, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
