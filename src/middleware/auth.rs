// src/middleware/auth.rs

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRef, FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::{audit::ClientInfo, auth::User},
    services::auth::fingerprint,
};

pub const SESSION_COOKIE: &str = "sid";

/// Sessão resolvida pelo `session_guard`.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: String,
    pub csrf_token: String,
}

// Usuário autenticado, inserido nos extensions pelo `session_guard`
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

fn header_str<'a>(headers: &'a HeaderMap, name: header::HeaderName) -> &'a str {
    headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or("")
}

/// Fingerprint do cliente a partir dos headers da requisição.
pub fn request_fingerprint(headers: &HeaderMap) -> String {
    fingerprint(
        header_str(headers, header::USER_AGENT),
        header_str(headers, header::ACCEPT_LANGUAGE),
        header_str(headers, header::ACCEPT_ENCODING),
    )
}

/// IP e user agent do cliente.
///
/// O IP é o da conexão. O primeiro valor de `x-forwarded-for` só é usado com
/// `trust_proxy`, pois o header é controlado pelo cliente e o IP é a chave do
/// limite de tentativas de login.
pub fn client_info(headers: &HeaderMap, remote: Option<SocketAddr>, trust_proxy: bool) -> ClientInfo {
    let forwarded = headers
        .get("x-forwarded-for")
        .filter(|_| trust_proxy)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty());

    ClientInfo {
        ip: forwarded.or_else(|| remote.map(|addr| addr.ip().to_string())),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    }
}

fn remote_addr(extensions: &axum::http::Extensions) -> Option<SocketAddr> {
    extensions.get::<ConnectInfo<SocketAddr>>().map(|ConnectInfo(addr)| *addr)
}

// O middleware em si
pub async fn session_guard(
    State(app_state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let locale = Locale::from_headers(request.headers());
    let client = client_info(
        request.headers(),
        remote_addr(request.extensions()),
        app_state.settings.trust_proxy,
    );

    let session_id = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| AppError::SessionRequired.to_api_error(&locale, &app_state.i18n_store))?;

    let (user, session) = app_state
        .auth_service
        .validate_session(&session_id, &request_fingerprint(request.headers()), &client)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let extensions = request.extensions_mut();
    extensions.insert(AuthenticatedUser(user));
    extensions.insert(SessionContext {
        session_id: session.id,
        csrf_token: session.csrf_token,
    });
    extensions.insert(client);

    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(user.clone());
        }
        let app_state = AppState::from_ref(state);
        Err(AppError::SessionRequired.to_api_error(&Locale::from_headers(&parts.headers), &app_state.i18n_store))
    }
}

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<SessionContext>() {
            return Ok(session.clone());
        }
        let app_state = AppState::from_ref(state);
        Err(AppError::SessionRequired.to_api_error(&Locale::from_headers(&parts.headers), &app_state.i18n_store))
    }
}

// Rotas públicas (login) não passam pelo guard: calcula na hora
impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(client) = parts.extensions.get::<ClientInfo>() {
            return Ok(client.clone());
        }
        let app_state = AppState::from_ref(state);
        Ok(client_info(
            &parts.headers,
            remote_addr(&parts.extensions),
            app_state.settings.trust_proxy,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use rstest::rstest;

    fn forwarded(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_forwarded_header_does_not_change_ip_without_trusted_proxy() {
        let socket: SocketAddr = "198.51.100.9:40000".parse().unwrap();

        let ips: Vec<Option<String>> = (0..6)
            .map(|i| client_info(&forwarded(&format!("10.0.0.{i}")), Some(socket), false).ip)
            .collect();

        assert!(ips.iter().all(|ip| ip.as_deref() == Some("198.51.100.9")));
    }

    #[rstest]
    #[case(true, Some("203.0.113.7"))]
    #[case(false, Some("127.0.0.1"))]
    fn test_client_info_forwarded_ip_only_behind_proxy(#[case] trust_proxy: bool, #[case] expected: Option<&str>) {
        let mut headers = forwarded("203.0.113.7, 10.0.0.1");
        headers.insert(header::USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));

        let client = client_info(&headers, Some("127.0.0.1:5000".parse().unwrap()), trust_proxy);
        assert_eq!(client.ip.as_deref(), expected);
        assert_eq!(client.user_agent.as_deref(), Some("Mozilla/5.0"));
    }

    #[test]
    fn test_client_info_falls_back_to_connection() {
        let client = client_info(&HeaderMap::new(), Some("192.168.1.20:4431".parse().unwrap()), true);
        assert_eq!(client.ip.as_deref(), Some("192.168.1.20"));
        assert!(client.user_agent.is_none());
    }

    #[test]
    fn test_fingerprint_changes_with_user_agent() {
        let mut a = HeaderMap::new();
        a.insert(header::USER_AGENT, HeaderValue::from_static("Firefox"));
        let mut b = HeaderMap::new();
        b.insert(header::USER_AGENT, HeaderValue::from_static("Chrome"));
        assert_ne!(request_fingerprint(&a), request_fingerprint(&b));
    }
}
