// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};

use crate::{
    common::error::AppError,
    db::{LogRepository, SessionRepository, UserRepository},
    models::{
        audit::{
            ClientInfo, EVENT_LOGIN_FAILED, EVENT_LOGIN_OK, EVENT_LOGOUT, EVENT_SESSION_HIJACK,
        },
        auth::{Session, User},
    },
};

/// Falhas de login toleradas por IP dentro da janela.
pub const MAX_LOGIN_ATTEMPTS: i64 = 5;
pub const LOGIN_WINDOW_MINUTES: i64 = 15;

// ---
// Funções puras (tokens, fingerprint, expiração)
// ---

/// 32 bytes aleatórios em hexadecimal. Usado para id de sessão e token CSRF.
pub fn generate_token() -> String {
    hex::encode(rand::random::<[u8; 32]>())
}

/// SHA-256 de User-Agent|Accept-Language|Accept-Encoding.
pub fn fingerprint(user_agent: &str, accept_language: &str, accept_encoding: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_agent.as_bytes());
    hasher.update(b"|");
    hasher.update(accept_language.as_bytes());
    hasher.update(b"|");
    hasher.update(accept_encoding.as_bytes());
    hex::encode(hasher.finalize())
}

/// Comparação em tempo constante (para o mesmo tamanho).
pub fn tokens_match(expected: &str, received: &str) -> bool {
    let (a, b) = (expected.as_bytes(), received.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

pub fn is_idle_expired(last_activity: DateTime<Utc>, now: DateTime<Utc>, timeout_secs: i64) -> bool {
    now - last_activity > Duration::seconds(timeout_secs)
}

pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(valid)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    session_repo: SessionRepository,
    log_repo: LogRepository,
    session_timeout_secs: i64,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        session_repo: SessionRepository,
        log_repo: LogRepository,
        session_timeout_secs: i64,
    ) -> Self {
        Self { user_repo, session_repo, log_repo, session_timeout_secs }
    }

    // Eventos de segurança nunca derrubam a requisição
    async fn security_event(&self, user_id: Option<uuid::Uuid>, event: &str, event_type: &str, client: &ClientInfo) {
        if let Err(e) = self
            .log_repo
            .insert_security_event(user_id, event, event_type, client.ip.as_deref(), client.user_agent.as_deref())
            .await
        {
            tracing::error!("Falha ao gravar evento de segurança '{}': {}", event_type, e);
        }
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
        fingerprint: &str,
        client: &ClientInfo,
    ) -> Result<(User, Session), AppError> {
        if let Some(ip) = client.ip.as_deref() {
            let since = Utc::now() - Duration::minutes(LOGIN_WINDOW_MINUTES);
            let failures = self
                .log_repo
                .count_security_events_since(ip, EVENT_LOGIN_FAILED, since)
                .await?;
            if failures >= MAX_LOGIN_ATTEMPTS {
                tracing::warn!("🚫 Login bloqueado para o IP {} ({} falhas)", ip, failures);
                return Err(AppError::TooManyLoginAttempts);
            }
        }

        let user = match self.user_repo.find_by_email(email.trim()).await? {
            Some(user) if user.active => user,
            _ => {
                self.security_event(None, &format!("Login fallido para {}", email.trim()), EVENT_LOGIN_FAILED, client)
                    .await;
                return Err(AppError::InvalidCredentials);
            }
        };

        if !verify_password(password, &user.password_hash).await? {
            self.user_repo.register_failed_attempt(user.id).await?;
            self.security_event(Some(user.id), "Contraseña incorrecta", EVENT_LOGIN_FAILED, client)
                .await;
            return Err(AppError::InvalidCredentials);
        }

        self.user_repo.register_successful_login(user.id).await?;

        let session = self
            .session_repo
            .create(&generate_token(), user.id, &generate_token(), fingerprint, client.ip.as_deref())
            .await?;

        self.security_event(Some(user.id), "Inicio de sesión", EVENT_LOGIN_OK, client).await;
        tracing::info!("🔑 Sessão criada para o usuário {}", user.id);

        Ok((user, session))
    }

    /// Resolve a sessão do cookie. Sessões expiradas ou com fingerprint
    /// diferente são destruídas.
    pub async fn validate_session(
        &self,
        session_id: &str,
        fingerprint: &str,
        client: &ClientInfo,
    ) -> Result<(User, Session), AppError> {
        let session = self
            .session_repo
            .find(session_id)
            .await?
            .ok_or(AppError::SessionRequired)?;

        if is_idle_expired(session.last_activity, Utc::now(), self.session_timeout_secs) {
            self.session_repo.delete(&session.id).await?;
            return Err(AppError::SessionExpired);
        }

        if !tokens_match(&session.fingerprint, fingerprint) {
            self.session_repo.delete(&session.id).await?;
            self.security_event(Some(session.user_id), "Fingerprint de sesión distinto", EVENT_SESSION_HIJACK, client)
                .await;
            tracing::warn!("⚠️ Fingerprint divergente na sessão do usuário {}", session.user_id);
            return Err(AppError::SessionFingerprintMismatch);
        }

        let user = match self.user_repo.find_by_id(session.user_id).await? {
            Some(user) if user.active => user,
            _ => {
                self.session_repo.delete(&session.id).await?;
                return Err(AppError::SessionRequired);
            }
        };

        self.session_repo.touch(&session.id).await?;

        Ok((user, session))
    }

    pub async fn logout(&self, session_id: &str, user_id: uuid::Uuid, client: &ClientInfo) -> Result<(), AppError> {
        self.session_repo.delete(session_id).await?;
        self.security_event(Some(user_id), "Cierre de sesión", EVENT_LOGOUT, client).await;
        Ok(())
    }

    pub async fn purge_idle_sessions(&self) -> Result<u64, AppError> {
        let cutoff = Utc::now() - Duration::seconds(self.session_timeout_secs);
        self.session_repo.delete_idle_since(cutoff).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_64_hex_chars_and_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_depends_on_every_header() {
        let base = fingerprint("Mozilla/5.0", "es-AR", "gzip");
        assert_eq!(base, fingerprint("Mozilla/5.0", "es-AR", "gzip"));
        assert_ne!(base, fingerprint("curl/8.0", "es-AR", "gzip"));
        assert_ne!(base, fingerprint("Mozilla/5.0", "en", "gzip"));
        assert_ne!(base, fingerprint("Mozilla/5.0", "es-AR", "br"));
    }

    #[test]
    fn test_tokens_match() {
        assert!(tokens_match("abc123", "abc123"));
        assert!(!tokens_match("abc123", "abc124"));
        assert!(!tokens_match("abc123", "abc12"));
        assert!(!tokens_match("abc123", ""));
    }

    #[test]
    fn test_idle_expiration() {
        let now = Utc::now();
        assert!(!is_idle_expired(now - Duration::seconds(3599), now, 3600));
        assert!(is_idle_expired(now - Duration::seconds(3601), now, 3600));
    }

    #[tokio::test]
    async fn test_password_hash_roundtrip() {
        let hashed = hash_password("Secreta#2025").await.unwrap();
        assert!(verify_password("Secreta#2025", &hashed).await.unwrap());
        assert!(!verify_password("otra", &hashed).await.unwrap());
    }
}
