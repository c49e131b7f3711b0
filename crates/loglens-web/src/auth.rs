//! Caller identification, login and logout
//!
//! A request is privileged when it carries the configured API key in
//! `X-API-Key`, or a session cookie issued by a superuser login. Everything
//! else is anonymous. The identity is attached to the request as an
//! extension; deciding what the caller may do is left to the gate.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Extension, Form};
use loglens_core::constants::{API_KEY_HEADER, DEFAULT_SESSION_TTL_SECS, SESSION_COOKIE};
use loglens_core::{CallerIdentity, UserConfig};
use parking_lot::RwLock;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::{ui, AppState};

/// Lowercase hex SHA-256 of a password, as stored in `users[].password_sha256`
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Compare two byte strings without stopping at the first difference
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (&x, &y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

struct Session {
    identity: CallerIdentity,
    opened: Instant,
}

/// Credential store and in-memory session table
pub struct Authenticator {
    users: HashMap<String, UserConfig>,
    /// SHA-256 of the configured API key; comparing digests keeps the
    /// comparison length independent of the key
    api_key_digest: Option<[u8; 32]>,
    sessions: RwLock<HashMap<String, Session>>,
    session_ttl: Duration,
}

impl Authenticator {
    pub fn new(users: Vec<UserConfig>, api_key: Option<String>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.username.clone(), u)).collect(),
            api_key_digest: api_key
                .filter(|k| !k.is_empty())
                .map(|k| Sha256::digest(k.as_bytes()).into()),
            sessions: RwLock::new(HashMap::new()),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
        }
    }

    /// Sessions older than `ttl` are no longer accepted
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Check a username and password
    pub fn authenticate(&self, username: &str, password: &str) -> Option<CallerIdentity> {
        let user = self.users.get(username)?;
        let stored = hex::decode(user.password_sha256.trim()).ok()?;
        let provided = Sha256::digest(password.as_bytes());
        if constant_time_eq(&stored, provided.as_slice()) {
            Some(CallerIdentity::user(username, user.superuser))
        } else {
            None
        }
    }

    /// Start a session and return its token
    ///
    /// Expired sessions are dropped at the same time.
    pub fn open_session(&self, identity: CallerIdentity) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, session| session.opened.elapsed() < self.session_ttl);
        if sessions.len() < before {
            debug!("Dropped {} expired sessions", before - sessions.len());
        }
        sessions.insert(
            token.clone(),
            Session {
                identity,
                opened: Instant::now(),
            },
        );
        token
    }

    /// Identity of a live session
    fn session(&self, token: &str) -> Option<CallerIdentity> {
        {
            let sessions = self.sessions.read();
            let session = sessions.get(token)?;
            if session.opened.elapsed() < self.session_ttl {
                return Some(session.identity.clone());
            }
        }
        if let Some(session) = self.sessions.write().remove(token) {
            debug!("Session of {} expired", session.identity.display_name());
        }
        None
    }

    pub fn close_session(&self, token: &str) -> bool {
        self.sessions.write().remove(token).is_some()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Work out who is calling from the request headers
    pub fn identify(&self, headers: &HeaderMap) -> CallerIdentity {
        if let Some(expected) = &self.api_key_digest {
            if let Some(provided) = headers.get(API_KEY_HEADER) {
                let provided = Sha256::digest(provided.as_bytes());
                if constant_time_eq(expected, provided.as_slice()) {
                    return CallerIdentity::user("api-key", true);
                }
            }
        }

        session_token(headers)
            .and_then(|token| self.session(token))
            .unwrap_or_else(CallerIdentity::anonymous)
    }
}

/// Value of the session cookie, if the request has one
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
}

fn session_cookie(token: &str, path: &str, max_age: Duration) -> String {
    format!(
        "{}={}; Path={}; HttpOnly; SameSite=Strict; Max-Age={}",
        SESSION_COOKIE,
        token,
        path,
        max_age.as_secs()
    )
}

fn expired_cookie(path: &str) -> String {
    format!(
        "{}=; Path={}; HttpOnly; SameSite=Strict; Max-Age=0",
        SESSION_COOKIE, path
    )
}

/// Middleware attaching a [`CallerIdentity`] to every request
pub async fn identify(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let identity = state.auth.identify(request.headers());
    request.extensions_mut().insert(identity);
    next.run(request).await
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login_page(State(state): State<AppState>) -> Html<String> {
    Html(ui::render_login(&state.mount_path, None))
}

pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    match state.auth.authenticate(&form.username, &form.password) {
        Some(identity) if identity.privileged => {
            let token = state.auth.open_session(identity);
            info!("User {} logged in", form.username);
            let cookie = session_cookie(&token, &state.cookie_path(), state.auth.session_ttl());
            (
                [(header::SET_COOKIE, cookie)],
                Redirect::to(&state.url("/view")),
            )
                .into_response()
        }
        Some(_) => {
            warn!("Rejected login for non-superuser {}", form.username);
            let message = format!("{} is not a superuser", form.username);
            Html(ui::render_login(&state.mount_path, Some(&message))).into_response()
        }
        None => {
            warn!("Failed login for {}", form.username);
            Html(ui::render_login(&state.mount_path, Some("Invalid credentials"))).into_response()
        }
    }
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
    headers: HeaderMap,
) -> Response {
    if let Some(token) = session_token(&headers) {
        if state.auth.close_session(token) {
            info!("User {} logged out", identity.display_name());
        }
    }
    (
        [(header::SET_COOKIE, expired_cookie(&state.cookie_path()))],
        Redirect::to(&state.url("/login")),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn authenticator() -> Authenticator {
        Authenticator::new(
            vec![
                UserConfig {
                    username: "admin".into(),
                    password_sha256: hash_password("admin"),
                    superuser: true,
                },
                UserConfig {
                    username: "user".into(),
                    password_sha256: hash_password("user"),
                    superuser: false,
                },
            ],
            Some("secret-key".into()),
        )
    }

    #[test]
    fn test_hash_password() {
        assert_eq!(
            hash_password("admin"),
            "8c6976e5b5410415bde908bd4dee15dfb167a9c873fc4bb8a81f6f2ab448a918"
        );
    }

    #[test]
    fn test_authenticate() {
        let auth = authenticator();
        assert_eq!(
            auth.authenticate("admin", "admin"),
            Some(CallerIdentity::user("admin", true))
        );
        assert_eq!(
            auth.authenticate("user", "user"),
            Some(CallerIdentity::user("user", false))
        );
        assert!(auth.authenticate("admin", "wrong").is_none());
        assert!(auth.authenticate("nobody", "admin").is_none());
    }

    #[test]
    fn test_identify_by_session_cookie() {
        let auth = authenticator();
        let token = auth.open_session(CallerIdentity::user("admin", true));

        let mut headers = HeaderMap::new();
        let cookie = format!("theme=dark; {}={}", SESSION_COOKIE, token);
        headers.insert(header::COOKIE, HeaderValue::from_str(&cookie).unwrap());
        assert_eq!(auth.identify(&headers), CallerIdentity::user("admin", true));

        assert!(auth.close_session(&token));
        assert!(!auth.close_session(&token));
        assert_eq!(auth.identify(&headers), CallerIdentity::anonymous());
    }

    #[test]
    fn test_identify_by_api_key() {
        let auth = authenticator();
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static("secret-key"));
        assert!(auth.identify(&headers).privileged);

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("wrong"));
        assert_eq!(auth.identify(&headers), CallerIdentity::anonymous());
    }

    #[test]
    fn test_empty_api_key_disables_key_auth() {
        let auth = Authenticator::new(vec![], Some(String::new()));
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static(""));
        assert!(!auth.identify(&headers).authenticated);
    }

    #[test]
    fn test_authenticate_accepts_uppercase_hex() {
        let auth = Authenticator::new(
            vec![UserConfig {
                username: "admin".into(),
                password_sha256: hash_password("admin").to_uppercase(),
                superuser: true,
            }],
            None,
        );
        assert!(auth.authenticate("admin", "admin").is_some());
        assert!(auth.authenticate("admin", "Admin").is_none());
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"secret-key", b"secret-key"));
        assert!(!constant_time_eq(b"secret-key", b"secret-kex"));
        assert!(!constant_time_eq(b"secret", b"secret-key"));
    }

    #[test]
    fn test_expired_session_is_anonymous_and_dropped() {
        let auth = authenticator().with_session_ttl(Duration::ZERO);
        let token = auth.open_session(CallerIdentity::user("admin", true));
        assert_eq!(auth.session_count(), 1);

        let mut headers = HeaderMap::new();
        let cookie = format!("{}={}", SESSION_COOKIE, token);
        headers.insert(header::COOKIE, HeaderValue::from_str(&cookie).unwrap());
        assert_eq!(auth.identify(&headers), CallerIdentity::anonymous());
        assert_eq!(auth.session_count(), 0);
    }

    #[test]
    fn test_opening_a_session_prunes_expired_ones() {
        let auth = authenticator().with_session_ttl(Duration::ZERO);
        for _ in 0..3 {
            auth.open_session(CallerIdentity::user("admin", true));
        }
        assert_eq!(auth.session_count(), 1);
    }

    #[test]
    fn test_session_cookie_carries_max_age() {
        let cookie = session_cookie("abc", "/log-lens", Duration::from_secs(60));
        assert!(cookie.starts_with("loglens_session=abc; Path=/log-lens;"));
        assert!(cookie.ends_with("Max-Age=60"));
    }

    #[test]
    fn test_session_token_parsing() {
        let mut headers = HeaderMap::new();
        assert!(session_token(&headers).is_none());

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("a=1;loglens_session=abc ; b=2"),
        );
        assert_eq!(session_token(&headers), Some("abc"));
    }
}
