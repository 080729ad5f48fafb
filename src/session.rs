//! Per-browser session context, keyed by an opaque cookie.

use std::collections::HashMap;
use std::sync::Mutex;

use axum::http::{header, HeaderMap, HeaderValue};
use cookie::{Cookie, SameSite};

use crate::views::Page;

pub const SESSION_COOKIE: &str = "nutrigen_session";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub logged_in: bool,
    pub username: Option<String>,
    pub current_page: Page,
    /// Shown once on the next rendered page, then dropped.
    pub messages: Vec<String>,
}

impl SessionContext {
    pub fn push_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }

    pub fn sign_in(&mut self, username: &str) {
        self.logged_in = true;
        self.username = Some(username.to_string());
    }

    pub fn sign_out(&mut self) {
        self.logged_in = false;
        self.username = None;
    }

    /// Whether anything here must survive to the next interaction.
    fn carries_state(&self) -> bool {
        self.logged_in || self.username.is_some() || !self.messages.is_empty()
    }
}

/// A rehydrated session for one interaction.
#[derive(Debug)]
pub struct Session {
    pub id: String,
    pub context: SessionContext,
    is_new: bool,
}

impl Session {
    /// `Set-Cookie` value to attach when the browser has no session yet.
    pub fn set_cookie(&self) -> Option<HeaderValue> {
        if !self.is_new {
            return None;
        }
        let cookie = Cookie::build((SESSION_COOKIE, self.id.clone()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build();
        HeaderValue::from_str(&cookie.to_string()).ok()
    }
}

#[derive(Debug, Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<String, SessionContext>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the session named by the request cookie, or start a new one.
    pub fn resolve(&self, headers: &HeaderMap) -> Session {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(id) = session_id(headers) {
            if let Some(context) = guard.get(&id) {
                return Session {
                    id,
                    context: context.clone(),
                    is_new: false,
                };
            }
        }
        Session {
            id: uuid::Uuid::new_v4().to_string(),
            context: SessionContext::default(),
            is_new: true,
        }
    }

    /// Write the session back. A new session with nothing to remember is not
    /// kept, so cookieless visitors leave no entry behind. Returns whether the
    /// session is now stored and its cookie should be sent.
    pub fn store(&self, session: &Session) -> bool {
        if session.is_new && !session.context.carries_state() {
            return false;
        }
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.insert(session.id.clone(), session.context.clone());
        true
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|raw| Cookie::split_parse(raw))
        .filter_map(Result::ok)
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn unknown_browser_gets_fresh_session_and_cookie() {
        let store = SessionStore::new();
        let session = store.resolve(&HeaderMap::new());
        assert_eq!(session.context, SessionContext::default());
        let cookie = session.set_cookie().unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("nutrigen_session="));
        assert!(cookie.contains("HttpOnly"));
    }

    #[test]
    fn stored_session_is_rehydrated_from_cookie() {
        let store = SessionStore::new();
        let mut session = store.resolve(&HeaderMap::new());
        session.context.sign_in("alice");
        session.context.current_page = Page::MealPlan;
        assert!(store.store(&session));

        let again = store.resolve(&headers_with_cookie(&format!(
            "theme=dark; {SESSION_COOKIE}={}",
            session.id
        )));
        assert_eq!(again.id, session.id);
        assert!(again.context.logged_in);
        assert_eq!(again.context.username.as_deref(), Some("alice"));
        assert_eq!(again.context.current_page, Page::MealPlan);
        assert!(again.set_cookie().is_none());
    }

    #[test]
    fn stale_cookie_starts_over() {
        let store = SessionStore::new();
        let session = store.resolve(&headers_with_cookie("nutrigen_session=gone"));
        assert_ne!(session.id, "gone");
        assert!(session.set_cookie().is_some());
    }

    #[test]
    fn fresh_session_without_state_is_not_kept() {
        let store = SessionStore::new();
        for _ in 0..100 {
            let mut session = store.resolve(&HeaderMap::new());
            session.context.current_page = Page::About;
            assert!(!store.store(&session));
        }
        assert!(store.is_empty());
    }

    #[test]
    fn fresh_session_with_a_message_is_kept() {
        let store = SessionStore::new();
        let mut session = store.resolve(&HeaderMap::new());
        session.context.push_message("Invalid username or password.");
        assert!(store.store(&session));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn existing_session_is_kept_after_logout() {
        let store = SessionStore::new();
        let mut session = store.resolve(&HeaderMap::new());
        session.context.sign_in("alice");
        assert!(store.store(&session));

        let mut again = store.resolve(&headers_with_cookie(&format!(
            "{SESSION_COOKIE}={}",
            session.id
        )));
        again.context.sign_out();
        assert!(store.store(&again));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn messages_are_drained_once() {
        let mut ctx = SessionContext::default();
        ctx.push_message("Registration successful.");
        assert_eq!(ctx.take_messages(), vec!["Registration successful.".to_string()]);
        assert!(ctx.take_messages().is_empty());
    }
}
