//! In-memory session state bridged out of the browser.
//!
//! Cookies harvested by the driver after a successful login are carried
//! here so the plain HTTP client can keep polling without the browser.
//! Nothing is persisted; a failed login or detected expiry simply drops
//! the value.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;

/// Cookies and lifetime accounting for one authenticated portal session.
#[derive(Debug, Clone, Default)]
pub struct SessionData {
    /// Session cookies (name -> value).
    pub cookies: BTreeMap<String, String>,

    /// When the session was captured (Unix timestamp).
    pub captured_at: Option<i64>,

    /// Seconds the session has been polled for, advanced once per cycle.
    pub lifetime_secs: u64,
}

impl SessionData {
    /// Create a new empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a session from cookies read out of the browser.
    pub fn from_browser_cookies<I>(cookies: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            cookies: cookies.into_iter().collect(),
            captured_at: Some(Utc::now().timestamp()),
            lifetime_secs: 0,
        }
    }

    /// Add a cookie.
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Format cookies as a Cookie header value.
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Advance the lifetime counter by one poll interval.
    pub fn advance(&mut self, interval: Duration) {
        self.lifetime_secs += interval.as_secs();
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}
