use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

pub const SESSION_COOKIE_NAME: &str = "deskmate_session";

#[derive(Debug, Clone)]
struct SessionRecord {
    uploaded_file: Option<String>,
    expires_at: DateTime<Utc>,
}

/// Per-browser upload state keyed by an opaque cookie value.
#[derive(Debug, Clone)]
pub struct SessionStore {
    records: Arc<RwLock<HashMap<String, SessionRecord>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Filename of the most recent upload in the caller's session, if it is still live.
    pub fn uploaded_file(&self, headers: &HeaderMap) -> Option<String> {
        let session_id = read_cookie_value(headers, SESSION_COOKIE_NAME)?;
        let now = Utc::now();

        let expired = {
            let records = self.records.read();
            match records.get(&session_id) {
                Some(record) if record.expires_at > now => return record.uploaded_file.clone(),
                Some(_) => true,
                None => false,
            }
        };
        if expired {
            self.records.write().remove(&session_id);
            tracing::debug!("expired session dropped");
        }
        None
    }

    /// Records `filename` against the caller's session. Returns a `Set-Cookie` value when a
    /// new session had to be created.
    pub fn record_upload(&self, headers: &HeaderMap, filename: &str) -> Option<String> {
        let now = Utc::now();
        let expires_at = now
            + chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::days(1));

        let mut records = self.records.write();
        records.retain(|_, record| record.expires_at > now);

        if let Some(session_id) = read_cookie_value(headers, SESSION_COOKIE_NAME) {
            if let Some(record) = records.get_mut(&session_id) {
                record.uploaded_file = Some(filename.to_string());
                record.expires_at = expires_at;
                return None;
            }
        }

        let session_id = uuid::Uuid::new_v4().simple().to_string();
        records.insert(
            session_id.clone(),
            SessionRecord {
                uploaded_file: Some(filename.to_string()),
                expires_at,
            },
        );
        Some(build_session_cookie(
            SESSION_COOKIE_NAME,
            &session_id,
            self.ttl.as_secs(),
        ))
    }
}

pub fn read_cookie_value(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let raw_cookie = headers.get(header::COOKIE)?.to_str().ok()?;
    raw_cookie.split(';').find_map(|part| {
        let mut split = part.trim().splitn(2, '=');
        let key = split.next()?.trim();
        let value = split.next()?.trim();
        if key == cookie_name && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

pub fn build_session_cookie(cookie_name: &str, session_id: &str, max_age_seconds: u64) -> String {
    [
        format!("{cookie_name}={session_id}"),
        "Path=/".to_string(),
        "HttpOnly".to_string(),
        "SameSite=Lax".to_string(),
        format!("Max-Age={max_age_seconds}"),
    ]
    .join("; ")
}
