//! TTL-bounded in-memory resource store.
//!
//! Expired entries are dropped lazily on lookup and in bulk by
//! [`ResourceStore::cleanup`], which the background sweeper calls.
//! All methods are synchronous; the lock is never held across an await.

use base64::Engine;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// URI scheme and prefix of resources created by tools.
pub const TEMP_URI_PREFIX: &str = "geo-mcp://temp/";

/// URI for a temporary resource with `id`.
pub fn temp_uri(id: &str) -> String {
    format!("{}{}", TEMP_URI_PREFIX, id)
}

/// Payload of a stored resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceData {
    Json(Value),
    Text { text: String, mime_type: String },
    Binary { bytes: Bytes, mime_type: String },
}

impl ResourceData {
    pub fn mime_type(&self) -> &str {
        match self {
            ResourceData::Json(_) => "application/json",
            ResourceData::Text { mime_type, .. } | ResourceData::Binary { mime_type, .. } => {
                mime_type
            }
        }
    }

    /// Approximate payload size in bytes.
    pub fn size(&self) -> usize {
        match self {
            ResourceData::Json(value) => serde_json::to_vec(value).map(|v| v.len()).unwrap_or(0),
            ResourceData::Text { text, .. } => text.len(),
            ResourceData::Binary { bytes, .. } => bytes.len(),
        }
    }

    /// Entry of a `resources/read` `contents` array.
    pub fn to_contents(&self, uri: &str) -> Value {
        match self {
            ResourceData::Json(value) => json!({
                "uri": uri,
                "mimeType": self.mime_type(),
                "text": serde_json::to_string_pretty(value).unwrap_or_default(),
            }),
            ResourceData::Text { text, mime_type } => json!({
                "uri": uri,
                "mimeType": mime_type,
                "text": text,
            }),
            ResourceData::Binary { bytes, mime_type } => json!({
                "uri": uri,
                "mimeType": mime_type,
                "blob": base64::engine::general_purpose::STANDARD.encode(bytes),
            }),
        }
    }
}

/// One stored resource.
#[derive(Debug, Clone)]
pub struct Resource {
    pub id: String,
    pub uri: String,
    pub data: ResourceData,
    pub created_at: DateTime<Utc>,
    pub ttl: Duration,
    pub metadata: Option<Value>,
    created: Instant,
}

impl Resource {
    /// Expired once strictly more than `ttl` has elapsed since creation.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created) > self.ttl
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| self.created_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Entry of a `resources/list` response.
    pub fn listing(&self) -> Value {
        let mut entry = json!({
            "uri": self.uri,
            "name": self.id,
            "mimeType": self.data.mime_type(),
            "size": self.data.size(),
        });
        if let Some(description) = self
            .metadata
            .as_ref()
            .and_then(|m| m.get("description"))
            .and_then(Value::as_str)
        {
            entry["description"] = json!(description);
        }
        entry
    }
}

/// Resources keyed by URI.
#[derive(Debug)]
pub struct ResourceStore {
    entries: Mutex<HashMap<String, Resource>>,
    default_ttl: Duration,
}

impl ResourceStore {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Resource>> {
        // Entries stay consistent even if a holder panicked.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a resource, replacing any entry at the same URI.
    pub fn create(
        &self,
        id: impl Into<String>,
        uri: impl Into<String>,
        data: ResourceData,
        metadata: Option<Value>,
        ttl: Option<Duration>,
    ) -> Resource {
        let resource = Resource {
            id: id.into(),
            uri: uri.into(),
            data,
            created_at: Utc::now(),
            ttl: ttl.unwrap_or(self.default_ttl),
            metadata,
            created: Instant::now(),
        };
        tracing::debug!(uri = %resource.uri, ttl = ?resource.ttl, "resource_created");
        self.entries()
            .insert(resource.uri.clone(), resource.clone());
        resource
    }

    /// Live resource at `uri`. An expired entry is removed and reported absent.
    pub fn get(&self, uri: &str) -> Option<Resource> {
        let mut entries = self.entries();
        let now = Instant::now();
        match entries.get(uri) {
            Some(resource) if resource.is_expired_at(now) => {
                entries.remove(uri);
                tracing::debug!(uri, "resource_expired_on_read");
                None
            }
            Some(resource) => Some(resource.clone()),
            None => None,
        }
    }

    pub fn delete(&self, uri: &str) -> bool {
        self.entries().remove(uri).is_some()
    }

    /// Remove every expired entry. Returns how many were removed.
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, resource| !resource.is_expired_at(now));
        before - entries.len()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    /// Stored entries, including expired ones not yet evicted.
    pub fn count(&self) -> usize {
        self.entries().len()
    }

    /// Live resources, oldest first.
    pub fn list(&self) -> Vec<Resource> {
        let now = Instant::now();
        let mut live: Vec<Resource> = self
            .entries()
            .values()
            .filter(|resource| !resource.is_expired_at(now))
            .cloned()
            .collect();
        live.sort_by_key(|resource| resource.created);
        live
    }
}
