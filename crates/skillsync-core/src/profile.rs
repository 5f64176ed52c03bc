//! User profile store client.
//!
//! The profile lives in a remote document store; this module only reads and
//! patches documents. Updates use dotted field paths (`skills.Python.current`)
//! so concurrent writers touch individual fields rather than whole documents.

use crate::error::{CoreError, CoreResult};
use crate::types::UserProfile;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Read/write access to user profile documents.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the user's profile, creating a default document for new users.
    async fn get_stats(&self, user_id: &str) -> CoreResult<UserProfile>;

    /// Patch individual fields. Keys are dotted paths into the document.
    async fn update(&self, user_id: &str, fields: Map<String, Value>) -> CoreResult<()>;
}

/// Default document for a first-time user.
pub fn default_stats() -> Value {
    json!({
        "skillsMastered": 0,
        "totalSkills": 0,
        "daysStreak": 1,
        "interviewsPassed": 0,
        "jobReadiness": 25,
        "skills": {},
        "tasks": [],
        "lastActive": chrono::Utc::now(),
        "skillsSetup": false
    })
}

/// Set `value` at a dotted `path` inside `doc`, creating intermediate objects.
pub(crate) fn apply_dotted(doc: &mut Value, path: &str, value: Value) {
    if !doc.is_object() {
        *doc = Value::Object(Map::new());
    }
    let mut node = doc;
    let mut parts = path.split('.').peekable();
    while let Some(part) = parts.next() {
        let map = match node.as_object_mut() {
            Some(map) => map,
            None => return,
        };
        if parts.peek().is_none() {
            map.insert(part.to_string(), value);
            return;
        }
        let child = map
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !child.is_object() {
            *child = Value::Object(Map::new());
        }
        node = child;
    }
}

/// In-memory profile store. Backs tests and offline development; applies the
/// same dotted-path update semantics as the remote store.
#[derive(Default)]
pub struct MemoryProfileStore {
    docs: RwLock<HashMap<String, Value>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a profile document, replacing any existing one.
    pub async fn insert_profile(&self, user_id: &str, profile: &UserProfile) -> CoreResult<()> {
        let doc = serde_json::to_value(profile)?;
        self.docs.write().await.insert(user_id.to_string(), doc);
        Ok(())
    }

    /// Raw document access for assertions in tests.
    pub async fn document(&self, user_id: &str) -> Option<Value> {
        self.docs.read().await.get(user_id).cloned()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get_stats(&self, user_id: &str) -> CoreResult<UserProfile> {
        {
            let docs = self.docs.read().await;
            if let Some(doc) = docs.get(user_id) {
                return Ok(serde_json::from_value(doc.clone())?);
            }
        }
        debug!(user_id, "creating default profile document");
        let doc = default_stats();
        let profile = serde_json::from_value(doc.clone())?;
        self.docs.write().await.insert(user_id.to_string(), doc);
        Ok(profile)
    }

    async fn update(&self, user_id: &str, fields: Map<String, Value>) -> CoreResult<()> {
        let mut docs = self.docs.write().await;
        let doc = docs
            .entry(user_id.to_string())
            .or_insert_with(default_stats);
        for (path, value) in fields {
            apply_dotted(doc, &path, value);
        }
        Ok(())
    }
}

/// Profile store backed by the remote document-store REST API.
///
/// `GET {base}/users/{id}` reads a document (404 for new users), and
/// `PATCH {base}/users/{id}` applies dotted-path field updates.
pub struct RestProfileStore {
    base_url: String,
    client: reqwest::Client,
}

impl RestProfileStore {
    pub fn new(base_url: impl Into<String>) -> CoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| CoreError::ProfileStore(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn user_url(&self, user_id: &str) -> String {
        format!("{}/users/{}", self.base_url, user_id)
    }
}

#[async_trait]
impl ProfileStore for RestProfileStore {
    async fn get_stats(&self, user_id: &str) -> CoreResult<UserProfile> {
        let res = self.client.get(self.user_url(user_id)).send().await?;
        if res.status() == reqwest::StatusCode::NOT_FOUND {
            // First login: create the default document server-side.
            let doc = default_stats();
            let put = self
                .client
                .put(self.user_url(user_id))
                .json(&doc)
                .send()
                .await?;
            if !put.status().is_success() {
                warn!(user_id, status = %put.status(), "default profile creation failed");
                return Err(CoreError::ProfileStore(format!(
                    "create default profile: HTTP {}",
                    put.status()
                )));
            }
            return Ok(serde_json::from_value(doc)?);
        }
        if !res.status().is_success() {
            return Err(CoreError::ProfileStore(format!(
                "fetch profile: HTTP {}",
                res.status()
            )));
        }
        Ok(res.json().await?)
    }

    async fn update(&self, user_id: &str, fields: Map<String, Value>) -> CoreResult<()> {
        let res = self
            .client
            .patch(self.user_url(user_id))
            .json(&Value::Object(fields))
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(CoreError::ProfileStore(format!(
                "update profile: HTTP {}",
                res.status()
            )));
        }
        Ok(())
    }
}
