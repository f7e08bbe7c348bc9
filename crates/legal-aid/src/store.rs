use std::time::Duration;

use legal_common::redis::RedisCache;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::model::{AdviceRecord, DocumentRecord, Issue};

const KEY_PREFIX: &str = "legal_aid:v1";

/// Issues, advice history and document records kept in Redis as JSON.
///
/// Every call degrades: writes report `false` and reads report `None` (or an empty list)
/// when Redis is unreachable or a stored value no longer deserializes.
#[derive(Clone)]
pub struct RecordStore {
    redis: RedisCache,
    ttl: Option<Duration>,
}

impl RecordStore {
    /// A TTL under one second would be sent as `SETEX key 0`, which Redis rejects; it is
    /// treated as no expiry.
    pub fn new(redis: RedisCache, ttl: Option<Duration>) -> Self {
        Self {
            redis,
            ttl: ttl.filter(|t| t.as_secs() > 0),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.redis.is_configured()
    }

    pub async fn is_available(&self) -> bool {
        self.redis.is_available().await
    }

    pub async fn save_issue(&self, issue: &Issue) -> bool {
        let Some(raw) = encode(issue) else {
            return false;
        };
        let key = issue_key(&issue.id);
        match self.ttl {
            Some(ttl) => self.redis.set_with_ttl(&key, &raw, ttl.as_secs()).await,
            None => self.redis.set(&key, &raw).await,
        }
    }

    pub async fn load_issue(&self, issue_id: &str) -> Option<Issue> {
        let raw = self.redis.get(&issue_key(issue_id)).await?;
        decode(&raw)
    }

    pub async fn append_advice(&self, record: &AdviceRecord) -> bool {
        self.append(&advice_key(&record.issue_id), record).await
    }

    pub async fn advice_for(&self, issue_id: &str) -> Vec<AdviceRecord> {
        self.list(&advice_key(issue_id)).await
    }

    pub async fn append_document(&self, record: &DocumentRecord) -> bool {
        self.append(&documents_key(&record.issue_id), record).await
    }

    pub async fn documents_for(&self, issue_id: &str) -> Vec<DocumentRecord> {
        self.list(&documents_key(issue_id)).await
    }

    async fn append<T: Serialize>(&self, key: &str, value: &T) -> bool {
        let Some(raw) = encode(value) else {
            return false;
        };
        if !self.redis.rpush(key, &raw).await {
            return false;
        }
        if let Some(ttl) = self.ttl {
            let _ = self.redis.expire(key, ttl.as_secs()).await;
        }
        true
    }

    async fn list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        self.redis
            .lrange_all(key)
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|raw| decode(raw))
            .collect()
    }
}

fn issue_key(issue_id: &str) -> String {
    format!("{KEY_PREFIX}:issue:{issue_id}")
}

fn advice_key(issue_id: &str) -> String {
    format!("{KEY_PREFIX}:advice:{issue_id}")
}

fn documents_key(issue_id: &str) -> String {
    format!("{KEY_PREFIX}:documents:{issue_id}")
}

fn encode<T: Serialize>(value: &T) -> Option<String> {
    serde_json::to_string(value)
        .inspect_err(|e| warn!(error = %e, "failed to serialize record"))
        .ok()
}

fn decode<T: DeserializeOwned>(raw: &str) -> Option<T> {
    serde_json::from_str(raw)
        .inspect_err(|e| warn!(error = %e, "skipping unreadable stored record"))
        .ok()
}
