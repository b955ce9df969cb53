//! Response and data caching with a durable/local dual backend
//!
//! The store prefers Redis (native TTLs, shared across processes) and falls
//! back to a process-local map when Redis cannot be reached at startup. The
//! fallback is permanent for the lifetime of the process; a cache must never
//! block or fail the caller, so every runtime error degrades to a miss or a
//! no-op.

use crate::config::AssistantConfig;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Derive a deterministic cache key from a namespace and payload
///
/// String payloads are hashed as-is. Structured payloads are canonicalized
/// through `serde_json::Value`, whose object map is ordered by key at every
/// nesting level, so field order in the caller never changes the key.
pub fn derive_key<P: Serialize + ?Sized>(namespace: &str, payload: &P) -> String {
    let canonical = match serde_json::to_value(payload) {
        Ok(Value::String(s)) => s,
        Ok(value) => value.to_string(),
        Err(_) => String::new(),
    };
    let digest = Sha256::digest(canonical.as_bytes());
    format!("{namespace}:{}", hex::encode(digest))
}

/// A locally cached value with its absolute expiry
#[derive(Debug, Clone)]
struct LocalEntry {
    value: Value,
    expires_at: Instant,
}

/// The active cache backend
#[derive(Clone)]
enum Backend {
    /// Durable backend with native TTL support
    Redis(ConnectionManager),
    /// Process-local map; entries are expired lazily on read
    Local(Arc<RwLock<HashMap<String, LocalEntry>>>),
}

/// Best-effort cache store
///
/// Cloning is cheap; clones share the same backend.
#[derive(Clone)]
pub struct CacheStore {
    backend: Backend,
}

impl CacheStore {
    /// Connect to the configured backend
    ///
    /// Attempts Redis when a URL is configured, with a short timeout; any
    /// failure selects the in-memory map for the rest of the process.
    pub async fn connect(config: &AssistantConfig) -> Self {
        if let Some(url) = &config.redis_url {
            match Self::connect_redis(url, config.redis_connect_timeout).await {
                Ok(manager) => {
                    info!("Connected to Redis cache");
                    return Self {
                        backend: Backend::Redis(manager),
                    };
                }
                Err(e) => {
                    warn!("Redis not available: {e}. Using in-memory cache.");
                }
            }
        }
        Self::in_memory()
    }

    /// Create a store backed only by the process-local map
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Local(Arc::new(RwLock::new(HashMap::new()))),
        }
    }

    async fn connect_redis(url: &str, timeout: Duration) -> redis::RedisResult<ConnectionManager> {
        let client = redis::Client::open(url)?;
        let mut manager = tokio::time::timeout(timeout, client.get_connection_manager())
            .await
            .map_err(|_| {
                redis::RedisError::from((redis::ErrorKind::IoError, "connection timed out"))
            })??;
        redis::cmd("PING").query_async::<()>(&mut manager).await?;
        Ok(manager)
    }

    /// Whether the durable backend is in use
    pub fn is_durable(&self) -> bool {
        matches!(self.backend, Backend::Redis(_))
    }

    /// Get a cached value
    ///
    /// Returns `None` on a miss, an expired entry, a deserialization
    /// mismatch, or any backend error.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match &self.backend {
            Backend::Redis(manager) => {
                let mut conn = manager.clone();
                match conn.get::<_, Option<String>>(key).await {
                    Ok(Some(raw)) => match serde_json::from_str(&raw) {
                        Ok(value) => {
                            debug!("Cache hit for key: {key}");
                            Some(value)
                        }
                        Err(e) => {
                            warn!("Cache entry for {key} failed to decode: {e}");
                            None
                        }
                    },
                    Ok(None) => None,
                    Err(e) => {
                        warn!("Cache get error: {e}");
                        None
                    }
                }
            }
            Backend::Local(map) => {
                let mut map = map.write().await;
                match map.get(key) {
                    Some(entry) if entry.expires_at > Instant::now() => {
                        debug!("Cache hit for key: {key}");
                        serde_json::from_value(entry.value.clone()).ok()
                    }
                    Some(_) => {
                        // Expired; evict on read
                        map.remove(key);
                        None
                    }
                    None => None,
                }
            }
        }
    }

    /// Store a value with a TTL
    ///
    /// Failures are logged and swallowed.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        match &self.backend {
            Backend::Redis(manager) => {
                let raw = match serde_json::to_string(value) {
                    Ok(raw) => raw,
                    Err(e) => {
                        warn!("Cache set skipped, value failed to encode: {e}");
                        return;
                    }
                };
                let mut conn = manager.clone();
                // SET EX requires a positive TTL
                let seconds = ttl.as_secs().max(1);
                if let Err(e) = conn.set_ex::<_, _, ()>(key, raw, seconds).await {
                    warn!("Cache set error: {e}");
                }
            }
            Backend::Local(map) => {
                let value = match serde_json::to_value(value) {
                    Ok(value) => value,
                    Err(e) => {
                        warn!("Cache set skipped, value failed to encode: {e}");
                        return;
                    }
                };
                map.write().await.insert(
                    key.to_string(),
                    LocalEntry {
                        value,
                        expires_at: Instant::now() + ttl,
                    },
                );
            }
        }
    }

    /// Clear cached entries
    ///
    /// With a prefix, removes only keys in that namespace; without one,
    /// flushes the whole store.
    pub async fn clear(&self, prefix: Option<&str>) {
        match &self.backend {
            Backend::Redis(manager) => {
                let mut conn = manager.clone();
                let result = match prefix {
                    Some(prefix) => Self::clear_redis_prefix(&mut conn, prefix).await,
                    None => redis::cmd("FLUSHDB").query_async::<()>(&mut conn).await,
                };
                if let Err(e) = result {
                    warn!("Cache clear error: {e}");
                }
            }
            Backend::Local(map) => {
                let mut map = map.write().await;
                match prefix {
                    Some(prefix) => {
                        let prefix = format!("{prefix}:");
                        map.retain(|key, _| !key.starts_with(&prefix));
                    }
                    None => map.clear(),
                }
            }
        }
    }

    /// Delete keys under `prefix:` in bounded batches via SCAN
    ///
    /// Cursor-based so a large keyspace never blocks the server the way a
    /// KEYS sweep would.
    async fn clear_redis_prefix(
        conn: &mut ConnectionManager,
        prefix: &str,
    ) -> redis::RedisResult<()> {
        let pattern = format!("{prefix}:*");
        let mut cursor: u64 = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(conn)
                .await?;
            if !keys.is_empty() {
                let mut del = redis::cmd("DEL");
                for key in &keys {
                    del.arg(key);
                }
                del.query_async::<()>(conn).await?;
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_derive_key_is_deterministic_across_field_order() {
        let a = json!({"range": "1d", "historical": false, "symbol": "NVDA"});
        let b = json!({"symbol": "NVDA", "historical": false, "range": "1d"});

        assert_eq!(derive_key("stock_data", &a), derive_key("stock_data", &b));
    }

    #[test]
    fn test_derive_key_namespace_prefix() {
        let key = derive_key("orchestrator", "NVIDIA stock price");
        assert!(key.starts_with("orchestrator:"));
        // sha256 hex digest after the namespace separator
        assert_eq!(key.len(), "orchestrator:".len() + 64);
    }

    #[test]
    fn test_derive_key_differs_by_namespace_and_payload() {
        let query = "NVIDIA stock price";
        assert_ne!(derive_key("orchestrator", query), derive_key("web_search", query));
        assert_ne!(
            derive_key("orchestrator", query),
            derive_key("orchestrator", "Tesla news")
        );
    }

    #[test]
    fn test_derive_key_string_and_nested_values() {
        // A raw string and its JSON-value form hash identically
        let raw = derive_key("ns", "payload");
        let wrapped = derive_key("ns", &json!("payload"));
        assert_eq!(raw, wrapped);

        let nested_a = json!({"outer": {"b": 1, "a": 2}, "list": [1, 2]});
        let nested_b = json!({"list": [1, 2], "outer": {"a": 2, "b": 1}});
        assert_eq!(derive_key("ns", &nested_a), derive_key("ns", &nested_b));
    }

    #[tokio::test]
    async fn test_round_trip() {
        let cache = CacheStore::in_memory();
        cache
            .set("stock_data:abc", &json!({"price": 180.93}), Duration::from_secs(60))
            .await;

        let value: Option<Value> = cache.get("stock_data:abc").await;
        assert_eq!(value, Some(json!({"price": 180.93})));
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent_and_evicted() {
        let cache = CacheStore::in_memory();
        cache
            .set("stock_data:abc", &json!("stale"), Duration::ZERO)
            .await;

        let value: Option<Value> = cache.get("stock_data:abc").await;
        assert!(value.is_none());

        // A second read still misses (the entry was removed, not just hidden)
        let value: Option<Value> = cache.get("stock_data:abc").await;
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_clear_with_prefix() {
        let cache = CacheStore::in_memory();
        cache.set("stock_data:a", &json!(1), Duration::from_secs(60)).await;
        cache.set("stock_data:b", &json!(2), Duration::from_secs(60)).await;
        cache.set("web_search:c", &json!(3), Duration::from_secs(60)).await;

        cache.clear(Some("stock_data")).await;

        assert!(cache.get::<Value>("stock_data:a").await.is_none());
        assert!(cache.get::<Value>("stock_data:b").await.is_none());
        assert_eq!(cache.get::<Value>("web_search:c").await, Some(json!(3)));
    }

    #[tokio::test]
    async fn test_clear_all() {
        let cache = CacheStore::in_memory();
        cache.set("stock_data:a", &json!(1), Duration::from_secs(60)).await;
        cache.set("web_search:b", &json!(2), Duration::from_secs(60)).await;

        cache.clear(None).await;

        assert!(cache.get::<Value>("stock_data:a").await.is_none());
        assert!(cache.get::<Value>("web_search:b").await.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_redis_falls_back_to_local() {
        let config = AssistantConfig::builder()
            .redis_url("redis://127.0.0.1:1")
            .redis_connect_timeout(Duration::from_millis(200))
            .build()
            .unwrap();

        let cache = CacheStore::connect(&config).await;
        assert!(!cache.is_durable());

        // Operations keep working against the local map
        cache.set("k:v", &json!("value"), Duration::from_secs(60)).await;
        assert_eq!(cache.get::<Value>("k:v").await, Some(json!("value")));
    }

    #[tokio::test]
    async fn test_invalid_redis_url_falls_back_to_local() {
        let config = AssistantConfig::builder()
            .redis_url("not a redis url")
            .redis_connect_timeout(Duration::from_millis(200))
            .build()
            .unwrap();

        let cache = CacheStore::connect(&config).await;
        assert!(!cache.is_durable());
    }

    #[tokio::test]
    async fn test_no_redis_url_uses_local() {
        let cache = CacheStore::connect(&AssistantConfig::default()).await;
        assert!(!cache.is_durable());
    }
}
