/// Redis wrapper with graceful degradation.
///
/// All operations return `Option<T>` or `bool`: on any Redis error or timeout the operation
/// logs a warning and reports failure. Callers carry on without persistence; the assistant
/// is fully functional without Redis.
use std::future::Future;
use std::time::Duration;

use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::warn;

const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct RedisCache {
    client: Option<redis::Client>,
    op_timeout: Duration,
}

impl RedisCache {
    /// Attempt to create a client. If the URL is `None` or invalid, returns a `RedisCache`
    /// that always degrades gracefully (no-ops).
    pub fn new(url: Option<&str>) -> Self {
        let client = url.and_then(|u| {
            redis::Client::open(u)
                .inspect_err(|e| warn!(error = %e, url = u, "failed to create redis client, store disabled"))
                .ok()
        });
        Self {
            client,
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Test the connection by sending a PING. Returns `true` if Redis is reachable.
    pub async fn is_available(&self) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        let cmd = redis::cmd("PING");
        self.bounded("PING", "-", cmd.query_async::<String>(&mut conn))
            .await
            .is_some()
    }

    /// Get a value. Returns `None` if Redis is unavailable or the key doesn't exist.
    pub async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.connection().await?;
        let value: Option<String> = self.bounded("GET", key, conn.get(key)).await?;
        value
    }

    /// Set a value with no expiry. Returns `true` if successful.
    pub async fn set(&self, key: &str, value: &str) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        self.bounded("SET", key, conn.set::<_, _, ()>(key, value))
            .await
            .is_some()
    }

    /// Set a value with a TTL in seconds. Returns `true` if successful.
    pub async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        self.bounded("SETEX", key, conn.set_ex::<_, _, ()>(key, value, ttl_secs))
            .await
            .is_some()
    }

    /// Append to a list. Returns `true` if successful.
    pub async fn rpush(&self, key: &str, value: &str) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        self.bounded("RPUSH", key, conn.rpush::<_, _, ()>(key, value))
            .await
            .is_some()
    }

    /// Set a TTL in seconds on an existing key. Returns `true` if the key exists and the TTL was set.
    pub async fn expire(&self, key: &str, ttl_secs: u64) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        let ttl = i64::try_from(ttl_secs).unwrap_or(i64::MAX);
        self.bounded("EXPIRE", key, conn.expire::<_, bool>(key, ttl))
            .await
            .unwrap_or(false)
    }

    /// Read a whole list in insertion order. Returns `None` if Redis is unavailable.
    pub async fn lrange_all(&self, key: &str) -> Option<Vec<String>> {
        let mut conn = self.connection().await?;
        self.bounded("LRANGE", key, conn.lrange(key, 0, -1)).await
    }

    async fn connection(&self) -> Option<MultiplexedConnection> {
        let client = self.client.as_ref()?;
        match tokio::time::timeout(self.op_timeout, client.get_multiplexed_async_connection()).await {
            Ok(Ok(conn)) => Some(conn),
            Ok(Err(e)) => {
                warn!(error = %e, "redis connection failed");
                None
            }
            Err(_) => {
                warn!(timeout_ms = self.op_timeout.as_millis(), "redis connection timed out");
                None
            }
        }
    }

    async fn bounded<T, F>(&self, op: &str, key: &str, fut: F) -> Option<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                warn!(error = %e, key, op, "redis command failed");
                None
            }
            Err(_) => {
                warn!(key, op, timeout_ms = self.op_timeout.as_millis(), "redis command timed out");
                None
            }
        }
    }
}
