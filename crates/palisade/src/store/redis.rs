//! Redis-backed store adapter.

use async_trait::async_trait;
use palisade_common::AdminError;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use super::ExpiringStore;

/// Store adapter over a Redis connection manager (auto-reconnecting).
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

fn store_err(err: redis::RedisError) -> AdminError {
    AdminError::Store(err.to_string())
}

#[async_trait]
impl ExpiringStore for RedisStore {
    async fn set_with_expiry(
        &self,
        key: &str,
        ttl_secs: u64,
        value: &str,
    ) -> Result<(), AdminError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(store_err)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, AdminError> {
        let mut conn = self.conn.clone();
        conn.get(key).await.map_err(store_err)
    }

    async fn fetch_and_delete(&self, key: &str) -> Result<Option<String>, AdminError> {
        let mut conn = self.conn.clone();
        // GETDEL is a single command, so two concurrent verifiers can never
        // both observe the stored value.
        conn.get_del(key).await.map_err(store_err)
    }

    async fn delete(&self, key: &str) -> Result<bool, AdminError> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(key).await.map_err(store_err)?;
        Ok(removed > 0)
    }

    async fn incr_with_expiry(&self, key: &str, ttl_secs: u64) -> Result<u64, AdminError> {
        let mut conn = self.conn.clone();
        let count: u64 = conn.incr(key, 1).await.map_err(store_err)?;
        if count == 1 {
            conn.expire::<_, ()>(key, ttl_secs as i64)
                .await
                .map_err(store_err)?;
        }
        Ok(count)
    }

    async fn ping(&self) -> Result<(), AdminError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(())
    }
}
