use anyhow::Context as _;
use deadpool_redis::Pool;
use deadpool_redis::redis::{AsyncCommands, RedisError};

use crate::domain::repository::ProfileCache;
use crate::domain::types::PublicProfile;
use crate::error::ApiError;

#[derive(Clone)]
pub struct RedisProfileCache {
    pub pool: Pool,
    pub ttl_secs: u64,
}

fn profile_key(username: &str) -> String {
    format!("u-{username}")
}

fn redis_err(e: RedisError) -> ApiError {
    ApiError::Internal(e.into())
}

impl RedisProfileCache {
    async fn conn(&self) -> Result<deadpool_redis::Connection, ApiError> {
        self.pool
            .get()
            .await
            .map_err(|e| ApiError::Internal(e.into()))
    }
}

impl ProfileCache for RedisProfileCache {
    async fn get(&self, username: &str) -> Result<Option<PublicProfile>, ApiError> {
        let mut conn = self.conn().await?;
        let raw: Option<Vec<u8>> = conn.get(profile_key(username)).await.map_err(redis_err)?;
        match raw {
            Some(bytes) => {
                let profile = serde_json::from_slice(&bytes).context("decode cached profile")?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, username: &str, profile: &PublicProfile) -> Result<(), ApiError> {
        let bytes = serde_json::to_vec(profile).context("encode profile for cache")?;
        let mut conn = self.conn().await?;
        let (): () = conn
            .set_ex(profile_key(username), bytes, self.ttl_secs)
            .await
            .map_err(redis_err)?;
        Ok(())
    }

    async fn invalidate(&self, username: &str) -> Result<(), ApiError> {
        let mut conn = self.conn().await?;
        let (): () = conn.del(profile_key(username)).await.map_err(redis_err)?;
        Ok(())
    }
}

/// Profile cache selected at startup. `Disabled` when no Redis is configured:
/// reads always miss and writes are dropped.
#[derive(Clone)]
pub enum ProfileCacheBackend {
    Redis(RedisProfileCache),
    Disabled,
}

impl ProfileCache for ProfileCacheBackend {
    async fn get(&self, username: &str) -> Result<Option<PublicProfile>, ApiError> {
        match self {
            Self::Redis(cache) => cache.get(username).await,
            Self::Disabled => Ok(None),
        }
    }

    async fn put(&self, username: &str, profile: &PublicProfile) -> Result<(), ApiError> {
        match self {
            Self::Redis(cache) => cache.put(username, profile).await,
            Self::Disabled => Ok(()),
        }
    }

    async fn invalidate(&self, username: &str) -> Result<(), ApiError> {
        match self {
            Self::Redis(cache) => cache.invalidate(username).await,
            Self::Disabled => Ok(()),
        }
    }
}
