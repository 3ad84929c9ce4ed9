use async_trait::async_trait;
use redis::RedisResult;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;
use agromart_core::{JobLock, RepoResult};

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    /// `SET key owner NX EX ttl`: true when the lock was free.
    pub async fn acquire_lock(&self, key: &str, owner: &str, ttl_seconds: u64) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let result: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(owner)
            .arg("NX")
            .arg("EX")
            .arg(ttl_seconds.max(1))
            .query_async(&mut conn)
            .await?;

        Ok(result.is_some())
    }

    /// Resets the TTL only while `owner` still holds the key.
    pub async fn extend_lock(&self, key: &str, owner: &str, ttl_millis: u64) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let script = redis::Script::new(r#"
            if redis.call("GET", KEYS[1]) == ARGV[1] then
                return redis.call("PEXPIRE", KEYS[1], ARGV[2])
            else
                return 0
            end
        "#);

        let extended: i64 = script
            .key(key)
            .arg(owner)
            .arg(ttl_millis.max(1))
            .invoke_async(&mut conn)
            .await?;
        Ok(extended == 1)
    }

    /// Deletes the key only while `owner` still holds it, so an expired lock
    /// re-taken by another replica is left alone.
    pub async fn release_lock(&self, key: &str, owner: &str) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let script = redis::Script::new(r#"
            if redis.call("GET", KEYS[1]) == ARGV[1] then
                return redis.call("DEL", KEYS[1])
            else
                return 0
            end
        "#);

        let deleted: i64 = script.key(key).arg(owner).invoke_async(&mut conn).await?;
        Ok(deleted == 1)
    }
}

/// [`JobLock`] backed by Redis, one owner token per process.
pub struct RedisJobLock {
    client: RedisClient,
    owner: String,
}

impl RedisJobLock {
    pub fn new(client: RedisClient) -> Self {
        Self {
            client,
            owner: Uuid::new_v4().to_string(),
        }
    }

    fn key(job: &str) -> String {
        format!("agromart:job:{}", job)
    }
}

#[async_trait]
impl JobLock for RedisJobLock {
    async fn try_acquire(&self, job: &str, ttl: Duration) -> RepoResult<bool> {
        let acquired = self
            .client
            .acquire_lock(&Self::key(job), &self.owner, ttl.as_secs())
            .await?;
        if acquired {
            debug!(job, owner = %self.owner, "Job lock acquired");
        } else {
            info!(job, "Job lock held by another instance");
        }
        Ok(acquired)
    }

    async fn extend(&self, job: &str, ttl: Duration) -> RepoResult<bool> {
        let ttl_millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        let extended = self
            .client
            .extend_lock(&Self::key(job), &self.owner, ttl_millis)
            .await?;
        if !extended {
            warn!(job, owner = %self.owner, "Job lock lost before it could be extended");
        }
        Ok(extended)
    }

    async fn release(&self, job: &str) -> RepoResult<()> {
        let released = self.client.release_lock(&Self::key(job), &self.owner).await?;
        if !released {
            debug!(job, "Job lock already expired or taken over");
        }
        Ok(())
    }
}
