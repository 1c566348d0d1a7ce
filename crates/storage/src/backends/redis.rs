//! Redis message store backend.
//!
//! Record encoding: one key per code, value prefixed with a one-byte tag,
//! `p` for a placeholder or `m` followed by the ciphertext for an attached
//! message. Reservation is `SET NX PX`; the placeholder-to-attached
//! transition and the destructive read are Lua scripts, so each runs
//! atomically inside Redis regardless of how many server tasks race on the
//! same code. Expiry is Redis's own `PX` handling.

use crate::error::StorageResult;
use crate::traits::MessageStore;
use async_trait::async_trait;
use bytes::Bytes;
use redis::Script;
use redis::aio::ConnectionManager;
use std::time::Duration;

const PLACEHOLDER_VALUE: &[u8] = b"p";
const ATTACHED_TAG: u8 = b'm';

/// KEYS[1] = code key, ARGV[1] = tagged payload, ARGV[2] = TTL millis.
/// Succeeds only while the key holds a placeholder; the SET replaces the
/// value and restarts the TTL.
const ATTACH_SCRIPT: &str = r#"
local v = redis.call('GET', KEYS[1])
if v == false or string.sub(v, 1, 1) ~= 'p' then
  return 0
end
redis.call('SET', KEYS[1], ARGV[1], 'PX', ARGV[2])
return 1
"#;

/// KEYS[1] = code key. Returns the payload and deletes the key iff the
/// value is an attached message; placeholders are left to expire.
const TAKE_SCRIPT: &str = r#"
local v = redis.call('GET', KEYS[1])
if v == false or string.sub(v, 1, 1) ~= 'm' then
  return false
end
redis.call('DEL', KEYS[1])
return string.sub(v, 2)
"#;

/// Redis-backed message store.
pub struct RedisStore {
    conn: ConnectionManager,
    attach: Script,
    take: Script,
}

impl RedisStore {
    /// Connect to Redis at `url`.
    ///
    /// The connection manager reconnects on its own after transient
    /// failures; individual operations surface errors in the meantime.
    pub async fn connect(url: &str) -> StorageResult<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self {
            conn,
            attach: Script::new(ATTACH_SCRIPT),
            take: Script::new(TAKE_SCRIPT),
        })
    }

    fn key(code: &str) -> String {
        format!("msg:{code}")
    }
}

/// TTL in whole milliseconds, clamped to at least 1 (PX rejects 0).
fn px(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl MessageStore for RedisStore {
    async fn reserve_code(&self, code: &str, ttl: Duration) -> StorageResult<bool> {
        let mut conn = self.conn.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(Self::key(code))
            .arg(PLACEHOLDER_VALUE)
            .arg("NX")
            .arg("PX")
            .arg(px(ttl))
            .query_async(&mut conn)
            .await?;
        // NX yields OK on creation and Nil when the key already exists.
        Ok(reply.is_some())
    }

    async fn attach_cipher(
        &self,
        code: &str,
        payload: Bytes,
        ttl: Duration,
    ) -> StorageResult<bool> {
        let mut tagged = Vec::with_capacity(payload.len() + 1);
        tagged.push(ATTACHED_TAG);
        tagged.extend_from_slice(&payload);

        let mut conn = self.conn.clone();
        let attached: i64 = self
            .attach
            .key(Self::key(code))
            .arg(tagged)
            .arg(px(ttl))
            .invoke_async(&mut conn)
            .await?;
        Ok(attached == 1)
    }

    async fn get_and_delete(&self, code: &str) -> StorageResult<Option<Bytes>> {
        let mut conn = self.conn.clone();
        let payload: Option<Vec<u8>> = self
            .take
            .key(Self::key(code))
            .invoke_async(&mut conn)
            .await?;
        Ok(payload.map(Bytes::from))
    }

    async fn ping(&self) -> StorageResult<()> {
        let mut conn = self.conn.clone();
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
