use crate::application_port::SessionError;
use crate::domain_model::*;
use crate::domain_port::RefreshTokenStore;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

/// Deletes the previous record and writes the replacement only while the
/// previous record still references the access id the caller read. Runs
/// atomically inside Redis, so two concurrent refreshes of one session cannot
/// both win.
const SWAP_SCRIPT: &str = r#"
local cur = redis.call('GET', KEYS[1])
if not cur then return 0 end
local rec = cjson.decode(cur)
if rec['access_token_id'] ~= ARGV[1] then return 0 end
redis.call('DEL', KEYS[1])
redis.call('SET', KEYS[2], ARGV[2], 'EX', tonumber(ARGV[3]))
return 1
"#;

pub struct RedisRefreshTokenStore {
    conn: ConnectionManager,
    prefix: String,
    swap: redis::Script,
}

impl RedisRefreshTokenStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisRefreshTokenStore {
            conn,
            prefix: prefix.into(),
            swap: redis::Script::new(SWAP_SCRIPT),
        }
    }

    fn key(&self, owner: &IssuerId, id: RefreshTokenId) -> String {
        format!("{}:refresh:{}:{}", self.prefix, owner, id)
    }

    fn owner_pattern(&self, owner: &IssuerId) -> String {
        format!("{}:refresh:{}:*", self.prefix, escape_glob(&owner.0))
    }
}

/// Issuer ids are caller-supplied opaque strings; escape them before they meet
/// `SCAN MATCH`, or an id like `*` widens the pattern to every owner's keys.
fn escape_glob(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '*' | '?' | '[' | ']' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

#[async_trait::async_trait]
impl RefreshTokenStore for RedisRefreshTokenStore {
    async fn create(&self, record: &RefreshRecord, ttl_secs: u64) -> Result<(), SessionError> {
        let key = self.key(&record.owner, record.id);
        let value =
            serde_json::to_string(record).map_err(|e| SessionError::Store(e.to_string()))?;
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(&key, value, ttl_secs)
            .await
            .map_err(|e| SessionError::Store(e.to_string()))?;
        Ok(())
    }

    async fn find(
        &self,
        id: RefreshTokenId,
        owner: &IssuerId,
    ) -> Result<Option<RefreshRecord>, SessionError> {
        let key = self.key(owner, id);
        let mut conn = self.conn.clone();
        let val: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| SessionError::Store(e.to_string()))?;
        match val {
            Some(json) => {
                let record =
                    serde_json::from_str(&json).map_err(|e| SessionError::Store(e.to_string()))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn all(&self, owner: &IssuerId) -> Result<Vec<RefreshRecord>, SessionError> {
        let mut conn = self.conn.clone();
        let mut keys: Vec<String> = Vec::new();
        {
            let mut iter = conn
                .scan_match::<_, String>(self.owner_pattern(owner))
                .await
                .map_err(|e| SessionError::Store(e.to_string()))?;
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
        }

        let mut records = Vec::with_capacity(keys.len());
        let mut conn = self.conn.clone();
        for key in keys {
            let val: Option<String> = conn
                .get(&key)
                .await
                .map_err(|e| SessionError::Store(e.to_string()))?;
            // A key can expire between SCAN and GET.
            if let Some(json) = val {
                let record: RefreshRecord =
                    serde_json::from_str(&json).map_err(|e| SessionError::Store(e.to_string()))?;
                // The pattern narrows the scan; the record decides ownership.
                if record.owner == *owner {
                    records.push(record);
                }
            }
        }
        Ok(records)
    }

    async fn update(
        &self,
        prev_id: RefreshTokenId,
        expected_access_id: AccessTokenId,
        next: &RefreshRecord,
        ttl_secs: u64,
    ) -> Result<bool, SessionError> {
        let value = serde_json::to_string(next).map_err(|e| SessionError::Store(e.to_string()))?;
        let mut conn = self.conn.clone();
        let swapped: i64 = self
            .swap
            .key(self.key(&next.owner, prev_id))
            .key(self.key(&next.owner, next.id))
            .arg(expected_access_id.to_string())
            .arg(value)
            .arg(ttl_secs)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| SessionError::Store(e.to_string()))?;
        Ok(swapped == 1)
    }
}
