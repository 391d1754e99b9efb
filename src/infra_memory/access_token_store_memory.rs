use crate::application_port::SessionError;
use crate::domain_model::*;
use crate::domain_port::AccessTokenStore;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

struct Entry {
    record: AccessRecord,
    evict_at: DateTime<Utc>,
}

/// In-process access-token registry. TTL is evaluated on read, which keeps
/// eviction deterministic for tests.
#[derive(Default)]
pub struct MemoryAccessTokenStore {
    entries: DashMap<AccessTokenId, Entry>,
}

impl MemoryAccessTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AccessTokenStore for MemoryAccessTokenStore {
    async fn register(&self, record: &AccessRecord, ttl_secs: u64) -> Result<(), SessionError> {
        let evict_at = Utc::now() + Duration::seconds(ttl_secs as i64);
        self.entries.insert(
            record.id,
            Entry {
                record: record.clone(),
                evict_at,
            },
        );
        Ok(())
    }

    async fn get(&self, id: AccessTokenId) -> Result<Option<AccessRecord>, SessionError> {
        let live = match self.entries.get(&id) {
            Some(entry) if entry.evict_at > Utc::now() => Some(entry.record.clone()),
            Some(_) => None,
            None => return Ok(None),
        };
        if live.is_none() {
            self.entries.remove(&id);
        }
        Ok(live)
    }

    async fn revoke(&self, id: AccessTokenId) -> Result<(), SessionError> {
        self.entries.remove(&id);
        Ok(())
    }
}
