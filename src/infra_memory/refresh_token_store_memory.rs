use crate::application_port::SessionError;
use crate::domain_model::*;
use crate::domain_port::RefreshTokenStore;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::collections::HashMap;

struct Entry {
    record: RefreshRecord,
    evict_at: DateTime<Utc>,
}

impl Entry {
    fn live(&self) -> bool {
        self.evict_at > Utc::now()
    }
}

/// In-process refresh store partitioned by owner. The per-owner dashmap entry
/// lock makes `update` a true compare-and-swap against concurrent refreshes.
#[derive(Default)]
pub struct MemoryRefreshTokenStore {
    owners: DashMap<IssuerId, HashMap<RefreshTokenId, Entry>>,
}

impl MemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn create(&self, record: &RefreshRecord, ttl_secs: u64) -> Result<(), SessionError> {
        let evict_at = Utc::now() + Duration::seconds(ttl_secs as i64);
        self.owners.entry(record.owner.clone()).or_default().insert(
            record.id,
            Entry {
                record: record.clone(),
                evict_at,
            },
        );
        Ok(())
    }

    async fn find(
        &self,
        id: RefreshTokenId,
        owner: &IssuerId,
    ) -> Result<Option<RefreshRecord>, SessionError> {
        let found = self.owners.get(owner).and_then(|sessions| {
            sessions
                .get(&id)
                .filter(|entry| entry.live())
                .map(|entry| entry.record.clone())
        });
        Ok(found)
    }

    async fn all(&self, owner: &IssuerId) -> Result<Vec<RefreshRecord>, SessionError> {
        let records = self
            .owners
            .get(owner)
            .map(|sessions| {
                sessions
                    .values()
                    .filter(|entry| entry.live())
                    .map(|entry| entry.record.clone())
                    .collect()
            })
            .unwrap_or_default();
        Ok(records)
    }

    async fn update(
        &self,
        prev_id: RefreshTokenId,
        expected_access_id: AccessTokenId,
        next: &RefreshRecord,
        ttl_secs: u64,
    ) -> Result<bool, SessionError> {
        let mut sessions = match self.owners.get_mut(&next.owner) {
            Some(sessions) => sessions,
            None => return Ok(false),
        };
        match sessions.get(&prev_id) {
            Some(entry) if entry.live() && entry.record.access_token_id == expected_access_id => {}
            _ => return Ok(false),
        }
        sessions.remove(&prev_id);
        sessions.insert(
            next.id,
            Entry {
                record: next.clone(),
                evict_at: Utc::now() + Duration::seconds(ttl_secs as i64),
            },
        );
        Ok(true)
    }
}
