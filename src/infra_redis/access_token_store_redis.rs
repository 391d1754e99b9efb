use crate::application_port::SessionError;
use crate::domain_model::*;
use crate::domain_port::AccessTokenStore;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

pub struct RedisAccessTokenStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisAccessTokenStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisAccessTokenStore {
            conn,
            prefix: prefix.into(),
        }
    }

    fn key(&self, id: AccessTokenId) -> String {
        format!("{}:access:{}", self.prefix, id)
    }
}

#[async_trait::async_trait]
impl AccessTokenStore for RedisAccessTokenStore {
    async fn register(&self, record: &AccessRecord, ttl_secs: u64) -> Result<(), SessionError> {
        let key = self.key(record.id);
        let value =
            serde_json::to_string(record).map_err(|e| SessionError::Store(e.to_string()))?;
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(&key, value, ttl_secs)
            .await
            .map_err(|e| SessionError::Store(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, id: AccessTokenId) -> Result<Option<AccessRecord>, SessionError> {
        let key = self.key(id);
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

    async fn revoke(&self, id: AccessTokenId) -> Result<(), SessionError> {
        let key = self.key(id);
        let mut conn = self.conn.clone();
        let _: () = conn
            .del(&key)
            .await
            .map_err(|e| SessionError::Store(e.to_string()))?;
        Ok(())
    }
}
