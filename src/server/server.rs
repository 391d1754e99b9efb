use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_jwt::*;
use crate::infra_memory::*;
use crate::infra_redis::*;
use crate::settings::Settings;
use std::sync::Arc;
use std::time::Duration;

pub struct Server {
    pub session_service: Arc<dyn SessionService>,
    pub token_codec: Arc<dyn TokenCodec>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let key = std::env::var("JWT_SIGNING_KEY")
            .unwrap_or_else(|_| "my-dev-secret-key".to_string())
            .into_bytes();
        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
            issuer: settings.jwt.issuer.clone(),
            audience: settings.jwt.audience.clone(),
            signing_key: key,
        }));

        let session_service: Arc<dyn SessionService> = match settings.session.backend.as_str() {
            "fake" => Arc::new(FakeSessionService::new()),
            "real" => {
                // The fake backend needs no store, so connections (redis
                // included) are only opened here.
                let (access_store, refresh_store) = Self::try_stores(settings).await?;
                let rotation = match settings.session.rotation.as_str() {
                    "rotate" => RotationPolicy::Rotate,
                    "keep" => RotationPolicy::Keep,
                    other => return Err(anyhow::anyhow!("Unknown rotation policy: {}", other)),
                };
                Arc::new(SessionOrchestrator::new(
                    token_codec.clone(),
                    access_store,
                    refresh_store,
                    SessionConfig {
                        access_ttl: Duration::from_secs(settings.session.access_ttl_secs),
                        refresh_ttl: Duration::from_secs(settings.session.refresh_ttl_secs),
                        rotation,
                    },
                ))
            }
            other => return Err(anyhow::anyhow!("Unknown session backend: {}", other)),
        };

        Ok(Server {
            session_service,
            token_codec,
        })
    }

    async fn try_stores(
        settings: &Settings,
    ) -> anyhow::Result<(Arc<dyn AccessTokenStore>, Arc<dyn RefreshTokenStore>)> {
        match settings.store.backend.as_str() {
            "memory" => Ok((
                Arc::new(MemoryAccessTokenStore::new()),
                Arc::new(MemoryRefreshTokenStore::new()),
            )),
            "redis" => {
                let client = redis::Client::open(settings.store.redis_url.as_str())?;
                let manager = client.get_connection_manager().await?;
                Ok((
                    Arc::new(RedisAccessTokenStore::new(
                        manager.clone(),
                        settings.store.prefix.clone(),
                    )),
                    Arc::new(RedisRefreshTokenStore::new(
                        manager,
                        settings.store.prefix.clone(),
                    )),
                ))
            }
            other => Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        }
    }
}
