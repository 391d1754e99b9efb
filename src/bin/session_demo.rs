use std::sync::Arc;
use std::time::Duration;
use tricord::application_impl::*;
use tricord::application_port::*;
use tricord::domain_model::*;
use tricord::domain_port::TokenCodec;
use tricord::infra_jwt::*;
use tricord::infra_memory::*;

// Walk one full session lifecycle against the in-memory backend:
// $ cargo run --bin session_demo
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
        issuer: "tricord.demo".to_string(),
        audience: "demo-client".to_string(),
        signing_key: b"demo-signing-key".to_vec(),
    }));
    let orchestrator = SessionOrchestrator::new(
        codec.clone(),
        Arc::new(MemoryAccessTokenStore::new()),
        Arc::new(MemoryRefreshTokenStore::new()),
        SessionConfig {
            access_ttl: Duration::from_secs(300),
            refresh_ttl: Duration::from_secs(3600),
            rotation: RotationPolicy::Rotate,
        },
    );

    let issuer = IssuerId::from("demo-user");
    let mut payload = ClaimsMap::new();
    payload.insert("role".to_string(), "admin".into());

    let tokens = orchestrator.login(issuer.clone(), payload.clone()).await?;
    println!("login:");
    println!("  csrf    = {}", tokens.csrf);
    println!("  access  = {}", tokens.access);
    println!("  refresh = {}", tokens.refresh);

    let refresh_claims = codec.decode(&tokens.refresh).await?;
    let masked = orchestrator
        .masked_csrf(issuer.clone(), refresh_claims.clone())
        .await?;
    println!("masked_csrf = {}", masked);
    println!(
        "valid_csrf(access, masked) = {}",
        orchestrator.valid_csrf(&tokens.access, &masked).await?
    );

    let rotated = orchestrator
        .refresh(issuer.clone(), payload, refresh_claims, None)
        .await?;
    println!("refresh:");
    println!("  csrf    = {}", rotated.csrf);
    println!("  access  = {}", rotated.access);
    println!("  refresh = {}", rotated.refresh);

    for record in orchestrator.all(issuer).await? {
        println!(
            "session {} (access expires {})",
            record.id, record.access_expiration
        );
    }

    Ok(())
}
