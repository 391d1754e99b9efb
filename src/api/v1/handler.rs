use super::error::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::TokenCodec;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::{self, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub issuer_id: String,
    #[serde(default)]
    pub payload: ClaimsMap,
}

pub async fn login(
    body: LoginRequest,
    session_service: Arc<dyn SessionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let issuer = IssuerId(body.issuer_id);
    // Carry the issuer inside the access claims so bearer filters can
    // recover it without another lookup.
    let mut payload = body.payload;
    payload.insert(CLAIM_ISSUER_ID.to_string(), issuer.0.clone().into());

    let tokens = session_service
        .login(issuer, payload)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(tokens)))
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
    #[serde(default)]
    pub payload: ClaimsMap,
}

/// Decode the presented refresh token and extract the issuer its claims name.
async fn issuer_of_refresh(
    token_codec: &Arc<dyn TokenCodec>,
    refresh_token: &str,
) -> Result<(IssuerId, ClaimsMap), warp::Rejection> {
    let claims = token_codec
        .decode(refresh_token)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    let issuer = claims
        .get(CLAIM_ISSUER_ID)
        .and_then(|v| v.as_str())
        .map(IssuerId::from)
        .ok_or_else(|| reject::custom(ApiErrorCode::Unauthorized))?;
    Ok((issuer, claims))
}

pub async fn refresh(
    body: RefreshRequest,
    session_service: Arc<dyn SessionService>,
    token_codec: Arc<dyn TokenCodec>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let (issuer, claims) = issuer_of_refresh(&token_codec, &body.refresh_token).await?;

    let mut payload = body.payload;
    payload.insert(CLAIM_ISSUER_ID.to_string(), issuer.0.clone().into());

    let tokens = session_service
        .refresh(issuer, payload, claims, None)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(tokens)))
}

#[derive(Debug, Deserialize)]
pub struct CsrfRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct CsrfResponse {
    pub csrf: String,
}

pub async fn masked_csrf(
    body: CsrfRequest,
    session_service: Arc<dyn SessionService>,
    token_codec: Arc<dyn TokenCodec>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let (issuer, claims) = issuer_of_refresh(&token_codec, &body.refresh_token).await?;

    let csrf = session_service
        .masked_csrf(issuer, claims)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(CsrfResponse { csrf })))
}

#[derive(Debug, Deserialize)]
pub struct VerifyCsrfRequest {
    pub access_token: String,
    pub csrf: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyCsrfResponse {
    pub valid: bool,
}

pub async fn verify_csrf(
    body: VerifyCsrfRequest,
    session_service: Arc<dyn SessionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let valid = session_service
        .valid_csrf(&body.access_token, &body.csrf)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(VerifyCsrfResponse {
        valid,
    })))
}

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub id: RefreshTokenId,
    pub access_expiration: chrono::DateTime<chrono::Utc>,
}

pub async fn list_sessions(
    issuer: IssuerId,
    session_service: Arc<dyn SessionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let records = session_service
        .all(issuer)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    // Token strings stay server-side; the listing only identifies sessions.
    let sessions: Vec<SessionInfo> = records
        .into_iter()
        .map(|r| SessionInfo {
            id: r.id,
            access_expiration: r.access_expiration,
        })
        .collect();

    Ok(warp::reply::json(&ApiResponse::ok(sessions)))
}
