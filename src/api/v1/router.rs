use super::error::*;
use super::handler;
use crate::domain_model::{CLAIM_ISSUER_ID, IssuerId};
use crate::domain_port::TokenCodec;
use crate::server::Server;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, http, reject};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let login = warp::post()
        .and(warp::path("session"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.session_service.clone()))
        .and_then(handler::login);

    let refresh = warp::post()
        .and(warp::path("session"))
        .and(warp::path("refresh"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.session_service.clone()))
        .and(with(server.token_codec.clone()))
        .and_then(handler::refresh);

    let masked_csrf = warp::post()
        .and(warp::path("session"))
        .and(warp::path("csrf"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.session_service.clone()))
        .and(with(server.token_codec.clone()))
        .and_then(handler::masked_csrf);

    let verify_csrf = warp::post()
        .and(warp::path("session"))
        .and(warp::path("csrf"))
        .and(warp::path("verify"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.session_service.clone()))
        .and_then(handler::verify_csrf);

    let sessions = warp::get()
        .and(warp::path("sessions"))
        .and(warp::path::end())
        .and(with_verification(server.token_codec.clone()))
        .and(with(server.session_service.clone()))
        .and_then(handler::list_sessions);

    login
        .or(refresh)
        .or(verify_csrf)
        .or(masked_csrf)
        .or(sessions)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_verification(
    token_codec: Arc<dyn TokenCodec>,
) -> impl Filter<Extract = (IssuerId,), Error = warp::Rejection> + Clone {
    warp::header::<String>(http::header::AUTHORIZATION.as_ref()).and_then(move |token: String| {
        let token_codec = token_codec.clone();
        async move {
            if let Some(token) = token.strip_prefix("Bearer ") {
                let claims = token_codec
                    .decode(token)
                    .await
                    .map_err(ApiErrorCode::from)
                    .map_err(reject::custom)?;
                claims
                    .get(CLAIM_ISSUER_ID)
                    .and_then(|v| v.as_str())
                    .map(IssuerId::from)
                    .ok_or_else(|| reject::custom(ApiErrorCode::Unauthorized))
            } else {
                Err(reject::custom(ApiErrorCode::Unauthorized))
            }
        }
    })
}
