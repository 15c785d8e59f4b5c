use crate::configuration::Settings;
use crate::helpers::token;
use crate::middleware::authentication::get_header;
use crate::models;
use actix_web::dev::ServiceRequest;
use actix_web::{web, HttpMessage};
use std::sync::Arc;

/// `Ok(false)` when no bearer token was sent. A token that is present but
/// malformed, forged or expired is an error.
#[tracing::instrument(name = "Authenticate with JWT", skip(req))]
pub async fn try_jwt(req: &mut ServiceRequest) -> Result<bool, String> {
    let authorization = match get_header::<String>(req, "authorization")? {
        Some(authorization) => authorization,
        None => return Ok(false),
    };

    let token = match token::extract_bearer_token(&authorization) {
        Ok(token) => token,
        Err(_) => return Ok(false),
    };

    let settings = req
        .app_data::<web::Data<Settings>>()
        .ok_or_else(|| {
            tracing::error!("settings are not registered as app data");
            "Authentication is not available".to_string()
        })?;

    let claims = token::verify(&settings.auth.jwt_secret, token).map_err(|err| {
        tracing::warn!("JWT validation failed: {}", err);
        "Invalid or expired token".to_string()
    })?;

    let identity = models::Identity {
        id: claims.sub,
        email: claims.email,
    };
    if req.extensions_mut().insert(Arc::new(identity)).is_some() {
        return Err("user already logged".to_string());
    }

    tracing::debug!("JWT authentication successful for user {}", claims.sub);
    Ok(true)
}
