use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

fn sign(secret: &str, signing_input: &str) -> Result<HmacSha256, String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|err| {
        tracing::error!("error creating hmac {err:?}");
        "Failed to sign token".to_string()
    })?;
    mac.update(signing_input.as_bytes());
    Ok(mac)
}

/// Issue an HS256 token for the given user, valid for `ttl_hours`.
pub fn issue(secret: &str, user_id: Uuid, email: &str, ttl_hours: i64) -> Result<String, String> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        iat: now,
        exp: now + ttl_hours * 3600,
    };

    let payload = serde_json::to_vec(&claims).map_err(|err| format!("Failed to encode claims: {}", err))?;
    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(HEADER),
        URL_SAFE_NO_PAD.encode(payload)
    );
    let signature = sign(secret, &signing_input)?.finalize().into_bytes();

    Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
}

/// Check signature and expiration, return the claims.
pub fn verify(secret: &str, token: &str) -> Result<Claims, String> {
    // JWT format: header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid token format".to_string());
    }

    let signature = URL_SAFE_NO_PAD
        .decode(parts[2])
        .map_err(|_| "Invalid token signature".to_string())?;
    let signing_input = format!("{}.{}", parts[0], parts[1]);
    sign(secret, &signing_input)?
        .verify_slice(&signature)
        .map_err(|_| "Invalid token signature".to_string())?;

    let decoded = URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|e| format!("Failed to decode token payload: {}", e))?;
    let claims: Claims = serde_json::from_slice(&decoded)
        .map_err(|e| format!("Failed to parse token claims: {}", e))?;

    let now = chrono::Utc::now().timestamp();
    if claims.exp < now {
        return Err("Token expired".to_string());
    }

    Ok(claims)
}

/// Extract Bearer token from Authorization header
pub fn extract_bearer_token(authorization: &str) -> Result<&str, String> {
    let parts: Vec<&str> = authorization.split_whitespace().collect();
    if parts.len() != 2 {
        return Err("Invalid Authorization header format".to_string());
    }
    if !parts[0].eq_ignore_ascii_case("Bearer") {
        return Err("Expected Bearer scheme in Authorization header".to_string());
    }
    Ok(parts[1])
}
