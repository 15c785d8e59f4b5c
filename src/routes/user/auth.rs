use crate::configuration::Settings;
use crate::db;
use crate::forms;
use crate::helpers::{parse_form, password, token, JsonResponse};
use crate::models;
use crate::views;
use actix_web::{get, post, web, Responder, Result};
use sqlx::PgPool;
use std::sync::Arc;

#[tracing::instrument(name = "Register user.", skip(body, pg_pool))]
#[post("/register")]
pub async fn register_handler(
    body: web::Bytes,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let form: forms::user::Register = parse_form(&body)?;

    let taken = db::user::exists(pg_pool.get_ref(), &form.normalized_email(), form.username.trim())
        .await
        .map_err(|_err| JsonResponse::<models::User>::build().internal_server_error(""))?;
    if taken {
        return Err(JsonResponse::<models::User>::build()
            .conflict("User with this email or username already exists"));
    }

    let plain = form.password.clone();
    let password_hash = web::block(move || password::hash(&plain))
        .await
        .map_err(|err| {
            tracing::error!("password hashing was cancelled: {:?}", err);
            JsonResponse::<models::User>::build().internal_server_error("")
        })?
        .map_err(|_err| JsonResponse::<models::User>::build().internal_server_error(""))?;

    db::user::insert(pg_pool.get_ref(), form.into_user(password_hash))
        .await
        .map(|user| {
            tracing::info!("registered user {}", user.id);
            JsonResponse::build().set_item(user).created("User registered successfully")
        })
        .map_err(|err| match err {
            db::user::InsertError::Taken => {
                JsonResponse::<models::User>::build().conflict(err.to_string())
            }
            db::user::InsertError::Failed => {
                JsonResponse::<models::User>::build().internal_server_error("")
            }
        })
}

#[tracing::instrument(name = "Login.", skip(body, pg_pool, settings))]
#[post("/login")]
pub async fn login_handler(
    body: web::Bytes,
    pg_pool: web::Data<PgPool>,
    settings: web::Data<Settings>,
) -> Result<impl Responder> {
    let form: forms::user::Login = parse_form(&body)?;
    let invalid = || JsonResponse::<views::user::Session>::build().unauthorized("Invalid email or password");

    let user = db::user::fetch_by_email(pg_pool.get_ref(), form.email.trim())
        .await
        .map_err(|_err| JsonResponse::<views::user::Session>::build().internal_server_error(""))?
        .ok_or_else(invalid)?;

    let stored_hash = user.password_hash.clone();
    let matches = web::block(move || password::verify(&stored_hash, &form.password))
        .await
        .map_err(|err| {
            tracing::error!("password verification was cancelled: {:?}", err);
            JsonResponse::<views::user::Session>::build().internal_server_error("")
        })?
        .map_err(|_err| JsonResponse::<views::user::Session>::build().internal_server_error(""))?;
    if !matches {
        return Err(invalid());
    }

    let token = token::issue(
        &settings.auth.jwt_secret,
        user.id,
        &user.email,
        settings.auth.token_ttl_hours,
    )
    .map_err(|_err| JsonResponse::<views::user::Session>::build().internal_server_error(""))?;

    Ok(JsonResponse::build()
        .set_item(views::user::Session { token, user })
        .ok("Login successful"))
}

#[tracing::instrument(name = "Verify token.", skip(pg_pool))]
#[get("/verify-token")]
pub async fn verify_token_handler(
    identity: web::ReqData<Arc<models::Identity>>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    // a valid token for a deleted account is treated as no token at all
    db::user::fetch(pg_pool.get_ref(), identity.id)
        .await
        .map_err(|_err| JsonResponse::<models::User>::build().internal_server_error(""))?
        .map(|user| JsonResponse::build().set_item(user).ok("Token is valid"))
        .ok_or_else(|| JsonResponse::<models::User>::build().unauthorized("User not found"))
}
