use crate::db;
use crate::forms;
use crate::helpers::{parse_form, JsonResponse};
use crate::models;
use actix_web::{get, put, web, Responder, Result};
use sqlx::PgPool;
use std::sync::Arc;

async fn current_user(pool: &PgPool, identity: &models::Identity) -> Result<models::User> {
    db::user::fetch(pool, identity.id)
        .await
        .map_err(|_err| JsonResponse::<models::User>::build().internal_server_error(""))?
        .ok_or_else(|| JsonResponse::<models::User>::build().not_found("User not found"))
}

#[tracing::instrument(name = "Get profile.", skip(pg_pool))]
#[get("/profile")]
pub async fn get_profile_handler(
    identity: web::ReqData<Arc<models::Identity>>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let user = current_user(pg_pool.get_ref(), &identity).await?;
    Ok(JsonResponse::build().set_item(user).ok("OK"))
}

#[tracing::instrument(name = "Update seller profile.", skip(body, pg_pool))]
#[put("/profile")]
pub async fn update_profile_handler(
    identity: web::ReqData<Arc<models::Identity>>,
    body: web::Bytes,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let form: forms::user::SellerProfile = parse_form(&body)?;
    let mut user = current_user(pg_pool.get_ref(), &identity).await?;
    form.update(&mut user);

    db::user::update_profile(pg_pool.get_ref(), user)
        .await
        .map(|user| JsonResponse::build().set_item(user).ok("Profile updated successfully"))
        .map_err(|_err| JsonResponse::<models::User>::build().internal_server_error(""))
}
