use crate::db;
use crate::forms::ServiceForm;
use crate::helpers::{parse_form, JsonResponse};
use crate::models;
use actix_web::{put, web, Responder, Result};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Loads a service the caller owns; anybody else gets the same 404 as for a missing one.
pub(crate) async fn owned_service(
    pool: &PgPool,
    id: Uuid,
    owner: Uuid,
) -> Result<models::Service> {
    db::service::fetch(pool, id)
        .await
        .map_err(|_err| JsonResponse::<models::Service>::build().internal_server_error(""))?
        .filter(|service| service.seller_id == owner)
        .ok_or_else(|| JsonResponse::<models::Service>::build().not_found("Service not found"))
}

#[tracing::instrument(name = "Update service.", skip(body, pg_pool))]
#[put("/update/{id}")]
pub async fn update_handler(
    path: web::Path<(Uuid,)>,
    identity: web::ReqData<Arc<models::Identity>>,
    body: web::Bytes,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let form: ServiceForm = parse_form(&body)?;
    form.check()
        .map_err(|msg| JsonResponse::<models::Service>::build().form_error(msg))?;

    let mut service = owned_service(pg_pool.get_ref(), path.0, identity.id).await?;
    form.update(&mut service);

    db::service::update(pg_pool.get_ref(), service)
        .await
        .map(|service| JsonResponse::build().set_item(service).ok("Service updated successfully"))
        .map_err(|_err| JsonResponse::<models::Service>::build().internal_server_error(""))
}
