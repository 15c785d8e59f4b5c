use crate::db;
use crate::helpers::JsonResponse;
use crate::models;
use crate::routes::service::owned_service;
use actix_web::{delete, web, Responder, Result};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

#[tracing::instrument(name = "Delete service.", skip(pg_pool))]
#[delete("/delete/{id}")]
pub async fn delete_handler(
    path: web::Path<(Uuid,)>,
    identity: web::ReqData<Arc<models::Identity>>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let service = owned_service(pg_pool.get_ref(), path.0, identity.id).await?;

    let has_orders = db::service::has_orders(pg_pool.get_ref(), service.id)
        .await
        .map_err(|_err| JsonResponse::<models::Service>::build().internal_server_error(""))?;
    if has_orders {
        return Err(JsonResponse::<models::Service>::build()
            .conflict("Service has orders and cannot be deleted, deactivate it instead"));
    }

    db::service::delete(pg_pool.get_ref(), service.id)
        .await
        .map_err(|_err| JsonResponse::<models::Service>::build().internal_server_error(""))
        .and_then(|deleted| match deleted {
            true => Ok(JsonResponse::<models::Service>::build().ok("Service deleted successfully")),
            false => Err(JsonResponse::<models::Service>::build().not_found("Service not found")),
        })
}
