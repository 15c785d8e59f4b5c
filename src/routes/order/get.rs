use crate::db;
use crate::helpers::JsonResponse;
use crate::models;
use actix_web::{get, web, Responder, Result};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Loads an order together with the caller's side of it. Non-participants get
/// the same 404 as for a missing order.
pub(crate) async fn participant_order(
    pool: &PgPool,
    order_id: Uuid,
    identity: &models::Identity,
) -> Result<(models::Order, models::Party)> {
    db::order::fetch(pool, order_id)
        .await
        .map_err(|_err| JsonResponse::<models::Order>::build().internal_server_error(""))?
        .and_then(|order| order.party(identity.id).map(|party| (order, party)))
        .ok_or_else(|| JsonResponse::<models::Order>::build().not_found("Order not found"))
}

/// Persists the order; `was` is the status before the change so that completion
/// can be counted towards the service's sales.
pub(crate) async fn save_order(
    pool: &PgPool,
    order: models::Order,
    was: models::OrderStatus,
) -> Result<models::Order> {
    let completed = was != models::OrderStatus::Completed
        && order.status == models::OrderStatus::Completed;

    db::order::update(pool, order, completed)
        .await
        .map_err(|_err| JsonResponse::<models::Order>::build().internal_server_error(""))
}

#[tracing::instrument(name = "Get buyer orders.", skip(pg_pool))]
#[get("/buyer")]
pub async fn buyer_list_handler(
    identity: web::ReqData<Arc<models::Identity>>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    db::order::fetch_by_buyer(pg_pool.get_ref(), identity.id)
        .await
        .map(|orders| JsonResponse::build().set_list(orders).ok("OK"))
        .map_err(|_err| JsonResponse::<models::Order>::build().internal_server_error(""))
}

#[tracing::instrument(name = "Get seller orders.", skip(pg_pool))]
#[get("/seller")]
pub async fn seller_list_handler(
    identity: web::ReqData<Arc<models::Identity>>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    seller_orders(pg_pool.get_ref(), identity.id).await
}

#[tracing::instrument(name = "Get seller orders.", skip(pg_pool))]
#[get("/seller/orders")]
pub async fn seller_orders_handler(
    identity: web::ReqData<Arc<models::Identity>>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    seller_orders(pg_pool.get_ref(), identity.id).await
}

async fn seller_orders(pool: &PgPool, seller_id: Uuid) -> Result<impl Responder> {
    db::order::fetch_by_seller(pool, seller_id)
        .await
        .map(|orders| JsonResponse::build().set_list(orders).ok("OK"))
        .map_err(|_err| JsonResponse::<models::Order>::build().internal_server_error(""))
}

#[tracing::instrument(name = "Get order.", skip(pg_pool))]
#[get("/{orderId}")]
pub async fn item_handler(
    path: web::Path<(Uuid,)>,
    identity: web::ReqData<Arc<models::Identity>>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let (order, _) = participant_order(pg_pool.get_ref(), path.0, &identity).await?;
    Ok(JsonResponse::build().set_item(order).ok("OK"))
}
