use crate::forms::order::{Status, UpdateOrder};
use crate::helpers::{parse_form, JsonResponse};
use crate::models;
use crate::routes::order::{participant_order, save_order};
use actix_web::{put, web, Responder, Result};
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

#[tracing::instrument(name = "Update order.", skip(body, pg_pool))]
#[put("/updateOrder/{orderId}")]
pub async fn update_handler(
    path: web::Path<(Uuid,)>,
    identity: web::ReqData<Arc<models::Identity>>,
    body: web::Bytes,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let form: UpdateOrder = parse_form(&body)?;
    let (mut order, party) = participant_order(pg_pool.get_ref(), path.0, &identity).await?;
    let was = order.status;

    form.update(&mut order, party, Utc::now())?;

    let order = save_order(pg_pool.get_ref(), order, was).await?;
    Ok(JsonResponse::build().set_item(order).ok("Order updated successfully"))
}

#[tracing::instrument(name = "Update order status.", skip(body, pg_pool))]
#[put("/{orderId}/status")]
pub async fn status_handler(
    path: web::Path<(Uuid,)>,
    identity: web::ReqData<Arc<models::Identity>>,
    body: web::Bytes,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let form: Status = parse_form(&body)?;
    let (mut order, party) = participant_order(pg_pool.get_ref(), path.0, &identity).await?;
    let was = order.status;

    order.transition(form.status, party, Utc::now())?;
    tracing::info!("order {} moved from {} to {} by {}", order.id, was, order.status, party);

    let order = save_order(pg_pool.get_ref(), order, was).await?;
    Ok(JsonResponse::build().set_item(order).ok("Order status updated"))
}
