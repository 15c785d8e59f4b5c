use crate::db;
use crate::forms::order::{Cancel, ExtendDelivery, File, Message, Review};
use crate::helpers::{parse_form, JsonResponse, UploadPolicy};
use crate::models;
use crate::routes::order::{participant_order, save_order};
use actix_web::{post, put, web, Responder, Result};
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

#[tracing::instrument(name = "Add order message.", skip(body, pg_pool))]
#[post("/{orderId}/message")]
pub async fn message_handler(
    path: web::Path<(Uuid,)>,
    identity: web::ReqData<Arc<models::Identity>>,
    body: web::Bytes,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let form: Message = parse_form(&body)?;
    let (mut order, party) = participant_order(pg_pool.get_ref(), path.0, &identity).await?;
    let was = order.status;

    order.add_message(
        party,
        identity.id,
        form.text,
        form.attachment.map(Into::into),
        Utc::now(),
    )?;

    let order = save_order(pg_pool.get_ref(), order, was).await?;
    Ok(JsonResponse::build().set_item(order).ok("Message sent"))
}

#[tracing::instrument(name = "Request delivery extension.", skip(body, pg_pool))]
#[put("/{orderId}/extend-delivery")]
pub async fn extend_delivery_handler(
    path: web::Path<(Uuid,)>,
    identity: web::ReqData<Arc<models::Identity>>,
    body: web::Bytes,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let form: ExtendDelivery = parse_form(&body)?;
    let (mut order, party) = participant_order(pg_pool.get_ref(), path.0, &identity).await?;
    let was = order.status;

    order.request_extension(party, form.days, form.reason, Utc::now())?;

    let order = save_order(pg_pool.get_ref(), order, was).await?;
    Ok(JsonResponse::build().set_item(order).ok("Delivery extension requested"))
}

#[tracing::instrument(name = "Register order file.", skip(body, pg_pool, policy))]
#[post("/{orderId}/file")]
pub async fn file_handler(
    path: web::Path<(Uuid,)>,
    identity: web::ReqData<Arc<models::Identity>>,
    body: web::Bytes,
    pg_pool: web::Data<PgPool>,
    policy: web::Data<UploadPolicy>,
) -> Result<impl Responder> {
    let form: File = parse_form(&body)?;
    let (mut order, party) = participant_order(pg_pool.get_ref(), path.0, &identity).await?;
    let was = order.status;

    let stored = policy.stat(&form.url).await?;
    let now = Utc::now();
    let name = form
        .name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| stored.original_name.clone());
    order.add_file(
        models::OrderFile {
            id: Uuid::new_v4(),
            original_name: name.clone(),
            name,
            url: stored.url,
            size: stored.size as i64,
            mime_type: stored.mimetype,
            description: form.description,
            uploaded_by: party,
            uploaded_at: now,
        },
        now,
    );

    let order = save_order(pg_pool.get_ref(), order, was).await?;
    Ok(JsonResponse::build().set_item(order).ok("File added to order"))
}

#[tracing::instrument(name = "Submit order review.", skip(body, pg_pool))]
#[post("/{orderId}/review")]
pub async fn review_handler(
    path: web::Path<(Uuid,)>,
    identity: web::ReqData<Arc<models::Identity>>,
    body: web::Bytes,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let form: Review = parse_form(&body)?;
    let (mut order, party) = participant_order(pg_pool.get_ref(), path.0, &identity).await?;
    let order_id = order.id;

    let review = order.submit_review(party, form.rating, form.comment, Utc::now())?;
    let review = models::ServiceReview {
        rating: review.rating,
        comment: review.comment.clone(),
        reviewer_id: identity.id,
        order_id,
        created_at: review.created_at,
    };

    db::order::save_review(pg_pool.get_ref(), order, review)
        .await
        .map(|order| JsonResponse::build().set_item(order).ok("Review submitted"))
        .map_err(|_err| JsonResponse::<models::Order>::build().internal_server_error(""))
}

#[tracing::instrument(name = "Request order cancellation.", skip(body, pg_pool))]
#[post("/{orderId}/cancel")]
pub async fn cancel_handler(
    path: web::Path<(Uuid,)>,
    identity: web::ReqData<Arc<models::Identity>>,
    body: web::Bytes,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let form: Cancel = parse_form(&body)?;
    let (mut order, party) = participant_order(pg_pool.get_ref(), path.0, &identity).await?;
    let was = order.status;

    order.request_cancellation(party, form.reason, Utc::now())?;

    let order = save_order(pg_pool.get_ref(), order, was).await?;
    Ok(JsonResponse::build().set_item(order).ok("Cancellation requested"))
}
