use crate::forms::milestone::{
    AddMilestone, ApproveMilestone, CompleteMilestone, RequestRevision, UpdateMilestone,
};
use crate::helpers::{parse_form, JsonResponse};
use crate::models::{self, MilestoneAction};
use crate::routes::order::{participant_order, save_order};
use actix_web::{delete, post, put, web, Responder, Result};
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

#[tracing::instrument(name = "Add milestone.", skip(body, pg_pool))]
#[post("/{orderId}/milestone")]
pub async fn add_milestone_handler(
    path: web::Path<(Uuid,)>,
    identity: web::ReqData<Arc<models::Identity>>,
    body: web::Bytes,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let form: AddMilestone = parse_form(&body)?;
    let (mut order, _) = participant_order(pg_pool.get_ref(), path.0, &identity).await?;
    let was = order.status;

    order.add_milestone(form.into_model(), Utc::now())?;

    let order = save_order(pg_pool.get_ref(), order, was).await?;
    Ok(JsonResponse::build().set_item(order).ok("Milestone added"))
}

#[tracing::instrument(name = "Update milestone.", skip(body, pg_pool))]
#[put("/{orderId}/milestone/{milestoneId}")]
pub async fn update_milestone_handler(
    path: web::Path<(Uuid, Uuid)>,
    identity: web::ReqData<Arc<models::Identity>>,
    body: web::Bytes,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let (order_id, milestone_id) = path.into_inner();
    let form: UpdateMilestone = parse_form(&body)?;
    let (mut order, party) = participant_order(pg_pool.get_ref(), order_id, &identity).await?;
    let was = order.status;
    let now = Utc::now();

    let title = form.title.map(|title| title.trim().to_string());
    order.edit_milestone(milestone_id, title, form.description, form.date, now)?;

    if let Some(status) = form.status {
        let current = order
            .milestones
            .iter()
            .find(|milestone| milestone.id == milestone_id)
            .map(|milestone| milestone.status)
            .ok_or(models::LifecycleError::MilestoneNotFound)?;
        let action = MilestoneAction::for_status(current, status)?;
        order.apply_milestone(milestone_id, action, party, now)?;
    }

    let order = save_order(pg_pool.get_ref(), order, was).await?;
    Ok(JsonResponse::build().set_item(order).ok("Milestone updated"))
}

#[tracing::instrument(name = "Delete milestone.", skip(pg_pool))]
#[delete("/{orderId}/milestone/{milestoneId}")]
pub async fn delete_milestone_handler(
    path: web::Path<(Uuid, Uuid)>,
    identity: web::ReqData<Arc<models::Identity>>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let (order_id, milestone_id) = path.into_inner();
    let (mut order, _) = participant_order(pg_pool.get_ref(), order_id, &identity).await?;
    let was = order.status;

    order.remove_milestone(milestone_id, Utc::now())?;

    let order = save_order(pg_pool.get_ref(), order, was).await?;
    Ok(JsonResponse::build().set_item(order).ok("Milestone deleted"))
}

async fn apply_milestone_action(
    pool: &PgPool,
    identity: &models::Identity,
    (order_id, milestone_id): (Uuid, Uuid),
    action: MilestoneAction,
) -> Result<models::Order> {
    let (mut order, party) = participant_order(pool, order_id, identity).await?;
    let was = order.status;

    let milestone = order.apply_milestone(milestone_id, action, party, Utc::now())?;
    tracing::info!(
        "milestone {} of order {} is now {} ({})",
        milestone.id,
        order_id,
        milestone.status,
        party
    );

    save_order(pool, order, was).await
}

#[tracing::instrument(name = "Complete milestone.", skip(body, pg_pool))]
#[post("/{orderId}/milestone/{milestoneId}/complete")]
pub async fn complete_milestone_handler(
    path: web::Path<(Uuid, Uuid)>,
    identity: web::ReqData<Arc<models::Identity>>,
    body: web::Bytes,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let form: CompleteMilestone = parse_optional_form(&body)?;
    let order =
        apply_milestone_action(pg_pool.get_ref(), &identity, path.into_inner(), form.into()).await?;
    Ok(JsonResponse::build().set_item(order).ok("Milestone completed"))
}

#[tracing::instrument(name = "Approve milestone.", skip(body, pg_pool))]
#[post("/{orderId}/milestone/{milestoneId}/approve")]
pub async fn approve_milestone_handler(
    path: web::Path<(Uuid, Uuid)>,
    identity: web::ReqData<Arc<models::Identity>>,
    body: web::Bytes,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let form: ApproveMilestone = parse_optional_form(&body)?;
    let order =
        apply_milestone_action(pg_pool.get_ref(), &identity, path.into_inner(), form.into()).await?;
    Ok(JsonResponse::build().set_item(order).ok("Milestone approved"))
}

#[tracing::instrument(name = "Request milestone revision.", skip(body, pg_pool))]
#[post("/{orderId}/milestone/{milestoneId}/revision")]
pub async fn revision_milestone_handler(
    path: web::Path<(Uuid, Uuid)>,
    identity: web::ReqData<Arc<models::Identity>>,
    body: web::Bytes,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let form: RequestRevision = parse_optional_form(&body)?;
    let order =
        apply_milestone_action(pg_pool.get_ref(), &identity, path.into_inner(), form.into()).await?;
    Ok(JsonResponse::build().set_item(order).ok("Revision requested"))
}

/// Transition bodies are optional; an empty body means all defaults.
fn parse_optional_form<T>(body: &web::Bytes) -> Result<T>
where
    T: Default + serde::de::DeserializeOwned + serde_valid::Validate,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    parse_form(body)
}
