use crate::db;
use crate::forms::order::CreateOrder;
use crate::helpers::{parse_form, JsonResponse};
use crate::models;
use actix_web::{post, web, Responder, Result};
use sqlx::PgPool;
use std::sync::Arc;

#[tracing::instrument(name = "Create order.", skip(body, pg_pool))]
#[post("/create")]
pub async fn create_handler(
    identity: web::ReqData<Arc<models::Identity>>,
    body: web::Bytes,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let form: CreateOrder = parse_form(&body)?;

    let service = db::service::fetch(pg_pool.get_ref(), form.service_id)
        .await
        .map_err(|_err| JsonResponse::<models::Order>::build().internal_server_error(""))?
        .filter(|service| service.is_active)
        .ok_or_else(|| JsonResponse::<models::Order>::build().not_found("Service not found"))?;
    if service.seller_id == identity.id {
        return Err(JsonResponse::<models::Order>::build()
            .bad_request("You cannot order your own service"));
    }

    let order = form
        .into_model(identity.id, &service)
        .map_err(|msg| JsonResponse::<models::Order>::build().bad_request(msg))?;

    db::order::insert(pg_pool.get_ref(), order)
        .await
        .map(|order| {
            tracing::info!("order {} placed for service {}", order.id, order.service_id);
            JsonResponse::build().set_item(order).created("Order created successfully")
        })
        .map_err(|_err| JsonResponse::<models::Order>::build().internal_server_error(""))
}
