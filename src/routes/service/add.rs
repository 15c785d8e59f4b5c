use crate::db;
use crate::forms::ServiceForm;
use crate::helpers::{parse_form, JsonResponse};
use crate::models;
use actix_web::{post, web, Responder, Result};
use sqlx::PgPool;
use std::sync::Arc;

#[tracing::instrument(name = "Add service.", skip(body, pg_pool))]
#[post("/add")]
pub async fn add_handler(
    identity: web::ReqData<Arc<models::Identity>>,
    body: web::Bytes,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let form: ServiceForm = parse_form(&body)?;
    form.check()
        .map_err(|msg| JsonResponse::<models::Service>::build().form_error(msg))?;

    let seller = db::user::fetch(pg_pool.get_ref(), identity.id)
        .await
        .map_err(|_err| JsonResponse::<models::Service>::build().internal_server_error(""))?
        .ok_or_else(|| JsonResponse::<models::Service>::build().unauthorized("User not found"))?;
    if !seller.is_seller {
        return Err(JsonResponse::<models::Service>::build()
            .forbidden("Only sellers can create services"));
    }

    db::service::insert(pg_pool.get_ref(), form.into_model(seller.id))
        .await
        .map(|service| {
            tracing::info!("service {} created by {}", service.id, seller.id);
            JsonResponse::build().set_item(service).created("Service created successfully")
        })
        .map_err(|_err| JsonResponse::<models::Service>::build().internal_server_error(""))
}
