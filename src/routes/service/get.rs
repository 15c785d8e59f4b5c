use crate::db;
use crate::forms::ServiceListQuery;
use crate::helpers::JsonResponse;
use crate::models;
use crate::views;
use actix_web::{get, web, Responder, Result};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

#[tracing::instrument(name = "Search services.", skip(pg_pool))]
#[get("/")]
pub async fn search_handler(
    query: web::Query<Vec<(String, String)>>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let query = ServiceListQuery::from_pairs(&query)
        .map_err(|msg| JsonResponse::<views::service::ServicePage>::build().bad_request(msg))?;

    let (services, total) = db::service::search(pg_pool.get_ref(), &query)
        .await
        .map_err(|_err| JsonResponse::<views::service::ServicePage>::build().internal_server_error(""))?;

    let page = views::service::ServicePage::new(services, total, query.page, query.limit);
    Ok(JsonResponse::build().set_item(page).ok("OK"))
}

#[tracing::instrument(name = "Get service.", skip(pg_pool))]
#[get("/service/{id}")]
pub async fn item_handler(
    path: web::Path<(Uuid,)>,
    identity: Option<web::ReqData<Arc<models::Identity>>>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let id = path.0;
    let service = db::service::fetch(pg_pool.get_ref(), id)
        .await
        .map_err(|_err| JsonResponse::<views::service::ServiceDetail>::build().internal_server_error(""))?;

    // paused listings stay visible to their owner only
    let is_owner = |service: &models::Service| {
        identity
            .as_ref()
            .map_or(false, |identity| identity.id == service.seller_id)
    };
    let service = match service {
        Some(service) if service.is_active || is_owner(&service) => service,
        _ => {
            return Err(JsonResponse::<views::service::ServiceDetail>::build()
                .not_found("Service not found"))
        }
    };

    let seller = db::user::fetch(pg_pool.get_ref(), service.seller_id)
        .await
        .map_err(|_err| JsonResponse::<views::service::ServiceDetail>::build().internal_server_error(""))?;

    Ok(JsonResponse::build()
        .set_item(views::service::ServiceDetail::from((service, seller)))
        .ok("OK"))
}

#[tracing::instrument(name = "Get seller services.", skip(pg_pool))]
#[get("/seller/services")]
pub async fn seller_list_handler(
    identity: web::ReqData<Arc<models::Identity>>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    db::service::fetch_by_seller(pg_pool.get_ref(), identity.id)
        .await
        .map(|services| JsonResponse::build().set_list(services).ok("OK"))
        .map_err(|_err| JsonResponse::<models::Service>::build().internal_server_error(""))
}
