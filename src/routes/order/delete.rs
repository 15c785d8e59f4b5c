use crate::db;
use crate::helpers::JsonResponse;
use crate::models::{self, OrderStatus, Party};
use crate::routes::order::participant_order;
use actix_web::{delete, web, Responder, Result};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

#[tracing::instrument(name = "Delete order.", skip(pg_pool))]
#[delete("/deleteOrder/{orderId}")]
pub async fn delete_handler(
    path: web::Path<(Uuid,)>,
    identity: web::ReqData<Arc<models::Identity>>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let (order, party) = participant_order(pg_pool.get_ref(), path.0, &identity).await?;
    if party != Party::Buyer {
        return Err(JsonResponse::<models::Order>::build().forbidden("Only the buyer can delete an order"));
    }
    if order.status != OrderStatus::Pending {
        return Err(JsonResponse::<models::Order>::build()
            .conflict(format!("Order is {} and can no longer be deleted", order.status)));
    }

    db::order::delete(pg_pool.get_ref(), order.id)
        .await
        .map(|_| JsonResponse::<models::Order>::build().ok("Order deleted successfully"))
        .map_err(|_err| JsonResponse::<models::Order>::build().internal_server_error(""))
}
