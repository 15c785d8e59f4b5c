use crate::db::service::ServiceRow;
use crate::models;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::Instrument;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    buyer_id: Uuid,
    seller_id: Uuid,
    service_id: Uuid,
    title: String,
    package_selected: String,
    price: f64,
    requirements: Option<String>,
    initial_message: Option<String>,
    due_date: Option<DateTime<Utc>>,
    status: String,
    milestones: Json<Vec<models::Milestone>>,
    messages: Json<Vec<models::Message>>,
    files: Json<Vec<models::OrderFile>>,
    additional_services: Json<Vec<models::AddOn>>,
    cancellation_requests: Json<Vec<models::CancellationRequest>>,
    delivery_extensions: Json<Vec<models::DeliveryExtension>>,
    review: Option<Json<models::OrderReview>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for models::Order {
    type Error = String;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            buyer_id: row.buyer_id,
            seller_id: row.seller_id,
            service_id: row.service_id,
            title: row.title,
            package_selected: row.package_selected,
            price: row.price,
            requirements: row.requirements,
            initial_message: row.initial_message,
            due_date: row.due_date,
            status: row.status.parse()?,
            milestones: row.milestones.0,
            messages: row.messages.0,
            files: row.files.0,
            additional_services: row.additional_services.0,
            cancellation_requests: row.cancellation_requests.0,
            delivery_extensions: row.delivery_extensions.0,
            review: row.review.map(|review| review.0),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_orders(rows: Vec<OrderRow>) -> Result<Vec<models::Order>, String> {
    rows.into_iter()
        .map(|row| {
            models::Order::try_from(row).map_err(|err| {
                tracing::error!("Corrupted order row: {}", err);
                "Could not fetch data".to_string()
            })
        })
        .collect()
}

pub async fn fetch(pool: &PgPool, id: Uuid) -> Result<Option<models::Order>, String> {
    let query_span = tracing::info_span!("Fetch order by id.", id = %id);
    let row = sqlx::query_as::<_, OrderRow>(r#"SELECT * FROM orders WHERE id = $1 LIMIT 1"#)
        .bind(id)
        .fetch_optional(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch order, error: {:?}", err);
            "Could not fetch data".to_string()
        })?;

    match row {
        Some(row) => into_orders(vec![row]).map(|mut orders| orders.pop()),
        None => Ok(None),
    }
}

pub async fn fetch_by_buyer(pool: &PgPool, buyer_id: Uuid) -> Result<Vec<models::Order>, String> {
    let query_span = tracing::info_span!("Fetch orders by buyer.", buyer_id = %buyer_id);
    let rows = sqlx::query_as::<_, OrderRow>(
        r#"SELECT * FROM orders WHERE buyer_id = $1 ORDER BY created_at DESC"#,
    )
    .bind(buyer_id)
    .fetch_all(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to fetch buyer orders, error: {:?}", err);
        "Could not fetch data".to_string()
    })?;

    into_orders(rows)
}

pub async fn fetch_by_seller(pool: &PgPool, seller_id: Uuid) -> Result<Vec<models::Order>, String> {
    let query_span = tracing::info_span!("Fetch orders by seller.", seller_id = %seller_id);
    let rows = sqlx::query_as::<_, OrderRow>(
        r#"SELECT * FROM orders WHERE seller_id = $1 ORDER BY created_at DESC"#,
    )
    .bind(seller_id)
    .fetch_all(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to fetch seller orders, error: {:?}", err);
        "Could not fetch data".to_string()
    })?;

    into_orders(rows)
}

pub async fn insert(pool: &PgPool, order: models::Order) -> Result<models::Order, String> {
    let query_span = tracing::info_span!("Saving new order into the database");
    sqlx::query(
        r#"
        INSERT INTO orders (id, buyer_id, seller_id, service_id, title, package_selected, price,
                            requirements, initial_message, due_date, status, milestones, messages,
                            files, additional_services, cancellation_requests, delivery_extensions,
                            review, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18,
                $19, $20)
        "#,
    )
    .bind(order.id)
    .bind(order.buyer_id)
    .bind(order.seller_id)
    .bind(order.service_id)
    .bind(&order.title)
    .bind(&order.package_selected)
    .bind(order.price)
    .bind(&order.requirements)
    .bind(&order.initial_message)
    .bind(order.due_date)
    .bind(order.status.as_str())
    .bind(Json(&order.milestones))
    .bind(Json(&order.messages))
    .bind(Json(&order.files))
    .bind(Json(&order.additional_services))
    .bind(Json(&order.cancellation_requests))
    .bind(Json(&order.delivery_extensions))
    .bind(order.review.as_ref().map(Json))
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(pool)
    .instrument(query_span)
    .await
    .map(|_| order)
    .map_err(|err| {
        tracing::error!("Failed to insert order: {:?}", err);
        "Failed to insert".to_string()
    })
}

async fn write(
    tx: &mut Transaction<'_, Postgres>,
    order: &models::Order,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE orders
        SET title = $2, price = $3, requirements = $4, due_date = $5, status = $6,
            milestones = $7, messages = $8, files = $9, cancellation_requests = $10,
            delivery_extensions = $11, review = $12, updated_at = $13
        WHERE id = $1
        "#,
    )
    .bind(order.id)
    .bind(&order.title)
    .bind(order.price)
    .bind(&order.requirements)
    .bind(order.due_date)
    .bind(order.status.as_str())
    .bind(Json(&order.milestones))
    .bind(Json(&order.messages))
    .bind(Json(&order.files))
    .bind(Json(&order.cancellation_requests))
    .bind(Json(&order.delivery_extensions))
    .bind(order.review.as_ref().map(Json))
    .bind(order.updated_at)
    .execute(&mut **tx)
    .await
    .map(|_| ())
}

/// Saves the whole order document. When `completed` is set the service sales
/// counter is bumped in the same transaction.
pub async fn update(
    pool: &PgPool,
    order: models::Order,
    completed: bool,
) -> Result<models::Order, String> {
    let query_span = tracing::info_span!("Updating order", id = %order.id, completed);

    async move {
        let mut tx = pool.begin().await?;
        write(&mut tx, &order).await?;
        if completed {
            sqlx::query(
                r#"UPDATE services SET total_sales = total_sales + 1, updated_at = NOW() WHERE id = $1"#,
            )
            .bind(order.service_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok::<_, sqlx::Error>(order)
    }
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to update order: {:?}", err);
        "Failed to update".to_string()
    })
}

/// Stores the buyer's review on the order and folds it into the service aggregate.
pub async fn save_review(
    pool: &PgPool,
    order: models::Order,
    review: models::ServiceReview,
) -> Result<models::Order, String> {
    let query_span = tracing::info_span!("Saving order review", id = %order.id);

    async move {
        let mut tx = pool.begin().await?;
        write(&mut tx, &order).await?;

        let mut service: models::Service = sqlx::query_as::<_, ServiceRow>(
            r#"SELECT * FROM services WHERE id = $1 FOR UPDATE"#,
        )
        .bind(order.service_id)
        .fetch_one(&mut *tx)
        .await?
        .into();
        service.add_review(review);

        sqlx::query(
            r#"
            UPDATE services
            SET reviews = $2, average_rating = $3, total_reviews = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(service.id)
        .bind(Json(&service.reviews))
        .bind(service.average_rating)
        .bind(service.total_reviews)
        .bind(service.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok::<_, sqlx::Error>(order)
    }
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to save review: {:?}", err);
        "Failed to update".to_string()
    })
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), String> {
    let query_span = tracing::info_span!("Deleting order", id = %id);
    sqlx::query(r#"DELETE FROM orders WHERE id = $1"#)
        .bind(id)
        .execute(pool)
        .instrument(query_span)
        .await
        .map(|_| ())
        .map_err(|err| {
            tracing::error!("Failed to delete order: {:?}", err);
            "Failed to delete".to_string()
        })
}
