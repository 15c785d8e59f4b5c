use crate::forms::{ServiceListQuery, SortBy};
use crate::models;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::Instrument;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
pub(crate) struct ServiceRow {
    id: Uuid,
    seller_id: Uuid,
    title: String,
    description: String,
    category: String,
    subcategory: Option<String>,
    tags: Vec<String>,
    pricing: Json<models::Pricing>,
    images: Json<Vec<models::ServiceImage>>,
    requirements: Option<String>,
    faqs: Json<Vec<models::Faq>>,
    languages: Vec<String>,
    is_active: bool,
    total_sales: i32,
    featured: bool,
    reviews: Json<Vec<models::ServiceReview>>,
    average_rating: f64,
    total_reviews: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ServiceRow> for models::Service {
    fn from(row: ServiceRow) -> Self {
        Self {
            id: row.id,
            seller_id: row.seller_id,
            title: row.title,
            description: row.description,
            category: row.category,
            subcategory: row.subcategory,
            tags: row.tags,
            pricing: row.pricing.0,
            images: row.images.0,
            requirements: row.requirements,
            faqs: row.faqs.0,
            languages: row.languages,
            is_active: row.is_active,
            total_sales: row.total_sales,
            featured: row.featured,
            reviews: row.reviews.0,
            average_rating: row.average_rating,
            total_reviews: row.total_reviews,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub async fn fetch(pool: &PgPool, id: Uuid) -> Result<Option<models::Service>, String> {
    let query_span = tracing::info_span!("Fetch service by id.", id = %id);
    sqlx::query_as::<_, ServiceRow>(r#"SELECT * FROM services WHERE id = $1 LIMIT 1"#)
        .bind(id)
        .fetch_optional(pool)
        .instrument(query_span)
        .await
        .map(|row| row.map(Into::into))
        .map_err(|err| {
            tracing::error!("Failed to fetch service, error: {:?}", err);
            "Could not fetch data".to_string()
        })
}

pub async fn fetch_by_seller(pool: &PgPool, seller_id: Uuid) -> Result<Vec<models::Service>, String> {
    let query_span = tracing::info_span!("Fetch services by seller.", seller_id = %seller_id);
    sqlx::query_as::<_, ServiceRow>(
        r#"SELECT * FROM services WHERE seller_id = $1 ORDER BY created_at DESC"#,
    )
    .bind(seller_id)
    .fetch_all(pool)
    .instrument(query_span)
    .await
    .map(|rows| rows.into_iter().map(Into::into).collect())
    .map_err(|err| {
        tracing::error!("Failed to fetch seller services, error: {:?}", err);
        "Could not fetch data".to_string()
    })
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ServiceListQuery) {
    builder.push(" WHERE s.is_active");

    if let Some(category) = &query.category {
        builder.push(" AND s.category = ").push_bind(category.clone());
    }
    if let Some(subcategory) = &query.subcategory {
        builder.push(" AND s.subcategory = ").push_bind(subcategory.clone());
    }
    if let Some(search) = &query.search {
        let pattern = format!("%{}%", escape_like(search));
        builder
            .push(" AND (s.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR s.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(min_price) = query.min_price {
        builder.push(" AND s.starting_price >= ").push_bind(min_price);
    }
    if let Some(max_price) = query.max_price {
        builder.push(" AND s.starting_price <= ").push_bind(max_price);
    }
    if !query.seller_levels.is_empty() {
        builder
            .push(" AND COALESCE(u.seller_profile->>'level', ")
            .push_bind(models::DEFAULT_SELLER_LEVEL)
            .push(") = ANY(")
            .push_bind(query.seller_levels.clone())
            .push(")");
    }
    if let Some(days) = query.max_delivery_days() {
        builder.push(" AND s.min_delivery_days <= ").push_bind(days);
    }
    if !query.languages.is_empty() {
        builder
            .push(" AND s.languages && ")
            .push_bind(query.languages.clone());
    }
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn order_by(sort_by: SortBy) -> &'static str {
    match sort_by {
        SortBy::Newest => " ORDER BY s.created_at DESC",
        SortBy::Oldest => " ORDER BY s.created_at ASC",
        SortBy::PriceLow => " ORDER BY s.starting_price ASC, s.created_at DESC",
        SortBy::PriceHigh => " ORDER BY s.starting_price DESC, s.created_at DESC",
        SortBy::Rating => " ORDER BY s.average_rating DESC, s.total_reviews DESC, s.created_at DESC",
        SortBy::Bestselling => " ORDER BY s.total_sales DESC, s.created_at DESC",
    }
}

/// One page of active services plus the total number matching the filters.
pub async fn search(pool: &PgPool, query: &ServiceListQuery) -> Result<(Vec<models::Service>, i64), String> {
    let query_span = tracing::info_span!("Search services.", page = query.page, limit = query.limit);

    let mut count = QueryBuilder::<Postgres>::new(
        "SELECT COUNT(*) FROM services s JOIN users u ON u.id = s.seller_id",
    );
    push_filters(&mut count, query);
    let total = count
        .build_query_scalar::<i64>()
        .fetch_one(pool)
        .instrument(query_span.clone())
        .await
        .map_err(|err| {
            tracing::error!("Failed to count services, error: {:?}", err);
            "Could not fetch data".to_string()
        })?;

    let mut select = QueryBuilder::<Postgres>::new(
        "SELECT s.* FROM services s JOIN users u ON u.id = s.seller_id",
    );
    push_filters(&mut select, query);
    select
        .push(order_by(query.sort_by))
        .push(" LIMIT ")
        .push_bind(query.limit)
        .push(" OFFSET ")
        .push_bind(query.offset());

    let services = select
        .build_query_as::<ServiceRow>()
        .fetch_all(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to search services, error: {:?}", err);
            "Could not fetch data".to_string()
        })?;

    Ok((services.into_iter().map(Into::into).collect(), total))
}

pub async fn insert(pool: &PgPool, service: models::Service) -> Result<models::Service, String> {
    let query_span = tracing::info_span!("Saving new service into the database");
    sqlx::query(
        r#"
        INSERT INTO services (id, seller_id, title, description, category, subcategory, tags,
                              pricing, starting_price, min_delivery_days, images, requirements,
                              faqs, languages, is_active, total_sales, featured, reviews,
                              average_rating, total_reviews, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                $18, $19, $20, $21, $22)
        "#,
    )
    .bind(service.id)
    .bind(service.seller_id)
    .bind(&service.title)
    .bind(&service.description)
    .bind(&service.category)
    .bind(&service.subcategory)
    .bind(&service.tags)
    .bind(Json(&service.pricing))
    .bind(service.pricing.starting_price)
    .bind(service.min_delivery_time())
    .bind(Json(&service.images))
    .bind(&service.requirements)
    .bind(Json(&service.faqs))
    .bind(&service.languages)
    .bind(service.is_active)
    .bind(service.total_sales)
    .bind(service.featured)
    .bind(Json(&service.reviews))
    .bind(service.average_rating)
    .bind(service.total_reviews)
    .bind(service.created_at)
    .bind(service.updated_at)
    .execute(pool)
    .instrument(query_span)
    .await
    .map(|_| service)
    .map_err(|err| {
        tracing::error!("Failed to insert service: {:?}", err);
        "Failed to insert".to_string()
    })
}

/// Saves the editable fields; sales and review aggregates are written elsewhere.
pub async fn update(pool: &PgPool, service: models::Service) -> Result<models::Service, String> {
    let query_span = tracing::info_span!("Updating service", id = %service.id);
    sqlx::query(
        r#"
        UPDATE services
        SET title = $2, description = $3, category = $4, subcategory = $5, tags = $6,
            pricing = $7, starting_price = $8, min_delivery_days = $9, images = $10,
            requirements = $11, faqs = $12, languages = $13, is_active = $14, updated_at = $15
        WHERE id = $1
        "#,
    )
    .bind(service.id)
    .bind(&service.title)
    .bind(&service.description)
    .bind(&service.category)
    .bind(&service.subcategory)
    .bind(&service.tags)
    .bind(Json(&service.pricing))
    .bind(service.pricing.starting_price)
    .bind(service.min_delivery_time())
    .bind(Json(&service.images))
    .bind(&service.requirements)
    .bind(Json(&service.faqs))
    .bind(&service.languages)
    .bind(service.is_active)
    .bind(service.updated_at)
    .execute(pool)
    .instrument(query_span)
    .await
    .map(|_| service)
    .map_err(|err| {
        tracing::error!("Failed to update service: {:?}", err);
        "Failed to update".to_string()
    })
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, String> {
    let query_span = tracing::info_span!("Deleting service", id = %id);
    sqlx::query(r#"DELETE FROM services WHERE id = $1"#)
        .bind(id)
        .execute(pool)
        .instrument(query_span)
        .await
        .map(|result| result.rows_affected() > 0)
        .map_err(|err| {
            tracing::error!("Failed to delete service: {:?}", err);
            "Failed to delete".to_string()
        })
}

pub async fn has_orders(pool: &PgPool, id: Uuid) -> Result<bool, String> {
    let query_span = tracing::info_span!("Check service orders", id = %id);
    sqlx::query_scalar::<_, bool>(r#"SELECT EXISTS(SELECT 1 FROM orders WHERE service_id = $1)"#)
        .bind(id)
        .fetch_one(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to check service orders: {:?}", err);
            "Could not fetch data".to_string()
        })
}
