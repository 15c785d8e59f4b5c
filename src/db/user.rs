use crate::models;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    username: String,
    email: String,
    password_hash: String,
    is_seller: bool,
    seller_profile: Option<Json<models::SellerProfile>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for models::User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            is_seller: row.is_seller,
            seller_profile: row.seller_profile.map(|profile| profile.0),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub async fn fetch(pool: &PgPool, id: Uuid) -> Result<Option<models::User>, String> {
    let query_span = tracing::info_span!("Fetch user by id.", id = %id);
    sqlx::query_as::<_, UserRow>(r#"SELECT * FROM users WHERE id = $1 LIMIT 1"#)
        .bind(id)
        .fetch_optional(pool)
        .instrument(query_span)
        .await
        .map(|row| row.map(Into::into))
        .map_err(|err| {
            tracing::error!("Failed to fetch user, error: {:?}", err);
            "Could not fetch data".to_string()
        })
}

pub async fn fetch_by_email(pool: &PgPool, email: &str) -> Result<Option<models::User>, String> {
    let query_span = tracing::info_span!("Fetch user by email.");
    sqlx::query_as::<_, UserRow>(r#"SELECT * FROM users WHERE LOWER(email) = LOWER($1) LIMIT 1"#)
        .bind(email)
        .fetch_optional(pool)
        .instrument(query_span)
        .await
        .map(|row| row.map(Into::into))
        .map_err(|err| {
            tracing::error!("Failed to fetch user by email, error: {:?}", err);
            "Could not fetch data".to_string()
        })
}

pub async fn exists(pool: &PgPool, email: &str, username: &str) -> Result<bool, String> {
    let query_span = tracing::info_span!("Check user uniqueness.");
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) OR LOWER(username) = LOWER($2)
        )
        "#,
    )
    .bind(email)
    .bind(username)
    .fetch_one(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to check user uniqueness, error: {:?}", err);
        "Could not fetch data".to_string()
    })
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum InsertError {
    #[error("User with this email or username already exists")]
    Taken,
    #[error("Failed to insert")]
    Failed,
}

impl From<sqlx::Error> for InsertError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => InsertError::Taken,
            _ => {
                tracing::error!("Failed to insert user: {:?}", err);
                InsertError::Failed
            }
        }
    }
}

pub async fn insert(pool: &PgPool, user: models::User) -> Result<models::User, InsertError> {
    let query_span = tracing::info_span!("Saving new user into the database");
    sqlx::query(
        r#"
        INSERT INTO users (id, first_name, last_name, username, email, password_hash,
                           is_seller, seller_profile, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(user.id)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.is_seller)
    .bind(user.seller_profile.as_ref().map(Json))
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .instrument(query_span)
    .await
    .map(|_| user)
    .map_err(InsertError::from)
}

pub async fn update_profile(pool: &PgPool, user: models::User) -> Result<models::User, String> {
    let query_span = tracing::info_span!("Updating seller profile", id = %user.id);
    sqlx::query(
        r#"
        UPDATE users
        SET is_seller = $2, seller_profile = $3, updated_at = $4
        WHERE id = $1
        "#,
    )
    .bind(user.id)
    .bind(user.is_seller)
    .bind(user.seller_profile.as_ref().map(Json))
    .bind(user.updated_at)
    .execute(pool)
    .instrument(query_span)
    .await
    .map(|_| user)
    .map_err(|err| {
        tracing::error!("Failed to update seller profile: {:?}", err);
        "Failed to update".to_string()
    })
}
