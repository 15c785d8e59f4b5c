use crate::models;
use serde::Serialize;

/// Returned by `POST /login`.
#[derive(Debug, Serialize)]
pub struct Session {
    pub token: String,
    pub user: models::User,
}
