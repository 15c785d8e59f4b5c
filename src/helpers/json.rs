use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::{web, Error, HttpResponse};
use serde_derive::Serialize;

/// Response envelope shared by every endpoint: `{ message, data }` on success,
/// `{ message }` alone on failure.
#[derive(Serialize)]
pub struct JsonResponse<T> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonData<T>>,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum JsonData<T> {
    Item(T),
    List(Vec<T>),
}

pub struct JsonResponseBuilder<T> {
    data: Option<JsonData<T>>,
}

impl<T> JsonResponse<T> {
    pub fn build() -> JsonResponseBuilder<T> {
        JsonResponseBuilder { data: None }
    }
}

impl<T> JsonResponseBuilder<T> {
    pub fn set_item(mut self, item: T) -> Self {
        self.data = Some(JsonData::Item(item));
        self
    }

    pub fn set_list(mut self, list: Vec<T>) -> Self {
        self.data = Some(JsonData::List(list));
        self
    }

    fn into_response(self, message: impl Into<String>) -> JsonResponse<T> {
        let message = message.into();
        let message = if message.trim().is_empty() {
            String::from("Success")
        } else {
            message
        };

        JsonResponse {
            message,
            data: self.data,
        }
    }

    fn error(self, status: StatusCode, message: String, fallback: &str) -> Error {
        let message = if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        };
        let body = JsonResponse::<()> {
            message: message.clone(),
            data: None,
        };

        InternalError::from_response(message, HttpResponse::build(status).json(body)).into()
    }

    pub fn bad_request<M: Into<String>>(self, message: M) -> Error {
        self.error(StatusCode::BAD_REQUEST, message.into(), "Bad request")
    }

    pub fn form_error<M: Into<String>>(self, message: M) -> Error {
        self.error(StatusCode::BAD_REQUEST, message.into(), "Validation error")
    }

    pub fn unauthorized<M: Into<String>>(self, message: M) -> Error {
        self.error(StatusCode::UNAUTHORIZED, message.into(), "Unauthorized")
    }

    pub fn forbidden<M: Into<String>>(self, message: M) -> Error {
        self.error(StatusCode::FORBIDDEN, message.into(), "Forbidden")
    }

    pub fn not_found<M: Into<String>>(self, message: M) -> Error {
        self.error(StatusCode::NOT_FOUND, message.into(), "Object not found")
    }

    pub fn conflict<M: Into<String>>(self, message: M) -> Error {
        self.error(StatusCode::CONFLICT, message.into(), "Conflict")
    }

    pub fn internal_server_error<M: Into<String>>(self, message: M) -> Error {
        self.error(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "Internal Server Error",
        )
    }
}

impl<T: serde::Serialize> JsonResponseBuilder<T> {
    pub fn ok<M: Into<String>>(self, message: M) -> web::Json<JsonResponse<T>> {
        web::Json(self.into_response(message))
    }

    pub fn created<M: Into<String>>(self, message: M) -> HttpResponse {
        HttpResponse::Created().json(self.into_response(message))
    }
}
