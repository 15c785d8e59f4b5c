use crate::helpers::JsonResponse;
use actix_web::{HttpResponse, Result};

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({}))
}

/// Fallback for every unmatched route.
pub async fn not_found() -> Result<HttpResponse> {
    Err(JsonResponse::<()>::build().not_found("Route not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, web, App};

    #[actix_web::test]
    async fn ping_answers_with_empty_object() {
        let app = test::init_service(App::new().route("/ping", web::get().to(health_check))).await;
        let req = test::TestRequest::get().uri("/ping").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, serde_json::json!({}));
    }

    #[actix_web::test]
    async fn unknown_routes_get_the_envelope() {
        let app = test::init_service(App::new().default_service(web::to(not_found))).await;
        let req = test::TestRequest::get().uri("/nowhere").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body, serde_json::json!({"message": "Route not found"}));
    }
}
