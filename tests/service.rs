mod common;

use common::service_body;
use serde_json::{json, Value};

#[tokio::test]
async fn only_sellers_can_add_services() {
    let Some(app) = common::spawn_app().await else {
        return;
    };
    let buyer = app.register_user("buyer").await;

    let response = app
        .post("/add", Some(&buyer.token), service_body("Professional Website Design", "Programming"))
        .await;
    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn add_and_get_service() {
    let Some(app) = common::spawn_app().await else {
        return;
    };
    let seller = app.register_seller("seller").await;

    let service = app
        .create_service(&seller, service_body("Professional Website Design", "Programming"))
        .await;
    assert_eq!(service["sellerId"], seller.id.as_str());
    assert_eq!(service["pricing"]["startingPrice"], 99.0);
    assert_eq!(service["isActive"], true);

    let response = app
        .get(&format!("/service/{}", service["id"].as_str().unwrap()), None)
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Professional Website Design");
    assert_eq!(body["data"]["sellerName"], "seller Tester");
    assert_eq!(body["data"]["sellerLevel"], "Level 1");

    let response = app
        .get(&format!("/service/{}", uuid::Uuid::new_v4()), None)
        .await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn invalid_service_is_rejected() {
    let Some(app) = common::spawn_app().await else {
        return;
    };
    let seller = app.register_seller("seller").await;

    let response = app
        .post("/add", Some(&seller.token), service_body("Logo", "Design"))
        .await;
    assert_eq!(response.status().as_u16(), 400);

    let mut body = service_body("Professional Website Design", "Programming");
    body["images"] = json!([
        {"url": "/uploads/a.png", "isMain": true},
        {"url": "/uploads/b.png", "isMain": true}
    ]);
    let response = app.post("/add", Some(&seller.token), body).await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn search_filters_and_paginates() {
    let Some(app) = common::spawn_app().await else {
        return;
    };
    let seller = app.register_seller("seller").await;

    for i in 0..3 {
        app.create_service(&seller, service_body(&format!("Website build number {}", i), "Programming"))
            .await;
    }
    let mut logo = service_body("Minimalist logo design", "Design");
    logo["pricing"] = json!({"packages": [{"name": "Basic", "price": 25.0, "deliveryTime": 2}]});
    app.create_service(&seller, logo).await;

    let response = app.get("/?category=Programming&limit=2&page=1", None).await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["totalServices"], 3);
    assert_eq!(body["data"]["totalPages"], 2);
    assert_eq!(body["data"]["currentPage"], 1);
    assert_eq!(body["data"]["services"].as_array().unwrap().len(), 2);

    let body: Value = app.get("/?category=all&search=LOGO", None).await.json().await.unwrap();
    assert_eq!(body["data"]["totalServices"], 1);

    let body: Value = app.get("/?maxPrice=50", None).await.json().await.unwrap();
    assert_eq!(body["data"]["totalServices"], 1);

    let body: Value = app
        .get("/?deliveryTime=1&deliveryTime=2", None)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["totalServices"], 1);

    let body: Value = app.get("/?sortBy=price-low", None).await.json().await.unwrap();
    assert_eq!(body["data"]["services"][0]["title"], "Minimalist logo design");

    let response = app.get("/?minPrice=100&maxPrice=10", None).await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn pages_past_the_end_are_empty() {
    let Some(app) = common::spawn_app().await else {
        return;
    };
    let seller = app.register_seller("seller").await;
    app.create_service(&seller, service_body("Website build for shops", "Programming"))
        .await;

    let response = app.get("/?page=9223372036854775807&limit=50", None).await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["totalServices"], 1);
    assert_eq!(body["data"]["services"], json!([]));
}

#[tokio::test]
async fn only_the_owner_updates_and_deletes() {
    let Some(app) = common::spawn_app().await else {
        return;
    };
    let owner = app.register_seller("owner").await;
    let other = app.register_seller("other").await;

    let service = app
        .create_service(&owner, service_body("Professional Website Design", "Programming"))
        .await;
    let id = service["id"].as_str().unwrap();

    let mut update = service_body("Professional Website Redesign", "Programming");
    update["isActive"] = json!(false);
    let response = app.put(&format!("/update/{}", id), Some(&other.token), update.clone()).await;
    assert_eq!(response.status().as_u16(), 404);

    let response = app.put(&format!("/update/{}", id), Some(&owner.token), update).await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Professional Website Redesign");
    assert_eq!(body["data"]["isActive"], false);

    let listings: Value = app.get("/seller/services", Some(&owner.token)).await.json().await.unwrap();
    assert_eq!(listings["data"].as_array().unwrap().len(), 1);

    let response = app.delete(&format!("/delete/{}", id), Some(&other.token)).await;
    assert_eq!(response.status().as_u16(), 404);
    let response = app.delete(&format!("/delete/{}", id), Some(&owner.token)).await;
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn service_with_orders_cannot_be_deleted() {
    let Some(app) = common::spawn_app().await else {
        return;
    };
    let seller = app.register_seller("seller").await;
    let buyer = app.register_user("buyer").await;

    let service = app
        .create_service(&seller, service_body("Professional Website Design", "Programming"))
        .await;
    app.create_order(
        &buyer,
        json!({"serviceId": service["id"], "packageSelected": "Basic"}),
    )
    .await;

    let response = app
        .delete(&format!("/delete/{}", service["id"].as_str().unwrap()), Some(&seller.token))
        .await;
    assert_eq!(response.status().as_u16(), 409);
}
