mod common;

use gigmarket::{db, models};
use serde_json::{json, Value};

#[tokio::test]
async fn register_login_and_verify() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    let user = app.register_user("jane").await;

    let response = app.get("/verify-token", Some(&user.token)).await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["id"], user.id.as_str());
    assert_eq!(body["data"]["email"], user.email.as_str());
    assert_eq!(body["data"]["isSeller"], false);
    assert!(body["data"].get("passwordHash").is_none());
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    let form = json!({
        "firstName": "Sam",
        "lastName": "Lee",
        "username": "samlee",
        "email": "sam@test.com",
        "password": "s3cret-pass"
    });
    assert_eq!(app.post("/register", None, form.clone()).await.status().as_u16(), 201);

    let mut again = form.clone();
    again["email"] = json!("SAM@test.com");
    again["username"] = json!("another");
    assert_eq!(app.post("/register", None, again).await.status().as_u16(), 409);
}

#[tokio::test]
async fn duplicate_insert_is_reported_as_taken() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    let user = |username: &str, email: &str| {
        models::User::new(
            "Kim".to_string(),
            "Park".to_string(),
            username.to_string(),
            email.to_string(),
            "hash".to_string(),
        )
    };

    db::user::insert(&app.db_pool, user("kimpark", "kim@test.com"))
        .await
        .unwrap();
    let err = db::user::insert(&app.db_pool, user("kimpark2", "KIM@test.com"))
        .await
        .unwrap_err();
    assert_eq!(err, db::user::InsertError::Taken);
    let err = db::user::insert(&app.db_pool, user("KimPark", "other@test.com"))
        .await
        .unwrap_err();
    assert_eq!(err, db::user::InsertError::Taken);
}

#[tokio::test]
async fn concurrent_duplicate_registrations_conflict() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    let form = json!({
        "firstName": "Ana",
        "lastName": "Ruiz",
        "username": "anaruiz",
        "email": "ana@test.com",
        "password": "s3cret-pass"
    });
    let (first, second) = tokio::join!(
        app.post("/register", None, form.clone()),
        app.post("/register", None, form.clone())
    );

    let mut statuses = vec![first.status().as_u16(), second.status().as_u16()];
    statuses.sort();
    assert_eq!(statuses, vec![201, 409]);
}

#[tokio::test]
async fn short_password_is_rejected() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    let response = app
        .post(
            "/register",
            None,
            json!({
                "firstName": "Sam",
                "lastName": "Lee",
                "username": "samlee",
                "email": "sam@test.com",
                "password": "short"
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let Some(app) = common::spawn_app().await else {
        return;
    };
    let user = app.register_user("mark").await;

    let response = app
        .post("/login", None, json!({"email": user.email, "password": "not-the-password"}))
        .await;
    assert_eq!(response.status().as_u16(), 401);

    let response = app
        .post("/login", None, json!({"email": "nobody@test.com", "password": "whatever1"}))
        .await;
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn forged_token_is_unauthorized() {
    let Some(app) = common::spawn_app().await else {
        return;
    };
    let user = app.register_user("eve").await;

    let mut forged = user.token.clone();
    forged.push('x');
    let response = app.get("/verify-token", Some(&forged)).await;
    assert_eq!(response.status().as_u16(), 401);

    let response = app.get("/verify-token", Some("not-a-jwt")).await;
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn profile_update_makes_a_seller() {
    let Some(app) = common::spawn_app().await else {
        return;
    };
    let user = app.register_seller("ada").await;

    let response = app.get("/profile", Some(&user.token)).await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["isSeller"], true);
    assert_eq!(body["data"]["sellerProfile"]["languages"], json!(["English"]));
    assert_eq!(body["data"]["sellerProfile"]["level"], "Level 1");
}
