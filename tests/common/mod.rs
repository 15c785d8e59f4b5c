#![allow(dead_code)]

use gigmarket::configuration::{get_configuration, DatabaseSettings, Settings};
use serde_json::{json, Value};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use tempfile::TempDir;
use uuid::Uuid;

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
    pub client: reqwest::Client,
    pub upload_dir: TempDir,
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

pub async fn spawn_app_with_configuration(mut configuration: Settings) -> Option<TestApp> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);
    configuration.database.database_name = Uuid::new_v4().to_string();

    let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");
    configuration.uploads.dir = upload_dir.path().to_path_buf();

    let connection_pool = match configure_database(&configuration.database).await {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("Skipping tests: failed to connect to postgres: {}", err);
            return None;
        }
    };

    let server = gigmarket::startup::run(listener, connection_pool.clone(), configuration)
        .await
        .expect("Failed to bind address.");

    let _ = tokio::spawn(server);
    println!("Used Port: {}", port);

    Some(TestApp {
        address,
        db_pool: connection_pool,
        client: reqwest::Client::new(),
        upload_dir,
    })
}

pub async fn spawn_app() -> Option<TestApp> {
    let mut configuration = get_configuration().expect("Failed to get configuration");
    configuration.auth.jwt_secret = "integration-test-secret".to_string();

    spawn_app_with_configuration(configuration).await
}

pub async fn configure_database(config: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    let mut connection = PgConnection::connect(&config.connection_string_without_db()).await?;

    connection
        .execute(format!(r#"CREATE DATABASE "{}""#, config.database_name).as_str())
        .await?;

    let connection_pool = PgPool::connect(&config.connection_string()).await?;

    sqlx::migrate!("./migrations").run(&connection_pool).await?;

    Ok(connection_pool)
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> reqwest::Response {
        let mut request = self.client.post(self.url(path)).json(&body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request.")
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: Value) -> reqwest::Response {
        let mut request = self.client.put(self.url(path)).json(&body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request.")
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request.")
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        let mut request = self.client.delete(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request.")
    }

    /// Registers and logs in a fresh account.
    pub async fn register_user(&self, name: &str) -> TestUser {
        let suffix = &Uuid::new_v4().simple().to_string()[..8];
        let email = format!("{}-{}@test.com", name, suffix);
        let response = self
            .post(
                "/register",
                None,
                json!({
                    "firstName": name,
                    "lastName": "Tester",
                    "username": format!("{}_{}", name, suffix),
                    "email": email,
                    "password": "s3cret-pass"
                }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);

        let response = self
            .post("/login", None, json!({"email": email, "password": "s3cret-pass"}))
            .await;
        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();

        TestUser {
            id: body["data"]["user"]["id"].as_str().unwrap().to_string(),
            email,
            token: body["data"]["token"].as_str().unwrap().to_string(),
        }
    }

    pub async fn register_seller(&self, name: &str) -> TestUser {
        let user = self.register_user(name).await;
        let response = self
            .put(
                "/profile",
                Some(&user.token),
                json!({
                    "description": "Designer with ten years of experience",
                    "languages": ["English"],
                    "skills": ["Logo design"]
                }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 200);
        user
    }

    pub async fn create_service(&self, seller: &TestUser, body: Value) -> Value {
        let response = self.post("/add", Some(&seller.token), body).await;
        assert_eq!(response.status().as_u16(), 201);
        let body: Value = response.json().await.unwrap();
        body["data"].clone()
    }

    pub async fn create_order(&self, buyer: &TestUser, body: Value) -> Value {
        let response = self.post("/order/create", Some(&buyer.token), body).await;
        assert_eq!(response.status().as_u16(), 201);
        let body: Value = response.json().await.unwrap();
        body["data"].clone()
    }
}

pub fn service_body(title: &str, category: &str) -> Value {
    json!({
        "title": title,
        "description": "A complete, responsive website for your business",
        "category": category,
        "subcategory": "Web Design",
        "tags": ["website", "design"],
        "pricing": {
            "packages": [
                {"name": "Basic", "price": 99.0, "deliveryTime": 7},
                {"name": "Standard", "price": 199.0, "deliveryTime": 5},
                {"name": "Premium", "price": 399.0, "deliveryTime": 3}
            ]
        },
        "images": [{"url": "/uploads/cover.png", "isMain": true}],
        "languages": ["English"]
    })
}
