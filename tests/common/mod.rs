#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use postboard::configuration::{
    ApplicationSettings, BillingSettings, DatabaseSettings, JwtSettings, MaintenanceSettings,
    Settings,
};
use postboard::repository::MemoryRepository;
use postboard::startup::run;
use serde_json::{json, Value};

pub const WEBHOOK_KEY: &str = "test-webhook-key";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub repository: Arc<MemoryRepository>,
}

fn test_settings(platform: &str) -> Settings {
    Settings {
        database: DatabaseSettings {
            username: "postgres".to_string(),
            password: "password".to_string(),
            port: 5432,
            host: "localhost".to_string(),
            database_name: "postboard".to_string(),
            in_memory: true,
        },
        application: ApplicationSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            platform: platform.to_string(),
            log_level: "warn".to_string(),
        },
        jwt: JwtSettings {
            secret: "integration-test-secret".to_string(),
            issuer: "postboard".to_string(),
            access_token_expiry_secs: 3600,
            refresh_token_expiry_days: 60,
        },
        billing: BillingSettings {
            webhook_key: WEBHOOK_KEY.to_string(),
        },
        maintenance: MaintenanceSettings::default(),
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_on("dev")
}

pub fn spawn_app_on(platform: &str) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let repository = Arc::new(MemoryRepository::new());
    let server = run(listener, repository.clone(), test_settings(platform))
        .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        client: reqwest::Client::new(),
        repository,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn create_user(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(&self.url("/api/users"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(&self.url("/api/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Create a user and log in, returning the login body
    pub async fn signed_in_user(&self, email: &str, password: &str) -> Value {
        let response = self.create_user(email, password).await;
        assert_eq!(201, response.status().as_u16());

        let response = self.login(email, password).await;
        assert_eq!(200, response.status().as_u16());
        response.json().await.expect("Failed to parse login response")
    }

    pub async fn refresh(&self, refresh_token: &str) -> reqwest::Response {
        self.client
            .post(&self.url("/api/refresh"))
            .bearer_auth(refresh_token)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn revoke(&self, refresh_token: &str) -> reqwest::Response {
        self.client
            .post(&self.url("/api/revoke"))
            .bearer_auth(refresh_token)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn create_post(&self, token: &str, body: &str) -> reqwest::Response {
        self.client
            .post(&self.url("/api/posts"))
            .bearer_auth(token)
            .json(&json!({ "body": body }))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}
