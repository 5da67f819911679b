mod common;

use common::{spawn_app, WEBHOOK_KEY};
use postboard::repository::UserRepository;
use serde_json::{json, Value};

fn upgrade_event(user_id: &str) -> Value {
    json!({ "event": "user.upgraded", "data": { "user_id": user_id } })
}

#[tokio::test]
async fn upgrade_event_marks_user_premium() {
    let app = spawn_app();
    let user: Value = app.create_user("a@b.com", "secret1").await.json().await.unwrap();
    let user_id = user["id"].as_str().unwrap();
    assert_eq!(user["is_premium"], false);

    let response = app
        .client
        .post(&app.url("/api/billing/webhooks"))
        .header("Authorization", format!("ApiKey {}", WEBHOOK_KEY))
        .json(&upgrade_event(user_id))
        .send()
        .await
        .unwrap();
    assert_eq!(204, response.status().as_u16());

    let stored = app
        .repository
        .find_user_by_email("a@b.com")
        .await
        .unwrap()
        .expect("user should exist");
    assert!(stored.is_premium);

    let session: Value = app.login("a@b.com", "secret1").await.json().await.unwrap();
    assert_eq!(session["is_premium"], true);
}

#[tokio::test]
async fn webhook_rejects_bad_api_key() {
    let app = spawn_app();
    let user: Value = app.create_user("a@b.com", "secret1").await.json().await.unwrap();
    let event = upgrade_event(user["id"].as_str().unwrap());

    let response = app
        .client
        .post(&app.url("/api/billing/webhooks"))
        .header("Authorization", "ApiKey wrong-key")
        .json(&event)
        .send()
        .await
        .unwrap();
    assert_eq!(401, response.status().as_u16());

    let response = app
        .client
        .post(&app.url("/api/billing/webhooks"))
        .bearer_auth(WEBHOOK_KEY)
        .json(&event)
        .send()
        .await
        .unwrap();
    assert_eq!(401, response.status().as_u16());

    let response = app
        .client
        .post(&app.url("/api/billing/webhooks"))
        .json(&event)
        .send()
        .await
        .unwrap();
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn other_events_are_ignored() {
    let app = spawn_app();

    let response = app
        .client
        .post(&app.url("/api/billing/webhooks"))
        .header("Authorization", format!("ApiKey {}", WEBHOOK_KEY))
        .json(&json!({
            "event": "user.downgraded",
            "data": { "user_id": uuid::Uuid::new_v4() }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(204, response.status().as_u16());
}

#[tokio::test]
async fn upgrading_unknown_user_returns_404() {
    let app = spawn_app();

    let response = app
        .client
        .post(&app.url("/api/billing/webhooks"))
        .header("Authorization", format!("ApiKey {}", WEBHOOK_KEY))
        .json(&upgrade_event(&uuid::Uuid::new_v4().to_string()))
        .send()
        .await
        .unwrap();
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn api_key_is_checked_before_the_body() {
    let app = spawn_app();

    let response = app
        .client
        .post(&app.url("/api/billing/webhooks"))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(401, response.status().as_u16());

    let response = app
        .client
        .post(&app.url("/api/billing/webhooks"))
        .header("Authorization", "ApiKey wrong-key")
        .json(&json!({ "event": "user.upgraded" }))
        .send()
        .await
        .unwrap();
    assert_eq!(401, response.status().as_u16());

    let response = app
        .client
        .post(&app.url("/api/billing/webhooks"))
        .header("Authorization", format!("ApiKey {}", WEBHOOK_KEY))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(400, response.status().as_u16());
}
