//! Integration tests for health, admin and the static front-end

mod common;

use common::{spawn_app, spawn_app_on};

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app();

    let response = app
        .client
        .get(&app.url("/api/healthz"))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn front_end_visits_show_up_in_metrics() {
    let app = spawn_app();

    for _ in 0..2 {
        let response = app.client.get(&app.url("/app/")).send().await.unwrap();
        assert!(response.status().is_success());
    }

    let response = app.client.get(&app.url("/admin/metrics")).send().await.unwrap();
    assert!(response.status().is_success());
    let page = response.text().await.unwrap();
    assert!(page.contains("visited 2 times"));
}

#[tokio::test]
async fn reset_clears_hits_and_users_on_dev() {
    let app = spawn_app();
    app.create_user("a@b.com", "secret1").await;
    app.client.get(&app.url("/app/")).send().await.unwrap();

    let response = app.client.post(&app.url("/admin/reset")).send().await.unwrap();
    assert_eq!(200, response.status().as_u16());

    let page = app
        .client
        .get(&app.url("/admin/metrics"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("visited 0 times"));

    assert_eq!(401, app.login("a@b.com", "secret1").await.status().as_u16());
    assert_eq!(201, app.create_user("a@b.com", "secret1").await.status().as_u16());
}

#[tokio::test]
async fn reset_is_forbidden_outside_dev() {
    let app = spawn_app_on("prod");

    let response = app.client.post(&app.url("/admin/reset")).send().await.unwrap();
    assert_eq!(403, response.status().as_u16());
}
