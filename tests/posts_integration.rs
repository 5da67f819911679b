mod common;

use common::spawn_app;
use serde_json::Value;

#[tokio::test]
async fn create_post_masks_banned_words() {
    let app = spawn_app();
    let session = app.signed_in_user("a@b.com", "secret1").await;
    let token = session["token"].as_str().unwrap();

    let response = app
        .create_post(token, "This is a kerfuffle opinion I need to share with the world")
        .await;
    assert_eq!(201, response.status().as_u16());

    let post: Value = response.json().await.unwrap();
    assert_eq!(
        post["body"],
        "This is a **** opinion I need to share with the world"
    );
}

#[tokio::test]
async fn create_post_rejects_long_body() {
    let app = spawn_app();
    let session = app.signed_in_user("a@b.com", "secret1").await;
    let token = session["token"].as_str().unwrap();

    let response = app.create_post(token, &"a".repeat(141)).await;
    assert_eq!(400, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().starts_with("Post is too long"));
}

#[tokio::test]
async fn get_post_by_id() {
    let app = spawn_app();
    let session = app.signed_in_user("a@b.com", "secret1").await;
    let token = session["token"].as_str().unwrap();

    let post: Value = app.create_post(token, "hello").await.json().await.unwrap();
    let id = post["id"].as_str().unwrap();

    let response = app
        .client
        .get(&app.url(&format!("/api/posts/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());
    let fetched: Value = response.json().await.unwrap();
    assert_eq!(fetched, post);

    let response = app
        .client
        .get(&app.url(&format!("/api/posts/{}", uuid::Uuid::new_v4())))
        .send()
        .await
        .unwrap();
    assert_eq!(404, response.status().as_u16());

    let response = app
        .client
        .get(&app.url("/api/posts/not-a-uuid"))
        .send()
        .await
        .unwrap();
    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn list_posts_filters_and_sorts() {
    let app = spawn_app();
    let alice = app.signed_in_user("alice@b.com", "secret1").await;
    let bob = app.signed_in_user("bob@b.com", "secret1").await;
    let alice_token = alice["token"].as_str().unwrap();
    let bob_token = bob["token"].as_str().unwrap();

    app.create_post(alice_token, "first").await;
    app.create_post(bob_token, "second").await;
    app.create_post(alice_token, "third").await;

    let all: Vec<Value> = app
        .client
        .get(&app.url("/api/posts"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let bodies: Vec<&str> = all.iter().map(|p| p["body"].as_str().unwrap()).collect();
    assert_eq!(bodies, vec!["first", "second", "third"]);

    let alices: Vec<Value> = app
        .client
        .get(&app.url(&format!(
            "/api/posts?author_id={}&sort=desc",
            alice["id"].as_str().unwrap()
        )))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let bodies: Vec<&str> = alices.iter().map(|p| p["body"].as_str().unwrap()).collect();
    assert_eq!(bodies, vec!["third", "first"]);

    let response = app
        .client
        .get(&app.url("/api/posts?sort=sideways"))
        .send()
        .await
        .unwrap();
    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn only_the_author_can_delete_a_post() {
    let app = spawn_app();
    let alice = app.signed_in_user("alice@b.com", "secret1").await;
    let bob = app.signed_in_user("bob@b.com", "secret1").await;
    let alice_token = alice["token"].as_str().unwrap();
    let bob_token = bob["token"].as_str().unwrap();

    let post: Value = app.create_post(alice_token, "mine").await.json().await.unwrap();
    let url = app.url(&format!("/api/posts/{}", post["id"].as_str().unwrap()));

    let response = app.client.delete(&url).bearer_auth(bob_token).send().await.unwrap();
    assert_eq!(403, response.status().as_u16());

    let response = app.client.delete(&url).send().await.unwrap();
    assert_eq!(401, response.status().as_u16());

    let response = app.client.delete(&url).bearer_auth(alice_token).send().await.unwrap();
    assert_eq!(204, response.status().as_u16());

    let response = app.client.delete(&url).bearer_auth(alice_token).send().await.unwrap();
    assert_eq!(404, response.status().as_u16());
}
