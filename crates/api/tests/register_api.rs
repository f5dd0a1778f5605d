//! Integration tests for `POST /register/{repository,organization}`.

mod common;

use axum::http::StatusCode;
use hookrelay_db::HookStore;
use serde_json::json;

use common::{body_json, post_json, post_raw, register_repository, TestApp};

// ---------------------------------------------------------------------------
// Success
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_repository_returns_201_with_credentials() {
    let app = TestApp::start().await;
    let destination = app.destination("1234567890123456");

    let response = post_json(
        app.app(),
        "/register/repository",
        &json!({ "repository": "acme/widgets", "destinations": [destination] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let hook = &body_json(response).await["data"];
    assert!(uuid::Uuid::parse_str(hook["id"].as_str().unwrap()).is_ok());
    assert!(!hook["secret"].as_str().unwrap().is_empty());
    assert_eq!(hook["repositoryFullname"], "acme/widgets");
    assert_eq!(hook["destinations"], json!([destination]));
    assert!(hook["createdAt"].is_string());
}

#[tokio::test]
async fn register_organization_persists_to_store() {
    let app = TestApp::start().await;
    let destination = app.destination("1234567890123456");

    let hook = common::register_organization(app.app(), "acme", &[destination]).await;
    assert_eq!(hook["organization"], "acme");

    let document = app.store.load_all().await.unwrap();
    assert_eq!(document.organization_hooks.len(), 1);
    assert_eq!(document.organization_hooks[0].id.to_string(), hook["id"]);
}

#[tokio::test]
async fn legacy_destination_field_is_accepted() {
    let app = TestApp::start().await;
    let destination = app.destination("1234567890123456");

    let response = post_json(
        app.app(),
        "/register/repository",
        &json!({ "repository": "acme/widgets", "discordWebhooks": [destination] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn duplicate_destinations_are_collapsed() {
    let app = TestApp::start().await;
    let first = app.destination("1111111111111111");
    let second = app.destination("2222222222222222");

    let hook = register_repository(
        app.app(),
        "acme/widgets",
        &[first.clone(), second.clone(), first.clone()],
    )
    .await;
    assert_eq!(hook["destinations"], json!([first, second]));
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_fields_return_every_error() {
    let app = TestApp::start().await;

    let response = post_json(
        app.app(),
        "/register/repository",
        &json!({ "repository": "not-a-repo", "destinations": [] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let errors = json["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert!(errors[0].as_str().unwrap().contains("repository"));
    assert!(errors[1].as_str().unwrap().contains("destinations"));
}

#[tokio::test]
async fn too_many_destinations_are_rejected_before_dedup() {
    let app = TestApp::start().await;
    let destination = app.destination("1234567890123456");
    let destinations = vec![destination; 6];

    let response = post_json(
        app.app(),
        "/register/organization",
        &json!({ "organization": "acme", "destinations": destinations }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn destination_outside_base_url_is_rejected() {
    let app = TestApp::start().await;

    let response = post_json(
        app.app(),
        "/register/organization",
        &json!({
            "organization": "acme",
            "destinations": [format!("https://evil.example/api/webhooks/1234567890123456/{}", common::TOKEN)],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["errors"].as_array().unwrap().len(), 1);
    assert!(app.store.load_all().await.unwrap().organization_hooks.is_empty());
}

#[tokio::test]
async fn wrongly_typed_fields_are_validation_errors() {
    let app = TestApp::start().await;

    let response = post_json(
        app.app(),
        "/register/repository",
        &json!({ "repository": 42, "destinations": [7] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let app = TestApp::start().await;

    let response = post_raw(app.app(), "/register/repository", "{not json").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");

    let response = post_raw(app.app(), "/register/repository", "[1, 2]").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Conflict
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reregistering_a_subject_points_at_the_existing_hook() {
    let app = TestApp::start().await;
    let first = register_repository(
        app.app(),
        "acme/widgets",
        &[app.destination("1111111111111111")],
    )
    .await;

    let response = post_json(
        app.app(),
        "/register/repository",
        &json!({ "repository": "ACME/Widgets", "destinations": [app.destination("2222222222222222")] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["hint"], format!("/hooks/{}", first["id"].as_str().unwrap()));
    assert_eq!(app.store.load_all().await.unwrap().repository_hooks.len(), 1);
}

#[tokio::test]
async fn same_name_under_other_kind_does_not_conflict() {
    let app = TestApp::start().await;
    let destination = app.destination("1234567890123456");

    common::register_organization(app.app(), "acme", &[destination.clone()]).await;
    let response = post_json(
        app.app(),
        "/register/repository",
        &json!({ "repository": "acme/acme", "destinations": [destination] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}
