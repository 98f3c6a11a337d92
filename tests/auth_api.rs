#[macro_use]
mod common;

use actix_web::test;
use authgate::auth::{PasswordEncoder, TokenCodec};
use authgate::db::UserRepository;
use serde_json::json;

fn token_of(body: &serde_json::Value) -> String {
    body["jwtToken"].as_str().expect("jwtToken in body").to_string()
}

#[actix_web::test]
async fn test_register_and_login() {
    let (state, store) = common::state();
    let app = test_app!(state);

    let register_response = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({ "email": "new@x.com", "password": "pw" }))
        .send_request(&app)
        .await;
    assert_eq!(register_response.status(), 200);
    let register_body: serde_json::Value = test::read_body_json(register_response).await;
    assert!(!token_of(&register_body).is_empty());

    let created = store.find_by_email("new@x.com").await.unwrap().expect("user stored");
    assert_ne!(created.password_hash, "pw");

    let login_response = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": "new@x.com", "password": "pw" }))
        .send_request(&app)
        .await;
    assert_eq!(login_response.status(), 200);
    let login_body: serde_json::Value = test::read_body_json(login_response).await;

    let codec = TokenCodec::new(common::TEST_SECRET, 60);
    let token = token_of(&login_body);
    assert_eq!(codec.decode_email(&token).unwrap(), "new@x.com");
    assert_eq!(codec.decode_user_id(&token).unwrap(), created.id);
}

#[actix_web::test]
async fn test_login_with_stored_hash() {
    let (state, store) = common::state();
    let hash = common::encoder().hash("secret").unwrap();
    store.create("a@x.com", &hash).await.unwrap();
    let app = test_app!(state);

    let response = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": "a@x.com", "password": "secret" }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert!(!token_of(&body).is_empty());
}

#[actix_web::test]
async fn test_login_wrong_password() {
    let (state, store) = common::state();
    let hash = common::encoder().hash("secret").unwrap();
    store.create("a@x.com", &hash).await.unwrap();
    let app = test_app!(state);

    let response = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": "a@x.com", "password": "not-the-secret" }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 401);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body, json!({ "error": "Invalid password" }));
}

#[actix_web::test]
async fn test_login_unknown_email() {
    let (state, _) = common::state();
    let app = test_app!(state);

    let response = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": "nonexistent@example.com", "password": "wrongpassword" }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 401);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body, json!({ "error": "User not found" }));
}

#[actix_web::test]
async fn test_invalid_input_is_rejected_before_storage() {
    let (state, store) = common::state();
    let app = test_app!(state);

    let bodies = [
        json!({ "email": "new@x.com", "password": "" }),
        json!({ "email": "", "password": "pw" }),
        json!({ "email": "invalid-email", "password": "pw" }),
        json!({ "email": "new@x.com" }),
        json!({ "email": 5, "password": "pw" }),
    ];

    for uri in ["/auth/register", "/auth/login"] {
        for body in &bodies {
            let response = test::TestRequest::post().uri(uri).set_json(body).send_request(&app).await;
            assert_eq!(response.status(), 400, "{uri} {body}");
            let body: serde_json::Value = test::read_body_json(response).await;
            assert_eq!(body, json!({ "error": "Validation failed" }));
        }
    }

    assert!(store.is_empty().await);
}

#[actix_web::test]
async fn test_register_normalizes_email() {
    let (state, store) = common::state();
    let app = test_app!(state);

    let response = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({ "email": "  Mixed.Case@X.com ", "password": "pw" }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 200);
    assert!(store.find_by_email("mixed.case@x.com").await.unwrap().is_some());

    let response = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": "MIXED.CASE@x.com", "password": "pw" }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 200);
}

#[actix_web::test]
async fn test_register_duplicate_email() {
    let (state, store) = common::state();
    let app = test_app!(state);

    for expected in [200, 409] {
        let response = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({ "email": "dup@x.com", "password": "pw" }))
            .send_request(&app)
            .await;
        assert_eq!(response.status(), expected);
    }
    assert_eq!(store.len().await, 1);
}

#[actix_web::test]
async fn test_me_returns_token_owner() {
    let (state, _) = common::state();
    let app = test_app!(state);

    let response = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({ "email": "me@x.com", "password": "pw" }))
        .send_request(&app)
        .await;
    let body: serde_json::Value = test::read_body_json(response).await;
    let token = token_of(&body);

    let response = test::TestRequest::get()
        .uri("/auth/me")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body, json!({ "id": 1, "email": "me@x.com" }));
}

#[actix_web::test]
async fn test_me_requires_authentication() {
    let (state, _) = common::state();
    let app = test_app!(state);

    let response = test::TestRequest::get().uri("/auth/me").send_request(&app).await;
    assert_eq!(response.status(), 401);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body, json!({ "error": "Authentication required" }));
}
