use serde_json::json;
use uuid::Uuid;

use admissions_server::entity::{admin, profile};
use admissions_server::utils::jwt;

use crate::common::{TEST_SECRET, TestApp, admin_row, mock_db, profile_row, routes, token_for};

mod login {
    use super::*;

    #[tokio::test]
    async fn admin_can_log_in_and_use_the_token() {
        let admin_id = Uuid::now_v7();
        let db = mock_db()
            .append_query_results([vec![admin_row(admin_id, "admin@example.com", "s3cure_P@ss!")]])
            .append_query_results([vec![profile_row(admin_id, "super_admin")]]);
        let app = TestApp::spawn_with_db(db).await;

        let res = app
            .post(
                routes::LOGIN,
                &json!({"email": "Admin@Example.com ", "password": "s3cure_P@ss!"}),
                None,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["user"]["role"], "super_admin");
        let token = res.body["token"].as_str().expect("token missing");
        let claims = jwt::verify(token, TEST_SECRET, None).unwrap();
        assert_eq!(claims.sub, admin_id.to_string());
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let admin_id = Uuid::now_v7();
        let db = mock_db().append_query_results([vec![admin_row(
            admin_id,
            "admin@example.com",
            "s3cure_P@ss!",
        )]]);
        let app = TestApp::spawn_with_db(db).await;

        let res = app
            .post(
                routes::LOGIN,
                &json!({"email": "admin@example.com", "password": "guess"}),
                None,
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.error_code(), "AUTHENTICATION_ERROR");
    }

    #[tokio::test]
    async fn unknown_email_gets_the_same_error() {
        let db = mock_db().append_query_results([Vec::<admin::Model>::new()]);
        let app = TestApp::spawn_with_db(db).await;

        let res = app
            .post(
                routes::LOGIN,
                &json!({"email": "nobody@example.com", "password": "whatever"}),
                None,
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["error"]["message"], "Invalid email or password");
    }

    #[tokio::test]
    async fn empty_password_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let res = app
            .post(
                routes::LOGIN,
                &json!({"email": "admin@example.com", "password": ""}),
                None,
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "VALIDATION_ERROR");
    }
}

mod me {
    use super::*;

    #[tokio::test]
    async fn returns_the_callers_profile() {
        let user_id = Uuid::now_v7();
        let db = mock_db()
            .append_query_results([vec![profile_row(user_id, "admin")]])
            .append_query_results([vec![profile_row(user_id, "admin")]]);
        let app = TestApp::spawn_with_db(db).await;

        let res = app.get(routes::ME, Some(&token_for(user_id))).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["user"]["id"], user_id.to_string());
        assert_eq!(res.body["user"]["role"], "admin");
    }

    #[tokio::test]
    async fn users_without_profile_are_plain_users() {
        let user_id = Uuid::now_v7();
        let db = mock_db()
            .append_query_results([Vec::<profile::Model>::new()])
            .append_query_results([Vec::<profile::Model>::new()]);
        let app = TestApp::spawn_with_db(db).await;

        let res = app.get(routes::ME, Some(&token_for(user_id))).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["user"]["role"], "user");
        assert_eq!(res.body["user"]["email"], "someone@example.com");
    }

    #[tokio::test]
    async fn token_signed_with_another_secret_is_rejected() {
        let app = TestApp::spawn().await;
        let forged = jwt::sign(
            &Uuid::now_v7().to_string(),
            "x@example.com",
            "admin",
            "some-other-secret",
            1,
            None,
        )
        .unwrap();

        let res = app.get(routes::ME, Some(&forged)).await;
        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn non_uuid_subject_is_rejected() {
        let app = TestApp::spawn().await;
        let token = jwt::sign("42", "x@example.com", "admin", TEST_SECRET, 1, None).unwrap();

        let res = app.get(routes::ME, Some(&token)).await;
        assert_eq!(res.status, 401);
    }
}

#[tokio::test]
async fn health_reports_storage_backend() {
    let app = TestApp::spawn().await;
    let res = app.get(routes::HEALTH, None).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["status"], "ok");
    assert_eq!(res.body["storage_backend"], "memory");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::spawn().await;
    let res = app.get("/api-docs/openapi.json", None).await;
    assert_eq!(res.status, 200);
    assert!(res.body["paths"]["/api/applications"].is_object());
    assert!(res.body["paths"]["/api/blog/admin/posts/{id}/publish"].is_object());
}
