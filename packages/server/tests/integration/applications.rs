use ::common::ApplicationStatus;
use serde_json::json;
use uuid::Uuid;

use crate::common::{
    TestApp, application_row, count_row, mock_db, profile_row, routes, test_config, token_for,
    valid_application_body,
};

mod submission {
    use super::*;

    #[tokio::test]
    async fn valid_application_is_created_as_submitted() {
        let id = Uuid::now_v7();
        let db = mock_db().append_query_results([vec![application_row(
            id,
            ApplicationStatus::Submitted,
        )]]);
        let app = TestApp::spawn_with_db(db).await;

        let res = app
            .post(routes::APPLICATIONS, &valid_application_body(), None)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["application"]["id"], id.to_string());
        assert_eq!(res.body["application"]["status"], "submitted");
        assert!(res.body["message"].is_string());
    }

    #[tokio::test]
    async fn application_without_certificates_is_rejected() {
        let app = TestApp::spawn().await;

        let mut body = valid_application_body();
        body.as_object_mut().unwrap().remove("certificate_urls");
        let res = app.post(routes::APPLICATIONS, &body, None).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "VALIDATION_ERROR");
        assert_eq!(res.body["error"]["name"], "ValidationError");

        body["certificate_urls"] = json!([]);
        let res = app.post(routes::APPLICATIONS, &body, None).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn malformed_email_is_rejected() {
        let app = TestApp::spawn().await;
        let mut body = valid_application_body();
        body["email"] = json!("amara-at-example");

        let res = app.post(routes::APPLICATIONS, &body, None).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn malformed_json_uses_the_error_envelope() {
        let app = TestApp::spawn().await;
        let res = app
            .post(routes::APPLICATIONS, &json!({"first_name": 42}), None)
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn public_submissions_are_rate_limited() {
        let mut config = test_config();
        config.rate_limit.max_requests = 2;
        let app = TestApp::spawn_with(mock_db(), config).await;

        let body = json!({});
        for _ in 0..2 {
            let res = app.post(routes::APPLICATIONS, &body, None).await;
            assert_eq!(res.status, 400);
        }

        let res = app.post(routes::APPLICATIONS, &body, None).await;
        assert_eq!(res.status, 429);
        assert_eq!(res.error_code(), "RATE_LIMIT_EXCEEDED");
        assert!(res.headers.contains_key("retry-after"));
    }
}

mod lookup {
    use super::*;

    #[tokio::test]
    async fn nonexistent_application_is_not_found() {
        let db = mock_db()
            .append_query_results([Vec::<admissions_server::entity::application::Model>::new()]);
        let app = TestApp::spawn_with_db(db).await;

        let res = app
            .get(&routes::application(&Uuid::now_v7().to_string()), None)
            .await;
        assert_eq!(res.status, 404);
        assert_eq!(res.error_code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn malformed_id_is_not_found() {
        let app = TestApp::spawn().await;
        let res = app.get(&routes::application("not-a-uuid"), None).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn deleted_application_is_hidden_from_public_lookup() {
        let id = Uuid::now_v7();
        let db = mock_db().append_query_results([vec![application_row(
            id,
            ApplicationStatus::Deleted,
        )]]);
        let app = TestApp::spawn_with_db(db).await;

        let res = app.get(&routes::application(&id.to_string()), None).await;
        assert_eq!(res.status, 404);
    }
}

mod admin_review {
    use super::*;

    #[tokio::test]
    async fn admin_routes_require_a_token() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::ADMIN_APPLICATIONS, None).await;
        assert_eq!(res.status, 401);
        assert_eq!(res.error_code(), "AUTHENTICATION_ERROR");

        let res = app
            .patch(
                &routes::application_status(&Uuid::now_v7().to_string()),
                &json!({"status": "approved"}),
                Some("not.a.jwt"),
            )
            .await;
        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn non_admin_profile_is_forbidden() {
        let user_id = Uuid::now_v7();
        let db = mock_db().append_query_results([vec![profile_row(user_id, "user")]]);
        let app = TestApp::spawn_with_db(db).await;

        let res = app
            .get(routes::ADMIN_APPLICATIONS, Some(&token_for(user_id)))
            .await;
        assert_eq!(res.status, 403);
        assert_eq!(res.error_code(), "AUTHORIZATION_ERROR");
    }

    #[tokio::test]
    async fn token_without_profile_is_forbidden() {
        let user_id = Uuid::now_v7();
        let db = mock_db()
            .append_query_results([Vec::<admissions_server::entity::profile::Model>::new()]);
        let app = TestApp::spawn_with_db(db).await;

        let res = app
            .get(routes::ADMIN_APPLICATIONS, Some(&token_for(user_id)))
            .await;
        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn status_outside_the_enumeration_is_rejected() {
        let admin_id = Uuid::now_v7();
        let db = mock_db().append_query_results([vec![profile_row(admin_id, "admin")]]);
        let app = TestApp::spawn_with_db(db).await;

        let res = app
            .patch(
                &routes::application_status(&Uuid::now_v7().to_string()),
                &json!({"status": "archived"}),
                Some(&token_for(admin_id)),
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "VALIDATION_ERROR");
        assert!(
            res.body["error"]["message"]
                .as_str()
                .unwrap()
                .contains("under_review")
        );
    }

    #[tokio::test]
    async fn admin_can_move_application_under_review() {
        let admin_id = Uuid::now_v7();
        let app_id = Uuid::now_v7();

        let mut reviewed = application_row(app_id, ApplicationStatus::UnderReview);
        reviewed.reviewed_by = Some(admin_id);
        reviewed.reviewed_at = Some(chrono::Utc::now());
        reviewed.admin_notes = Some("Checking transcripts".into());

        let db = mock_db()
            .append_query_results([vec![profile_row(admin_id, "admin")]])
            .append_query_results([vec![application_row(app_id, ApplicationStatus::Submitted)]])
            .append_query_results([vec![reviewed]]);
        let app = TestApp::spawn_with_db(db).await;

        let res = app
            .patch(
                &routes::application_status(&app_id.to_string()),
                &json!({"status": "under_review", "admin_notes": "Checking transcripts"}),
                Some(&token_for(admin_id)),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["application"]["status"], "under_review");
        assert_eq!(res.body["application"]["reviewed_by"], admin_id.to_string());
    }

    #[tokio::test]
    async fn status_update_cannot_delete() {
        let admin_id = Uuid::now_v7();
        let db = mock_db().append_query_results([vec![profile_row(admin_id, "super_admin")]]);
        let app = TestApp::spawn_with_db(db).await;

        let res = app
            .patch(
                &routes::application_status(&Uuid::now_v7().to_string()),
                &json!({"status": "deleted"}),
                Some(&token_for(admin_id)),
            )
            .await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn unknown_document_type_is_rejected() {
        let admin_id = Uuid::now_v7();
        let db = mock_db().append_query_results([vec![profile_row(admin_id, "admin")]]);
        let app = TestApp::spawn_with_db(db).await;

        let res = app
            .patch(
                &routes::application_documents(&Uuid::now_v7().to_string()),
                &json!({"document_type": "diploma", "urls": []}),
                Some(&token_for(admin_id)),
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "VALIDATION_ERROR");
    }
}

mod admin_dashboard {
    use std::collections::BTreeMap;

    use admissions_server::entity::application;
    use sea_orm::Value;

    use super::*;

    fn admin_db(admin_id: Uuid) -> sea_orm::MockDatabase {
        mock_db().append_query_results([vec![profile_row(admin_id, "admin")]])
    }

    #[tokio::test]
    async fn list_applies_filters_sorting_and_pagination() {
        let admin_id = Uuid::now_v7();
        let db = admin_db(admin_id)
            .append_query_results([vec![count_row(45)]])
            .append_query_results([vec![
                application_row(Uuid::now_v7(), ApplicationStatus::Approved),
                application_row(Uuid::now_v7(), ApplicationStatus::Approved),
            ]]);
        let app = TestApp::spawn_with_db(db).await;

        let res = app
            .get(
                &format!(
                    "{}?status=approved&country=Canada&search=Okafor&page=2&per_page=20&sort_by=last_name&sort_order=asc",
                    routes::ADMIN_APPLICATIONS
                ),
                Some(&token_for(admin_id)),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["applications"].as_array().unwrap().len(), 2);
        assert_eq!(
            res.body["pagination"],
            json!({"page": 2, "per_page": 20, "total": 45, "total_pages": 3})
        );

        let sql = app.executed_sql();
        let list = sql.last().unwrap();
        assert!(list.contains("'approved'"), "{list}");
        assert!(list.contains("'Canada'"), "{list}");
        assert!(list.contains("'%okafor%'"), "{list}");
        assert!(list.contains(r#""last_name" ASC"#), "{list}");
        assert!(list.contains("LIMIT 20 OFFSET 20"), "{list}");
    }

    #[tokio::test]
    async fn deleted_applications_are_listed_only_on_request() {
        let admin_id = Uuid::now_v7();
        let db = mock_db()
            .append_query_results([vec![profile_row(admin_id, "admin")]])
            .append_query_results([vec![count_row(0)]])
            .append_query_results([Vec::<application::Model>::new()])
            .append_query_results([vec![profile_row(admin_id, "admin")]])
            .append_query_results([vec![count_row(0)]])
            .append_query_results([Vec::<application::Model>::new()]);
        let app = TestApp::spawn_with_db(db).await;
        let token = token_for(admin_id);

        let res = app.get(routes::ADMIN_APPLICATIONS, Some(&token)).await;
        assert_eq!(res.status, 200, "{}", res.text);
        let default_list = app.executed_sql().pop().unwrap();
        assert!(default_list.contains("<> 'deleted'"), "{default_list}");

        let res = app
            .get(
                &format!("{}?include_deleted=true", routes::ADMIN_APPLICATIONS),
                Some(&token),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        let full_list = app.executed_sql().pop().unwrap();
        assert!(!full_list.contains("'deleted'"), "{full_list}");
    }

    #[tokio::test]
    async fn unknown_sort_options_are_rejected() {
        let admin_id = Uuid::now_v7();
        let db = admin_db(admin_id).append_query_results([vec![profile_row(admin_id, "admin")]]);
        let app = TestApp::spawn_with_db(db).await;
        let token = token_for(admin_id);

        let res = app
            .get(
                &format!("{}?sort_by=password", routes::ADMIN_APPLICATIONS),
                Some(&token),
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "VALIDATION_ERROR");

        let res = app
            .get(
                &format!("{}?sort_order=sideways", routes::ADMIN_APPLICATIONS),
                Some(&token),
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn huge_page_numbers_are_clamped() {
        let admin_id = Uuid::now_v7();
        let db = admin_db(admin_id)
            .append_query_results([vec![count_row(3)]])
            .append_query_results([Vec::<application::Model>::new()]);
        let app = TestApp::spawn_with_db(db).await;

        let res = app
            .get(
                &format!("{}?page={}", routes::ADMIN_APPLICATIONS, u64::MAX),
                Some(&token_for(admin_id)),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["pagination"]["page"], 1_000_000);
        assert_eq!(res.body["applications"], json!([]));
        let list = app.executed_sql().pop().unwrap();
        assert!(list.contains("OFFSET 19999980"), "{list}");
    }

    #[tokio::test]
    async fn stats_count_by_status() {
        let admin_id = Uuid::now_v7();
        // Tuple rows decode by position; keys only fix the order.
        let grouped: Vec<BTreeMap<&str, Value>> = [("approved", 3), ("deleted", 2), ("submitted", 5)]
            .into_iter()
            .map(|(status, count)| {
                BTreeMap::from([
                    ("a_status", Value::from(status)),
                    ("b_count", Value::BigInt(Some(count))),
                ])
            })
            .collect();
        let db = admin_db(admin_id)
            .append_query_results([grouped])
            .append_query_results([vec![count_row(4)]]);
        let app = TestApp::spawn_with_db(db).await;

        let res = app
            .get(routes::APPLICATION_STATS, Some(&token_for(admin_id)))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let stats = &res.body["stats"];
        assert_eq!(stats["total"], 8);
        assert_eq!(stats["last_7_days"], 4);
        let count_of = |status: &str| {
            stats["by_status"]
                .as_array()
                .unwrap()
                .iter()
                .find(|c| c["status"] == status)
                .map(|c| c["count"].clone())
                .unwrap()
        };
        assert_eq!(count_of("approved"), 3);
        assert_eq!(count_of("deleted"), 2);
        assert_eq!(count_of("under_review"), 0);
    }

    #[tokio::test]
    async fn delete_marks_application_deleted_once() {
        let admin_id = Uuid::now_v7();
        let id = Uuid::now_v7();
        let db = admin_db(admin_id)
            .append_query_results([vec![application_row(id, ApplicationStatus::UnderReview)]])
            .append_query_results([vec![application_row(id, ApplicationStatus::Deleted)]])
            .append_query_results([vec![profile_row(admin_id, "admin")]])
            .append_query_results([vec![application_row(id, ApplicationStatus::Deleted)]]);
        let app = TestApp::spawn_with_db(db).await;
        let token = token_for(admin_id);

        let res = app
            .delete(&routes::admin_application(&id.to_string()), Some(&token))
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["application"]["status"], "deleted");
        let update = app.executed_sql().pop().unwrap();
        assert!(update.contains(r#"SET "status" = 'deleted'"#), "{update}");

        let res = app
            .delete(&routes::admin_application(&id.to_string()), Some(&token))
            .await;
        assert_eq!(res.status, 404);
        assert_eq!(res.error_code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn documents_of_one_type_are_replaced() {
        let admin_id = Uuid::now_v7();
        let id = Uuid::now_v7();
        let transcript = "https://files.test/applications/temp/transcripts/t.pdf";
        let mut updated = application_row(id, ApplicationStatus::Submitted);
        updated.transcript_urls = json!([transcript]);

        let db = admin_db(admin_id)
            .append_query_results([vec![application_row(id, ApplicationStatus::Submitted)]])
            .append_query_results([vec![updated]]);
        let app = TestApp::spawn_with_db(db).await;

        let res = app
            .patch(
                &routes::application_documents(&id.to_string()),
                &json!({"document_type": "transcript", "urls": [transcript]}),
                Some(&token_for(admin_id)),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["application"]["transcript_urls"], json!([transcript]));
        let update = app.executed_sql().pop().unwrap();
        assert!(update.contains(r#"SET "transcript_urls" = "#), "{update}");
    }
}
