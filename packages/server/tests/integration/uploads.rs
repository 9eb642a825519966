use reqwest::multipart::Form;
use uuid::Uuid;

use crate::common::{
    DOCUMENT_MAX_BYTES, DOCUMENT_MAX_FILES, FILES_BASE_URL, IMAGE_MAX_BYTES, TestApp, file_part,
    mock_db, profile_row, routes, test_config, token_for,
};

mod documents {
    use super::*;

    #[tokio::test]
    async fn documents_are_stored_under_their_type() {
        let app = TestApp::spawn().await;
        let form = Form::new()
            .text("document_type", "passport")
            .part("files", file_part("passport scan.pdf", "application/pdf", b"%PDF-1.7".to_vec()))
            .part("files", file_part("photo.png", "image/png", vec![0x89, b'P', b'N', b'G']));

        let res = app.upload(routes::UPLOAD_TEMP, form, None).await;

        assert_eq!(res.status, 201, "{}", res.text);
        let files = res.body["files"].as_array().unwrap();
        assert_eq!(files.len(), 2);
        for file in files {
            assert_eq!(file["document_type"], "passport");
            let url = file["url"].as_str().unwrap();
            assert!(url.starts_with(&format!("{FILES_BASE_URL}/applications/temp/passports/")));
        }
        assert_eq!(app.store().len().await, 2);
    }

    #[tokio::test]
    async fn oversize_file_is_rejected_before_storage() {
        let app = TestApp::spawn().await;
        let form = Form::new()
            .part("files", file_part("ok.pdf", "application/pdf", vec![1; 10]))
            .part(
                "files",
                file_part(
                    "big.pdf",
                    "application/pdf",
                    vec![0; DOCUMENT_MAX_BYTES as usize + 1],
                ),
            );

        let res = app.upload(routes::UPLOAD_TEMP, form, None).await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.error_code(), "FILE_UPLOAD_ERROR");
        assert!(app.store().is_empty().await);
    }

    #[tokio::test]
    async fn disallowed_mime_type_is_rejected_before_storage() {
        let app = TestApp::spawn().await;
        let form = Form::new().part(
            "file",
            file_part("setup.exe", "application/x-msdownload", vec![b'M', b'Z']),
        );

        let res = app.upload(routes::UPLOAD_TEMP, form, None).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "FILE_UPLOAD_ERROR");
        assert!(app.store().is_empty().await);
    }

    #[tokio::test]
    async fn too_many_files_are_rejected() {
        let app = TestApp::spawn().await;
        let mut form = Form::new();
        for i in 0..=DOCUMENT_MAX_FILES {
            form = form.part(
                "files",
                file_part(&format!("doc{i}.pdf"), "application/pdf", vec![1; 4]),
            );
        }

        let res = app.upload(routes::UPLOAD_TEMP, form, None).await;

        assert_eq!(res.status, 400);
        assert!(app.store().is_empty().await);
    }

    #[tokio::test]
    async fn request_without_files_is_rejected() {
        let app = TestApp::spawn().await;
        let form = Form::new().text("document_type", "transcript");

        let res = app.upload(routes::UPLOAD_TEMP, form, None).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "FILE_UPLOAD_ERROR");
    }

    #[tokio::test]
    async fn unknown_document_type_is_rejected() {
        let app = TestApp::spawn().await;
        let form = Form::new()
            .text("document_type", "selfie")
            .part("file", file_part("a.pdf", "application/pdf", vec![1; 4]));

        let res = app.upload(routes::UPLOAD_TEMP, form, None).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn stored_document_can_be_downloaded() {
        let app = TestApp::spawn().await;
        let form = Form::new().part(
            "file",
            file_part("transcript.pdf", "application/pdf", b"%PDF-1.4 data".to_vec()),
        );
        let res = app.upload(routes::UPLOAD_TEMP, form, None).await;
        assert_eq!(res.status, 201, "{}", res.text);
        let key = res.body["files"][0]["key"].as_str().unwrap().to_string();

        let res = app.get(&routes::storage(&key), None).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.headers["content-type"], "application/pdf");
        assert_eq!(res.text, "%PDF-1.4 data");
    }

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let app = TestApp::spawn().await;
        let res = app
            .get(&routes::storage("applications/temp/nothing.pdf"), None)
            .await;
        assert_eq!(res.status, 404);
    }
}

mod images {
    use super::*;

    #[tokio::test]
    async fn image_upload_requires_admin() {
        let app = TestApp::spawn().await;
        let form = Form::new().part("image", file_part("cover.png", "image/png", vec![1; 8]));
        let res = app.upload(routes::UPLOAD_IMAGE, form, None).await;
        assert_eq!(res.status, 401);
        assert!(app.store().is_empty().await);
    }

    #[tokio::test]
    async fn admin_uploads_blog_image() {
        let admin_id = Uuid::now_v7();
        let db = mock_db().append_query_results([vec![profile_row(admin_id, "admin")]]);
        let app = TestApp::spawn_with_db(db).await;

        let form = Form::new().part("image", file_part("cover.png", "image/png", vec![1; 8]));
        let res = app
            .upload(routes::UPLOAD_IMAGE, form, Some(&token_for(admin_id)))
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(
            res.body["file"]["url"]
                .as_str()
                .unwrap()
                .starts_with(&format!("{FILES_BASE_URL}/blog/images/"))
        );
        assert_eq!(app.store().len().await, 1);
    }

    #[tokio::test]
    async fn pdf_is_not_an_image() {
        let admin_id = Uuid::now_v7();
        let db = mock_db().append_query_results([vec![profile_row(admin_id, "admin")]]);
        let app = TestApp::spawn_with_db(db).await;

        let form = Form::new().part(
            "image",
            file_part("cover.pdf", "application/pdf", vec![1; IMAGE_MAX_BYTES as usize]),
        );
        let res = app
            .upload(routes::UPLOAD_IMAGE, form, Some(&token_for(admin_id)))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "FILE_UPLOAD_ERROR");
        assert!(app.store().is_empty().await);
    }
}

mod on_disk {
    use std::sync::Arc;

    use ::common::storage::filesystem::FilesystemObjectStore;

    use super::*;

    async fn spawn_on_disk(dir: &tempfile::TempDir) -> TestApp {
        let store = FilesystemObjectStore::new(dir.path().join("objects"), FILES_BASE_URL.into())
            .await
            .unwrap();
        TestApp::spawn_with_store(mock_db(), test_config(), Arc::new(store)).await
    }

    #[tokio::test]
    async fn misnamed_markup_is_served_as_the_checked_type() {
        let dir = tempfile::tempdir().unwrap();
        let app = spawn_on_disk(&dir).await;

        let form = Form::new().part(
            "file",
            file_part(
                "evil.html",
                "application/pdf",
                b"<script>alert(1)</script>".to_vec(),
            ),
        );
        let res = app.upload(routes::UPLOAD_TEMP, form, None).await;
        assert_eq!(res.status, 201, "{}", res.text);
        let key = res.body["files"][0]["key"].as_str().unwrap().to_string();
        assert!(key.ends_with("-evil.pdf"), "{key}");

        let res = app.get(&routes::storage(&key), None).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.headers["content-type"], "application/pdf");
        let disposition = res.headers["content-disposition"].to_str().unwrap();
        assert!(disposition.starts_with("attachment;"), "{disposition}");
        assert_eq!(res.headers["x-content-type-options"], "nosniff");
    }

    #[tokio::test]
    async fn images_render_inline() {
        let dir = tempfile::tempdir().unwrap();
        let app = spawn_on_disk(&dir).await;

        let form = Form::new().part("file", file_part("me", "image/png", vec![0x89, b'P', b'N', b'G']));
        let res = app.upload(routes::UPLOAD_TEMP, form, None).await;
        assert_eq!(res.status, 201, "{}", res.text);
        let key = res.body["files"][0]["key"].as_str().unwrap().to_string();
        assert!(key.ends_with("-me.png"), "{key}");

        let res = app.get(&routes::storage(&key), None).await;
        assert_eq!(res.headers["content-type"], "image/png");
        assert!(
            res.headers["content-disposition"]
                .to_str()
                .unwrap()
                .starts_with("inline;")
        );
    }
}
