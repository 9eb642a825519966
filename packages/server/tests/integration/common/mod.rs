use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use ::common::{ApplicationStatus, PostStatus};
use reqwest::Client;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
use serde_json::{Value, json};
use uuid::Uuid;

use admissions_server::config::{
    AppConfig, AuthConfig, CorsConfig, DatabaseConfig, LoggingConfig, RateLimitConfig,
    ServerConfig, StorageBackend, StorageConfig, UploadConfig,
};
use admissions_server::entity::{admin, application, blog_post, profile};
use admissions_server::state::AppState;
use admissions_server::utils::jwt;
use ::common::storage::ObjectStore;
use ::common::storage::memory::MemoryObjectStore;

pub const TEST_SECRET: &str = "test-secret-for-integration-tests";
pub const FILES_BASE_URL: &str = "http://files.test";

/// Small limits so oversize uploads are cheap to build.
pub const DOCUMENT_MAX_BYTES: u64 = 1024;
pub const DOCUMENT_MAX_FILES: usize = 3;
pub const IMAGE_MAX_BYTES: u64 = 512;

pub mod routes {
    pub const APPLICATIONS: &str = "/api/applications";
    pub const UPLOAD_TEMP: &str = "/api/applications/upload-temp";
    pub const ADMIN_APPLICATIONS: &str = "/api/applications/admin";
    pub const APPLICATION_STATS: &str = "/api/applications/admin/stats";
    pub const LOGIN: &str = "/api/auth/login";
    pub const ME: &str = "/api/auth/me";
    pub const HEALTH: &str = "/api/health";
    pub const BLOG_POSTS: &str = "/api/blog/posts";
    pub const ADMIN_POSTS: &str = "/api/blog/admin/posts";
    pub const UPLOAD_IMAGE: &str = "/api/blog/admin/upload-image";
    pub const POST_STATS: &str = "/api/blog/admin/stats";

    pub fn application(id: &str) -> String {
        format!("/api/applications/{id}")
    }

    pub fn admin_application(id: &str) -> String {
        format!("/api/applications/admin/{id}")
    }

    pub fn application_status(id: &str) -> String {
        format!("/api/applications/admin/{id}/status")
    }

    pub fn application_documents(id: &str) -> String {
        format!("/api/applications/admin/{id}/documents")
    }

    pub fn post_by_slug(slug: &str) -> String {
        format!("/api/blog/posts/slug/{slug}")
    }

    pub fn check_slug(slug: &str) -> String {
        format!("/api/blog/check-slug?slug={slug}")
    }

    pub fn admin_post(id: &str) -> String {
        format!("/api/blog/admin/posts/{id}")
    }

    pub fn publish_post(id: &str) -> String {
        format!("/api/blog/admin/posts/{id}/publish")
    }

    pub fn unpublish_post(id: &str) -> String {
        format!("/api/blog/admin/posts/{id}/unpublish")
    }

    pub fn restore_post(id: &str) -> String {
        format!("/api/blog/admin/posts/{id}/restore")
    }

    pub fn permanent_delete(id: &str) -> String {
        format!("/api/blog/admin/posts/{id}/permanent")
    }

    pub fn storage(key: &str) -> String {
        format!("/api/storage/{key}")
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors: CorsConfig {
                allow_origins: vec![],
                max_age: 3600,
            },
        },
        database: DatabaseConfig {
            url: "postgres://mock".to_string(),
        },
        auth: AuthConfig {
            jwt_secret: TEST_SECRET.to_string(),
            audience: None,
            token_ttl_hours: 1,
            bootstrap_admin: None,
        },
        storage: StorageConfig {
            backend: StorageBackend::Memory,
            root: PathBuf::from("unused"),
            public_base_url: FILES_BASE_URL.to_string(),
            s3: None,
        },
        uploads: UploadConfig {
            document_max_bytes: DOCUMENT_MAX_BYTES,
            document_max_files: DOCUMENT_MAX_FILES,
            image_max_bytes: IMAGE_MAX_BYTES,
        },
        rate_limit: RateLimitConfig {
            max_requests: 0,
            window_secs: 60,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
    }
}

/// A running test server backed by a mock database and in-memory storage.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    db: DatabaseConnection,
    memory: Option<Arc<MemoryObjectStore>>,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
    pub headers: reqwest::header::HeaderMap,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let headers = res.headers().clone();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self {
            status,
            text,
            body,
            headers,
        }
    }

    /// `error.code` of an error envelope.
    pub fn error_code(&self) -> &str {
        self.body["error"]["code"].as_str().unwrap_or_default()
    }
}

impl TestApp {
    /// Spawn with a database that answers no queries.
    pub async fn spawn() -> Self {
        Self::spawn_with(mock_db(), test_config()).await
    }

    pub async fn spawn_with_db(db: MockDatabase) -> Self {
        Self::spawn_with(db, test_config()).await
    }

    pub async fn spawn_with(db: MockDatabase, config: AppConfig) -> Self {
        let memory = Arc::new(MemoryObjectStore::new(FILES_BASE_URL));
        let mut app = Self::spawn_with_store(db, config, memory.clone()).await;
        app.memory = Some(memory);
        app
    }

    /// Spawn against any object store. `store()` is only available for the in-memory default.
    pub async fn spawn_with_store(
        db: MockDatabase,
        config: AppConfig,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        let db = db.into_connection();
        let state = AppState::new(db.clone(), config, store);
        let app = admissions_server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            memory: None,
        }
    }

    /// Statements run against the mock database so far, parameters inlined.
    /// Reading drains the log.
    pub fn executed_sql(&self) -> Vec<String> {
        self.db
            .clone()
            .into_transaction_log()
            .into_iter()
            .flat_map(|txn| {
                txn.statements()
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// The in-memory store behind this app.
    pub fn store(&self) -> &MemoryObjectStore {
        self.memory
            .as_deref()
            .expect("App was spawned without the in-memory store")
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn send(&self, req: reqwest::RequestBuilder, token: Option<&str>) -> TestResponse {
        let req = match token {
            Some(t) => req.header("Authorization", format!("Bearer {t}")),
            None => req,
        };
        let res = req.send().await.expect("Failed to send request");
        TestResponse::from_response(res).await
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.send(self.client.get(self.url(path)), token).await
    }

    pub async fn post(&self, path: &str, body: &Value, token: Option<&str>) -> TestResponse {
        self.send(self.client.post(self.url(path)).json(body), token)
            .await
    }

    pub async fn post_empty(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.send(self.client.post(self.url(path)), token).await
    }

    pub async fn patch(&self, path: &str, body: &Value, token: Option<&str>) -> TestResponse {
        self.send(self.client.patch(self.url(path)).json(body), token)
            .await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.send(self.client.delete(self.url(path)), token).await
    }

    pub async fn upload(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
        token: Option<&str>,
    ) -> TestResponse {
        self.send(self.client.post(self.url(path)).multipart(form), token)
            .await
    }
}

/// Row answering a `COUNT(*) AS num_items` query.
pub fn count_row(n: i64) -> BTreeMap<&'static str, sea_orm::Value> {
    BTreeMap::from([("num_items", sea_orm::Value::BigInt(Some(n)))])
}

pub fn mock_db() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

pub fn exec_ok(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

pub fn file_part(name: &str, mime: &str, bytes: Vec<u8>) -> reqwest::multipart::Part {
    reqwest::multipart::Part::bytes(bytes)
        .file_name(name.to_string())
        .mime_str(mime)
        .expect("Failed to set MIME type")
}

/// Sign a token for `user_id` the way the identity provider would.
pub fn token_for(user_id: Uuid) -> String {
    jwt::sign(
        &user_id.to_string(),
        "someone@example.com",
        "authenticated",
        TEST_SECRET,
        1,
        None,
    )
    .expect("Failed to sign token")
}

pub fn profile_row(id: Uuid, role: &str) -> profile::Model {
    profile::Model {
        id,
        email: format!("{role}@example.com"),
        full_name: Some("Test User".into()),
        role: role.to_string(),
        created_at: Utc::now(),
    }
}

pub fn admin_row(id: Uuid, email: &str, password: &str) -> admin::Model {
    admin::Model {
        id,
        email: email.to_string(),
        password_hash: admissions_server::utils::hash::hash_password(password)
            .expect("Failed to hash password"),
        created_at: Utc::now(),
    }
}

pub fn application_row(id: Uuid, status: ApplicationStatus) -> application::Model {
    let now = Utc::now();
    application::Model {
        id,
        first_name: "Amara".into(),
        last_name: "Okafor".into(),
        email: "amara@example.com".into(),
        phone: "+2348012345678".into(),
        date_of_birth: None,
        nationality: Some("Nigerian".into()),
        country: "Canada".into(),
        program: "MSc Computer Science".into(),
        study_level: Some("Masters".into()),
        intake: None,
        personal_statement: None,
        passport_urls: json!([]),
        certificate_urls: json!(["https://files.test/applications/temp/certificates/a-cert.pdf"]),
        transcript_urls: json!([]),
        photo_urls: json!([]),
        recommendation_urls: json!([]),
        other_urls: json!([]),
        status,
        admin_notes: None,
        reviewed_at: None,
        reviewed_by: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn post_row(id: Uuid, slug: &str, status: PostStatus) -> blog_post::Model {
    let now = Utc::now();
    blog_post::Model {
        id,
        title: "Studying in Canada".into(),
        slug: slug.to_string(),
        content: "Everything you need to know.".into(),
        excerpt: None,
        featured_image: None,
        meta_title: None,
        meta_description: None,
        keywords: json!(["canada"]),
        status,
        author_id: Uuid::now_v7(),
        published_at: (status == PostStatus::Published).then_some(now),
        view_count: 0,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

pub fn valid_application_body() -> Value {
    json!({
        "first_name": "Amara",
        "last_name": "Okafor",
        "email": "amara@example.com",
        "phone": "+2348012345678",
        "country": "Canada",
        "program": "MSc Computer Science",
        "certificate_urls": ["https://files.test/applications/temp/certificates/a-cert.pdf"]
    })
}
