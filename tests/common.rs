#![allow(dead_code)] // each integration binary compiles this module and uses a subset

use async_trait::async_trait;
use bytes::Bytes;
use lendahand_server::api;
use lendahand_server::config::{AuthConfig, Config, HealthConfig, LogFormat, MediaConfig, ServerConfig, TelemetryConfig};
use lendahand_server::error::{AppError, Result as AppResult};
use lendahand_server::media::MediaStore;
use lendahand_server::storage;
use serde_json::{Value, json};
use sqlx::PgPool;
use std::sync::Arc;
use std::sync::Once;
use uuid::Uuid;

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("lendahand_server=debug".parse().unwrap())
            .add_directive("sqlx=warn".parse().unwrap())
            .add_directive("tower=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

/// Media store stand-in: hands back a deterministic URL without talking to
/// anything.
#[derive(Default)]
pub struct FakeMediaStore;

#[async_trait]
impl MediaStore for FakeMediaStore {
    async fn store(&self, _bytes: Bytes, _content_type: &str, hint: &str) -> AppResult<String> {
        Ok(format!("https://media.test/items/{}_{}", hint.replace(' ', "_"), Uuid::new_v4()))
    }

    async fn check(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Media store stand-in whose uploads always fail, for exercising
/// upload-failure atomicity.
pub struct FailingMediaStore;

#[async_trait]
impl MediaStore for FailingMediaStore {
    async fn store(&self, _bytes: Bytes, _content_type: &str, _hint: &str) -> AppResult<String> {
        Err(AppError::MediaUpload)
    }

    async fn check(&self) -> AppResult<()> {
        Ok(())
    }
}

pub fn test_config(database_url: String) -> Config {
    Config {
        database_url,
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // 0 means let OS choose
            cors_origins: vec!["*".to_string()],
        },
        auth: AuthConfig {
            jwt_secret: "test_secret".to_string(),
            token_ttl_days: 7,
            email_domain: "@cmrcet.ac.in".to_string(),
        },
        media: MediaConfig {
            bucket: "test-bucket".to_string(),
            region: "us-east-1".to_string(),
            endpoint: None,
            access_key: None,
            secret_key: None,
            force_path_style: false,
            public_base_url: None,
            max_image_size_bytes: 10_485_760,
        },
        health: HealthConfig { db_timeout_ms: 2000, storage_timeout_ms: 2000 },
        telemetry: TelemetryConfig { otlp_endpoint: None, log_format: LogFormat::Text },
    }
}

pub struct TestUser {
    pub user_id: Uuid,
    pub token: String,
    pub email: String,
}

pub struct TestApp {
    pub server_url: String,
    pub client: reqwest::Client,
    pub pool: PgPool,
}

impl TestApp {
    /// Boots the full app against the database named by
    /// `LENDAHAND_TEST_DATABASE_URL`, with a fake media store. Returns `None`
    /// (and the suite self-skips) when the variable is unset.
    pub async fn spawn() -> Option<Self> {
        Self::spawn_with_media(Arc::new(FakeMediaStore)).await
    }

    /// Same as `spawn`, with a caller-supplied media store.
    pub async fn spawn_with_media(media: Arc<dyn MediaStore>) -> Option<Self> {
        setup_tracing();

        let Ok(database_url) = std::env::var("LENDAHAND_TEST_DATABASE_URL") else {
            eprintln!("skipping: LENDAHAND_TEST_DATABASE_URL is not set");
            return None;
        };

        let pool = storage::init_pool(&database_url).await.expect("Failed to connect to DB. Is Postgres running?");
        storage::run_migrations(&pool).await.expect("Failed to run migrations");

        let config = test_config(database_url);
        let services = api::build_services(&config, pool.clone(), media);
        let router = api::app_router(config, services);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");

        tokio::spawn(async move {
            axum::serve(listener, router.into_make_service()).await.expect("Test server crashed");
        });

        Some(Self {
            server_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
            pool,
        })
    }

    pub async fn signup(&self, name: &str) -> TestUser {
        let email = format!("{name}@cmrcet.ac.in");
        let resp = self
            .client
            .post(format!("{}/api/auth/signup", self.server_url))
            .json(&json!({
                "name": name,
                "email": email,
                "phone": "9999999999",
                "password": "password12345",
            }))
            .send()
            .await
            .expect("signup request failed");
        assert_eq!(resp.status(), 201, "signup should succeed for {email}");

        let body: Value = resp.json().await.expect("signup response not json");
        let token = body["token"].as_str().expect("missing token").to_string();
        let user_id = body["user"]["id"].as_str().and_then(|s| s.parse().ok()).expect("missing user id");

        TestUser { user_id, token, email }
    }

    pub async fn create_item(&self, token: &str, title: &str, category: &str) -> Uuid {
        let resp = self.post_item(token, title, category, "photo.png", "image/png").await;
        assert_eq!(resp.status(), 201, "item creation should succeed");

        let body: Value = resp.json().await.expect("item response not json");
        body["id"].as_str().and_then(|s| s.parse().ok()).expect("missing item id")
    }

    pub async fn post_item(
        &self,
        token: &str,
        title: &str,
        category: &str,
        file_name: &str,
        mime: &str,
    ) -> reqwest::Response {
        let file_part = reqwest::multipart::Part::bytes(PNG_BYTES.to_vec())
            .file_name(file_name.to_string())
            .mime_str(mime)
            .expect("bad mime");

        let form = reqwest::multipart::Form::new()
            .text("title", title.to_string())
            .text("description", format!("{title} in good condition"))
            .text("category", category.to_string())
            .text("location", "Block C")
            .text("contact_phone", "9999999999")
            .part("file", file_part);

        self.client
            .post(format!("{}/api/items", self.server_url))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .expect("create item request failed")
    }

    pub async fn send_message(&self, token: &str, item_id: Uuid, receiver_id: Uuid, text: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/api/messages", self.server_url))
            .bearer_auth(token)
            .json(&json!({
                "itemId": item_id,
                "receiverId": receiver_id,
                "message": text,
            }))
            .send()
            .await
            .expect("send message request failed")
    }

    pub async fn get_messages(&self, token: &str, item_id: Uuid, other_user_id: Uuid) -> Vec<Value> {
        let resp = self
            .client
            .get(format!("{}/api/messages/{item_id}/{other_user_id}", self.server_url))
            .bearer_auth(token)
            .send()
            .await
            .expect("list messages request failed");
        assert_eq!(resp.status(), 200);

        resp.json().await.expect("messages response not json")
    }

    pub async fn get_conversations(&self, token: &str) -> Vec<Value> {
        let resp = self
            .client
            .get(format!("{}/api/conversations", self.server_url))
            .bearer_auth(token)
            .send()
            .await
            .expect("list conversations request failed");
        assert_eq!(resp.status(), 200);

        resp.json().await.expect("conversations response not json")
    }
}

/// Short unique suffix so concurrent test runs cannot collide on emails or
/// categories.
pub fn run_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// The derived thread id: sorted participant pair, then the item.
pub fn expected_conversation_id(a: Uuid, b: Uuid, item_id: Uuid) -> String {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    format!("{lo}_{hi}_{item_id}")
}

const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, 0x00, 0x00,
    0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4, 0x89,
];
