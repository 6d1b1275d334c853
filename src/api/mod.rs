use crate::config::{Config, ServerConfig};
use crate::media::MediaStore;
use crate::services::account_service::AccountService;
use crate::services::chat_service::ChatService;
use crate::services::health_service::HealthService;
use crate::services::item_service::ItemService;
use crate::storage::DbPool;
use crate::storage::conversation_repo::ConversationRepository;
use crate::storage::item_repo::ItemRepository;
use crate::storage::message_repo::MessageRepository;
use crate::storage::user_repo::UserRepository;
use std::sync::Arc;
use axum::body::Body;
use axum::http::{HeaderValue, Request};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod chat;
pub mod health;
pub mod items;
pub mod middleware;
pub mod schemas;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Config,
    pub account_service: AccountService,
    pub item_service: ItemService,
    pub chat_service: ChatService,
    pub health_service: HealthService,
}

#[derive(Debug)]
pub struct ServiceContainer {
    pub account_service: AccountService,
    pub item_service: ItemService,
    pub chat_service: ChatService,
    pub health_service: HealthService,
}

/// Wires the repositories and services on top of a connected pool and a
/// media store.
pub fn build_services(config: &Config, pool: DbPool, media: Arc<dyn MediaStore>) -> ServiceContainer {
    let users = UserRepository::new(pool.clone());
    let items = ItemRepository::new(pool.clone());
    let conversations = ConversationRepository::new(pool.clone());
    let messages = MessageRepository::new(pool.clone());

    ServiceContainer {
        account_service: AccountService::new(config.auth.clone(), users.clone()),
        item_service: ItemService::new(items.clone(), Arc::clone(&media), config.media.max_image_size_bytes),
        chat_service: ChatService::new(users, items, conversations, messages),
        health_service: HealthService::new(pool, media, config.health.clone()),
    }
}

/// Configures and returns the application router.
pub fn app_router(config: Config, services: ServiceContainer) -> Router {
    let cors = cors_layer(&config.server);
    // Leave headroom over the image cap for the metadata fields.
    let body_limit = DefaultBodyLimit::max(config.media.max_image_size_bytes + 64 * 1024);

    let state = AppState {
        config,
        account_service: services.account_service,
        item_service: services.item_service,
        chat_service: services.chat_service,
        health_service: services.health_service,
    };

    let api_routes = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/items", post(items::create_item).get(items::list_items))
        .route("/items/{itemId}", get(items::get_item))
        .route("/items/{itemId}/status", patch(items::update_status))
        .route("/items/user/{userId}", get(items::list_user_items))
        .route("/messages", post(chat::send_message))
        .route("/messages/{itemId}/{otherUserId}", get(chat::list_messages))
        .route("/conversations", get(chat::list_conversations))
        .layer(body_limit);

    Router::new()
        .route("/livez", get(health::livez))
        .route("/readyz", get(health::readyz))
        .nest("/api", api_routes)
        .layer(cors)
        .layer(PropagateRequestIdLayer::new(axum::http::HeaderName::from_static("x-request-id")))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(move |request: &Request<Body>| {
                    let request_id = request
                        .extensions()
                        .get::<tower_http::request_id::RequestId>()
                        .map(|id| id.header_value().to_str().unwrap_or_default())
                        .unwrap_or_default()
                        .to_string();

                    tracing::info_span!(
                        "request",
                        "request_id" = %request_id,
                        "http.request.method" = %request.method(),
                        "url.path" = %request.uri().path(),
                        "http.response.status_code" = tracing::field::Empty,
                        "otel.kind" = "server",
                        "user_id" = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, _span: &tracing::Span| {
                        let status = response.status();
                        tracing::Span::current().record("http.response.status_code", status.as_u16());

                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %status.as_u16(),
                            "request completed"
                        );
                    },
                )
                .on_failure(|error, _latency, _span: &tracing::Span| {
                    tracing::error!(error = %error, "request failed");
                }),
        )
        .layer(SetRequestIdLayer::new(
            axum::http::HeaderName::from_static("x-request-id"),
            middleware::MakeRequestUuid,
        ))
        .with_state(state)
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if server.cors_origins.iter().any(|origin| origin == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            server.cors_origins.iter().filter_map(|origin| origin.parse().ok()).collect();
        layer.allow_origin(origins)
    }
}
