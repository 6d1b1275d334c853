use crate::api::AppState;
use crate::api::middleware::AuthUser;
use crate::api::schemas::items::{ItemResponse, ListItemsQuery, UpdateStatus};
use crate::error::{AppError, Result};
use crate::services::item_service::NewItem;
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use bytes::Bytes;
use uuid::Uuid;

/// Posts a new item: multipart metadata fields plus one `file` image part.
pub async fn create_item(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut title = None;
    let mut description = None;
    let mut category = None;
    let mut location = None;
    let mut contact_phone = None;
    let mut image: Option<(Bytes, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "title" => title = Some(read_text(field).await?),
            "description" => description = Some(read_text(field).await?),
            "category" => category = Some(read_text(field).await?),
            "location" => location = Some(read_text(field).await?),
            "contact_phone" => contact_phone = Some(read_text(field).await?),
            "file" => {
                let content_type = field.content_type().unwrap_or("").to_string();
                let data =
                    field.bytes().await.map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
                image = Some((data, content_type));
            }
            _ => {}
        }
    }

    let fields = NewItem {
        title: title.ok_or_else(|| missing("title"))?,
        description: description.ok_or_else(|| missing("description"))?,
        category: category.ok_or_else(|| missing("category"))?,
        location: location.ok_or_else(|| missing("location"))?,
        contact_phone: contact_phone.ok_or_else(|| missing("contact_phone"))?,
    };
    let (bytes, content_type) = image.ok_or_else(|| missing("file"))?;

    let owner = state.account_service.current_user(auth_user.user_id).await?;
    let item = state.item_service.create(&owner, fields, bytes, &content_type).await?;

    Ok((StatusCode::CREATED, Json(ItemResponse::from(item))))
}

pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ListItemsQuery>,
) -> Result<impl IntoResponse> {
    let items = state.item_service.list(query.category, query.search).await?;

    Ok(Json(items.into_iter().map(ItemResponse::from).collect::<Vec<_>>()))
}

pub async fn get_item(State(state): State<AppState>, Path(item_id): Path<Uuid>) -> Result<impl IntoResponse> {
    let item = state.item_service.get(item_id).await?;

    Ok(Json(ItemResponse::from(item)))
}

pub async fn update_status(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<UpdateStatus>,
) -> Result<impl IntoResponse> {
    let status = payload.status.parse()?;
    state.item_service.set_status(auth_user.user_id, item_id, status).await?;

    Ok(StatusCode::OK)
}

pub async fn list_user_items(State(state): State<AppState>, Path(user_id): Path<Uuid>) -> Result<impl IntoResponse> {
    let items = state.item_service.list_by_owner(user_id).await?;

    Ok(Json(items.into_iter().map(ItemResponse::from).collect::<Vec<_>>()))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field.text().await.map_err(|e| AppError::Validation(format!("Failed to read field: {e}")))
}

fn missing(name: &str) -> AppError {
    AppError::Validation(format!("Missing '{name}' field in multipart form"))
}
