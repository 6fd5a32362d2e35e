use crate::api::error::ApiError;
use crate::api::registry::{API_CLIENTS, ENTITIES, PROPERTIES};
use crate::api::state::AppState;
use crate::domain::model::{
    ApiClient, ClientId, NewApiClient, PropertyAddress, PropertyFilter, PropertyRecord, RecordId,
};
use crate::utils::error::LookupError;
use crate::utils::validation::Validate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;

pub async fn health() -> &'static str {
    "OK"
}

/// `GET /has-septic?address=...&zipcode=...`
pub async fn has_septic(
    State(state): State<AppState>,
    Query(address): Query<PropertyAddress>,
) -> Result<Json<Value>, LookupError> {
    let septic = state.lookup.has_septic(&address).await?;
    Ok(Json(json!({ "septic": septic })))
}

pub async fn index(Extension(caller): Extension<ApiClient>) -> Json<Value> {
    let entities: serde_json::Map<String, Value> = ENTITIES
        .iter()
        .map(|entity| (entity.name.to_string(), json!(entity.path)))
        .collect();

    Json(json!({
        "client": caller.name,
        "entities": entities,
    }))
}

/// API client as shown to callers. The secret never leaves the service.
#[derive(Debug, Serialize)]
pub struct ApiClientSummary {
    pub id: ClientId,
    pub name: String,
    pub credential_id: String,
    pub host: String,
    pub path: String,
}

impl From<ApiClient> for ApiClientSummary {
    fn from(client: ApiClient) -> Self {
        Self {
            id: client.id,
            name: client.name,
            credential_id: client.credential_id,
            host: client.host,
            path: client.path,
        }
    }
}

pub async fn list_clients(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<ApiClientSummary>>, ApiError> {
    API_CLIENTS
        .check_filters(params.keys().map(String::as_str))
        .map_err(ApiError::InvalidRequest)?;

    let clients = state.store().clients().list().await?;
    Ok(Json(clients.into_iter().map(Into::into).collect()))
}

pub async fn create_client(
    State(state): State<AppState>,
    Json(draft): Json<NewApiClient>,
) -> Result<impl IntoResponse, ApiError> {
    draft
        .validate()
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

    let client = state.store().clients().create(draft).await?;
    tracing::info!("✅ Registered API client #{} '{}'", client.id, client.name);
    Ok((StatusCode::CREATED, Json(ApiClientSummary::from(client))))
}

pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<ClientId>,
) -> Result<Json<ApiClientSummary>, ApiError> {
    state
        .store()
        .clients()
        .get(id)
        .await?
        .map(|client| Json(client.into()))
        .ok_or_else(|| ApiError::NotFound(format!("API client {} not found", id)))
}

pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<ClientId>,
    Json(draft): Json<NewApiClient>,
) -> Result<Json<ApiClientSummary>, ApiError> {
    draft
        .validate()
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

    let client = state.store().clients().update(id, draft).await?;
    tracing::info!("API client #{} updated", id);
    Ok(Json(client.into()))
}

pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<ClientId>,
) -> Result<StatusCode, ApiError> {
    if state.store().clients().delete(id).await? {
        tracing::info!("🗑️ API client #{} deleted", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("API client {} not found", id)))
    }
}

pub async fn list_properties(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    Query(filter): Query<PropertyFilter>,
) -> Result<Json<Vec<PropertyRecord>>, ApiError> {
    PROPERTIES
        .check_filters(params.keys().map(String::as_str))
        .map_err(ApiError::InvalidRequest)?;

    let records = state.store().properties().list(&filter).await?;
    tracing::debug!("Listing {} property records for {:?}", records.len(), filter);
    Ok(Json(records))
}

async fn load_property(state: &AppState, id: RecordId) -> Result<PropertyRecord, ApiError> {
    state
        .store()
        .properties()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("property {} not found", id)))
}

pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Json<PropertyRecord>, ApiError> {
    Ok(Json(load_property(&state, id).await?))
}

pub async fn delete_property(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<StatusCode, ApiError> {
    let record = load_property(&state, id).await?;
    state
        .store()
        .properties()
        .delete(&record.identifier)
        .await?;
    tracing::info!("🗑️ Property #{} ({}) deleted", id, record.identifier);
    Ok(StatusCode::NO_CONTENT)
}

/// Re-fetches a cached property from upstream and stores the result.
pub async fn refresh_property(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Json<PropertyRecord>, ApiError> {
    let record = load_property(&state, id).await?;
    let refreshed = state.lookup.refresh(record).await?;
    Ok(Json(refreshed))
}
