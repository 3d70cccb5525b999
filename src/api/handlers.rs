//! HTTP API handlers for pet CRUD operations.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::{ApiError, Result};
use crate::metrics;
use crate::model::{parse_new_pet, parse_pet_patch, Pet, TraitInput};
use crate::store::{CreatePet, PetChanges, PetStore};

use super::pagination::{check_page, page_offset, Page};

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Storage layer.
    pub store: PetStore,
    /// Pets per page on the list endpoint.
    pub page_size: u32,
    /// Prometheus render handle, when the exporter is installed.
    pub prometheus: Option<PrometheusHandle>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Query parameters for the list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// 1-based page number. Kept as a string so that non-numeric values
    /// map to the invalid-page response rather than a generic 400.
    pub page: Option<String>,
    /// Case-insensitive trait-name filter.
    #[serde(rename = "trait")]
    pub trait_name: Option<String>,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Prometheus exposition handler.
pub async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.prometheus {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics exporter not installed").into_response(),
    }
}

/// Resolve-or-create every supplied trait, deduplicating repeats within
/// one request (case-insensitive, so "Fluffy" and "FLUFFY" collapse).
async fn resolve_traits(store: &PetStore, inputs: &[TraitInput]) -> Result<Vec<i64>> {
    let mut ids = Vec::with_capacity(inputs.len());
    for input in inputs {
        let (tr, created) = store.get_or_create_trait(&input.name).await?;
        if created {
            metrics::inc_traits_created();
        }
        if !ids.contains(&tr.id) {
            ids.push(tr.id);
        }
    }
    Ok(ids)
}

/// Create a pet (POST /pets), resolving or creating its group and traits.
pub async fn create_pet(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse> {
    let new_pet = parse_new_pet(&body).map_err(ApiError::Validation)?;

    let (group, group_created) = state.store.get_or_create_group(&new_pet.group).await?;
    if group_created {
        metrics::inc_groups_created();
    }
    let trait_ids = resolve_traits(&state.store, &new_pet.traits).await?;

    let pet_id = state
        .store
        .create_pet(CreatePet {
            name: new_pet.name,
            age: new_pet.age,
            weight: new_pet.weight,
            sex: new_pet.sex,
            group_id: group.id,
            trait_ids,
        })
        .await?;

    let pet = state
        .store
        .get_pet(pet_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    metrics::inc_pets_created();
    info!(pet_id, "pet created");
    Ok((StatusCode::CREATED, Json(pet)))
}

/// List pets (GET /pets), optionally filtered by trait, paginated by
/// page number and ordered by id ascending.
pub async fn list_pets(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<Pet>>> {
    let page = match params.page.as_deref() {
        None => 1,
        Some(raw) => raw.parse::<u32>().map_err(|_| ApiError::InvalidPage)?,
    };

    let count = state.store.count_pets(params.trait_name.clone()).await?;
    check_page(page, count, state.page_size)?;

    let results = state
        .store
        .list_pets(
            params.trait_name,
            page_offset(page, state.page_size),
            state.page_size,
        )
        .await?;

    Ok(Json(Page::new(page, count, state.page_size, results)))
}

/// Retrieve a pet (GET /pets/{id}).
pub async fn get_pet(State(state): State<AppState>, Path(pet_id): Path<i64>) -> Result<Json<Pet>> {
    let pet = state
        .store
        .get_pet(pet_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(pet))
}

/// Delete a pet (DELETE /pets/{id}); its group and trait rows stay.
pub async fn delete_pet(
    State(state): State<AppState>,
    Path(pet_id): Path<i64>,
) -> Result<StatusCode> {
    if !state.store.delete_pet(pet_id).await? {
        return Err(ApiError::NotFound);
    }
    metrics::inc_pets_deleted();
    info!(pet_id, "pet deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Partially update a pet (PATCH /pets/{id}).
///
/// A supplied group is resolved-or-created and reassigned; a supplied
/// trait list replaces the pet's entire trait set; remaining scalars are
/// set directly. Validation happens before any write, so a bad payload
/// leaves the record untouched.
pub async fn update_pet(
    State(state): State<AppState>,
    Path(pet_id): Path<i64>,
    Json(body): Json<Value>,
) -> Result<Json<Pet>> {
    if state.store.get_pet(pet_id).await?.is_none() {
        return Err(ApiError::NotFound);
    }

    let patch = parse_pet_patch(&body).map_err(ApiError::Validation)?;

    let mut changes = PetChanges {
        name: patch.name,
        age: patch.age,
        weight: patch.weight,
        sex: patch.sex,
        group_id: None,
        trait_ids: None,
    };
    if let Some(group) = &patch.group {
        let (group, created) = state.store.get_or_create_group(group).await?;
        if created {
            metrics::inc_groups_created();
        }
        changes.group_id = Some(group.id);
    }
    if let Some(traits) = &patch.traits {
        changes.trait_ids = Some(resolve_traits(&state.store, traits).await?);
    }

    state.store.update_pet(pet_id, changes).await?;
    let pet = state
        .store
        .get_pet(pet_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    metrics::inc_pets_updated();
    info!(pet_id, "pet updated");
    Ok(Json(pet))
}
