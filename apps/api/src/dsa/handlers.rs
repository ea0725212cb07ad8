//! Axum route handlers for the DSA sheet API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::dsa::filter::{build_view, DsaView, Filter, FilterState};
use crate::dsa::models::Catalog;
use crate::errors::AppError;
use crate::preferences::favorites::ToggleAction;
use crate::preferences::sync::SyncStatus;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    pub user_id: String,
    /// Overrides the session's search text for this request and updates it.
    pub search: Option<String>,
    pub favorites_only: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFiltersRequest {
    pub user_id: String,
    pub filter: Option<Filter>,
    pub search: Option<String>,
    pub favorites_only: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct FiltersResponse {
    pub state: FilterState,
    pub sync: SyncStatus,
}

#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleFavoriteRequest {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct ToggleFavoriteResponse {
    pub item_id: String,
    pub action: ToggleAction,
    pub favorites: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProgressUpdate {
    pub user_id: String,
    pub completed: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/dsa/catalog
pub async fn handle_get_catalog(State(state): State<AppState>) -> Json<Catalog> {
    Json(state.catalog.as_ref().clone())
}

/// GET /api/v1/dsa/view
///
/// Filtered topics/companies for the user's current selection, with favorites and
/// progress overlaid.
pub async fn handle_get_view(
    State(state): State<AppState>,
    Query(params): Query<ViewQuery>,
) -> Result<Json<DsaView>, AppError> {
    require_user_id(&params.user_id)?;
    let session = state.sessions.get_or_load(&params.user_id).await?;

    if let Some(search) = params.search {
        session.set_search(search).await;
    }
    if let Some(favorites_only) = params.favorites_only {
        session.set_favorites_only(favorites_only).await;
    }

    let filter_state = session.state().await;
    let favorites = session.favorites().await;
    let completed = state
        .sessions
        .store()
        .get_completed_problems(&params.user_id)
        .await?;

    Ok(Json(build_view(
        &state.catalog,
        &filter_state,
        &favorites,
        &completed,
    )))
}

/// GET /api/v1/dsa/filters
pub async fn handle_get_filters(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<FiltersResponse>, AppError> {
    require_user_id(&params.user_id)?;
    let session = state.sessions.get_or_load(&params.user_id).await?;
    Ok(Json(FiltersResponse {
        state: session.state().await,
        sync: session.sync_status(),
    }))
}

/// PUT /api/v1/dsa/filters
///
/// Applies the change immediately to the session; the filter itself is persisted
/// after the debounce quiet period.
pub async fn handle_update_filters(
    State(state): State<AppState>,
    Json(req): Json<UpdateFiltersRequest>,
) -> Result<Json<FiltersResponse>, AppError> {
    require_user_id(&req.user_id)?;
    if let Some(filter) = &req.filter {
        validate_filter(&state.catalog, filter)?;
    }

    let session = state.sessions.get_or_load(&req.user_id).await?;
    if let Some(filter) = req.filter {
        session.set_filter(filter).await;
    }
    if let Some(search) = req.search {
        session.set_search(search).await;
    }
    if let Some(favorites_only) = req.favorites_only {
        session.set_favorites_only(favorites_only).await;
    }

    Ok(Json(FiltersResponse {
        state: session.state().await,
        sync: session.sync_status(),
    }))
}

/// GET /api/v1/dsa/favorites
pub async fn handle_get_favorites(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<FavoritesResponse>, AppError> {
    require_user_id(&params.user_id)?;
    let session = state.sessions.get_or_load(&params.user_id).await?;
    Ok(Json(FavoritesResponse {
        favorites: sorted(session.favorites().await),
    }))
}

/// POST /api/v1/dsa/favorites/:item_id/toggle
pub async fn handle_toggle_favorite(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(req): Json<ToggleFavoriteRequest>,
) -> Result<Json<ToggleFavoriteResponse>, AppError> {
    require_user_id(&req.user_id)?;
    if !state.catalog.contains_item(&item_id) {
        return Err(AppError::NotFound(format!("Item {item_id} not found")));
    }

    let session = state.sessions.get_or_load(&req.user_id).await?;
    let action = session
        .toggle_favorite(state.sessions.store(), &item_id)
        .await?;

    Ok(Json(ToggleFavoriteResponse {
        item_id,
        action,
        favorites: sorted(session.favorites().await),
    }))
}

/// PUT /api/v1/dsa/progress/:problem_id
pub async fn handle_set_progress(
    State(state): State<AppState>,
    Path(problem_id): Path<String>,
    Json(req): Json<ProgressUpdate>,
) -> Result<StatusCode, AppError> {
    require_user_id(&req.user_id)?;
    if !state.catalog.contains_problem(&problem_id) {
        return Err(AppError::NotFound(format!("Problem {problem_id} not found")));
    }

    state
        .sessions
        .store()
        .set_problem_completed(&req.user_id, &problem_id, req.completed)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

fn require_user_id(user_id: &str) -> Result<(), AppError> {
    if user_id.trim().is_empty() {
        return Err(AppError::Validation("user_id cannot be empty".to_string()));
    }
    Ok(())
}

fn validate_filter(catalog: &Catalog, filter: &Filter) -> Result<(), AppError> {
    let unknown: Vec<&str> = filter
        .companies
        .iter()
        .filter(|id| !catalog.companies.iter().any(|c| &c.id == *id))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        return Err(AppError::Validation(format!(
            "Unknown companies in filter: {}",
            unknown.join(", ")
        )));
    }
    Ok(())
}

fn sorted(ids: std::collections::HashSet<String>) -> Vec<String> {
    let mut ids: Vec<String> = ids.into_iter().collect();
    ids.sort();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_filter_rejects_unknown_company() {
        let catalog = Catalog::load(None).unwrap();
        let mut filter = Filter::default();
        filter.companies.insert("google".to_string());
        assert!(validate_filter(&catalog, &filter).is_ok());

        filter.companies.insert("initech".to_string());
        let err = validate_filter(&catalog, &filter).unwrap_err();
        assert!(err.to_string().contains("initech"));
    }

    #[test]
    fn test_blank_user_id_rejected() {
        assert!(require_user_id("   ").is_err());
        assert!(require_user_id("u1").is_ok());
    }
}
