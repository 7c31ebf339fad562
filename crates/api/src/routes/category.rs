//! Category routes.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use storekeep_core::{CategorySummary, CreateCategoryRequest, ProductListing};

use crate::db::{CategoryRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::services::ListByCategoryService;
use crate::state::AppState;

/// Query string of `GET /category/product`.
#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    /// Missing is treated like an unknown identifier.
    #[serde(default)]
    pub category_id: String,
}

/// Create a category.
#[instrument(skip(state, body), fields(user_id = %user_id))]
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategorySummary>)> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Category name is required".to_string()));
    }

    let category = CategoryRepository::new(state.pool()).create(name).await?;
    tracing::info!(category_id = %category.id, "category created");

    Ok((StatusCode::CREATED, Json(category.into())))
}

/// List every category.
#[instrument(skip(state, _user))]
pub async fn index(
    State(state): State<AppState>,
    _user: RequireUser,
) -> Result<Json<Vec<CategorySummary>>> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

/// Products of one category. Unknown identifiers yield `[]`.
#[instrument(skip(state, _user), fields(category_id = %query.category_id))]
pub async fn products(
    State(state): State<AppState>,
    _user: RequireUser,
    Query(query): Query<ProductsQuery>,
) -> Result<Json<Vec<ProductListing>>> {
    let store = ProductRepository::new(state.pool());
    let products = ListByCategoryService::new(&store)
        .execute(&query.category_id)
        .await?;

    Ok(Json(products))
}
