use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppQuery;
use crate::features::categories::dtos::{
    CategoryResponseDto, EffectiveBannerDto, FeaturedCategoriesQuery, ListCategoriesQuery,
};
use crate::features::categories::services::CategoryService;
use crate::shared::types::{ApiResponse, Meta};

fn to_value<T: serde::Serialize>(value: T) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.to_string()))
}

/// List all categories
///
/// Returns categories as flat list or tree structure based on `tree` query param.
/// The storefront never fails on this call: errors are logged and an empty
/// list is returned.
#[utoipa::path(
    get,
    path = "/api/categories",
    params(ListCategoriesQuery),
    responses(
        (status = 200, description = "Flat list, or nested tree when tree=true", body = ApiResponse<Vec<CategoryResponseDto>>),
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(service): State<Arc<CategoryService>>,
    AppQuery(query): AppQuery<ListCategoriesQuery>,
) -> Json<ApiResponse<serde_json::Value>> {
    let listing = if query.tree {
        service.list_tree().await.and_then(to_value)
    } else {
        service.list().await.and_then(to_value)
    };

    let value = listing.unwrap_or_else(|e| {
        tracing::warn!("Category listing degraded to empty: {}", e);
        serde_json::Value::Array(Vec::new())
    });

    Json(ApiResponse::success(Some(value), None, None))
}

/// List featured top-level categories
///
/// Featured first, then most recently updated. Degrades to an empty list.
#[utoipa::path(
    get,
    path = "/api/categories/featured",
    params(FeaturedCategoriesQuery),
    responses(
        (status = 200, description = "Top-level categories, featured first", body = ApiResponse<Vec<CategoryResponseDto>>),
    ),
    tag = "categories"
)]
pub async fn list_featured_categories(
    State(service): State<Arc<CategoryService>>,
    AppQuery(query): AppQuery<FeaturedCategoriesQuery>,
) -> Json<ApiResponse<Vec<CategoryResponseDto>>> {
    let categories = service.list_featured(query.limit).await.unwrap_or_else(|e| {
        tracing::warn!("Featured categories degraded to empty: {}", e);
        Vec::new()
    });
    let total = categories.len() as i64;

    Json(ApiResponse::success(
        Some(categories),
        None,
        Some(Meta { total }),
    ))
}

/// Get category by slug
#[utoipa::path(
    get,
    path = "/api/categories/{slug}",
    params(
        ("slug" = String, Path, description = "Category slug")
    ),
    responses(
        (status = 200, description = "Category found", body = ApiResponse<CategoryResponseDto>),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn get_category(
    State(service): State<Arc<CategoryService>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = service.get_by_slug(&slug).await?;
    Ok(Json(ApiResponse::success(Some(category.into()), None, None)))
}

/// Direct children of a category
#[utoipa::path(
    get,
    path = "/api/categories/{slug}/children",
    params(
        ("slug" = String, Path, description = "Category slug")
    ),
    responses(
        (status = 200, description = "Child categories ordered by name", body = ApiResponse<Vec<CategoryResponseDto>>),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn list_children(
    State(service): State<Arc<CategoryService>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let children = service.children_of(&slug).await?;
    Ok(Json(ApiResponse::success(Some(children), None, None)))
}

/// Breadcrumb of a category, root first
#[utoipa::path(
    get,
    path = "/api/categories/{slug}/ancestors",
    params(
        ("slug" = String, Path, description = "Category slug")
    ),
    responses(
        (status = 200, description = "Ancestors from the root down to the parent", body = ApiResponse<Vec<CategoryResponseDto>>),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn list_ancestors(
    State(service): State<Arc<CategoryService>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let ancestors = service.ancestors(&slug).await?;
    Ok(Json(ApiResponse::success(Some(ancestors), None, None)))
}

/// Banner a category displays, inherited from the nearest ancestor when unset
#[utoipa::path(
    get,
    path = "/api/categories/{slug}/banner",
    params(
        ("slug" = String, Path, description = "Category slug")
    ),
    responses(
        (status = 200, description = "Effective banner, bannerImage is null when none", body = ApiResponse<EffectiveBannerDto>),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn get_effective_banner(
    State(service): State<Arc<CategoryService>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<EffectiveBannerDto>>> {
    let banner = service.effective_banner(&slug).await?;
    Ok(Json(ApiResponse::success(Some(banner), None, None)))
}
