use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use futures::future::join_all;
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::categories::dtos::{
    AdminCategoryListDto, AdminCategoryQueryParams, AdminTreeRowDto, AdminTreeViewDto,
    AdminTreeViewQuery, CategoryResponseDto, CreateCategoryDto, UpdateCategoryDto,
};
use crate::features::categories::services::{AdminTreeController, CategoryService};
use crate::shared::types::{ApiResponse, Meta};

/// List categories for the admin console (paginated or fetch-all)
#[utoipa::path(
    get,
    path = "/api/admin/categories",
    params(AdminCategoryQueryParams),
    responses(
        (status = 200, description = "Page of categories, most recently updated first", body = ApiResponse<AdminCategoryListDto>),
        (status = 400, description = "Invalid query parameters"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin-categories",
    security(
        ("basic_auth" = [])
    )
)]
pub async fn list_categories(
    State(service): State<Arc<CategoryService>>,
    AppQuery(params): AppQuery<AdminCategoryQueryParams>,
) -> Result<Json<ApiResponse<AdminCategoryListDto>>> {
    let page = service.list_for_admin(&params).await?;
    let total = page.total_records;

    Ok(Json(ApiResponse::success(
        Some(page.into()),
        None,
        Some(Meta { total }),
    )))
}

/// Rendered hierarchy rows for the admin console
///
/// Without a search the rows start at top-level categories and descend into
/// the `expanded` ids. With a search every match is listed at its own depth
/// and counts as expanded.
#[utoipa::path(
    get,
    path = "/api/admin/categories/tree-view",
    params(AdminTreeViewQuery),
    responses(
        (status = 200, description = "Rendered rows with listing metadata", body = ApiResponse<AdminTreeViewDto>),
        (status = 400, description = "Invalid query parameters"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin-categories",
    security(
        ("basic_auth" = [])
    )
)]
pub async fn tree_view(
    State(service): State<Arc<CategoryService>>,
    AppQuery(query): AppQuery<AdminTreeViewQuery>,
) -> Result<Json<ApiResponse<AdminTreeViewDto>>> {
    let mut controller =
        AdminTreeController::new(query.page_size).with_expanded(query.expanded_ids()?);
    // Each transition supersedes the previous ticket; only the last is run.
    controller.set_query(query.search.as_deref().unwrap_or_default());
    controller.set_fetch_all(query.fetch_all);
    let ticket = controller.set_page(query.page);
    controller.load(&service, ticket).await?;

    let rows = controller.render();
    let banners = join_all(rows.iter().map(|row| {
        let category = controller.record(row.id);
        let service = &service;
        async move {
            match category {
                Some(category) => service.resolve_banner(category).await,
                None => None,
            }
        }
    }))
    .await;

    let (total_pages, total_records, range_start, range_end) = controller
        .listing()
        .map(|l| (l.total_pages, l.total_records, l.range_start, l.range_end))
        .unwrap_or_default();

    let view = AdminTreeViewDto {
        mode: controller.mode(),
        search: (!controller.query().is_empty()).then(|| controller.query().to_string()),
        page: controller.page(),
        page_size: controller.page_size(),
        fetch_all: controller.fetch_all(),
        total_pages,
        total_records,
        range_start,
        range_end,
        expanded: controller.expanded_ids(),
        rows: rows
            .into_iter()
            .zip(banners)
            .map(|(row, banner)| AdminTreeRowDto::from_row(row, banner))
            .collect(),
    };

    Ok(Json(ApiResponse::success(
        Some(view),
        None,
        Some(Meta {
            total: total_records,
        }),
    )))
}

/// Get category by id
#[utoipa::path(
    get,
    path = "/api/admin/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Category found", body = ApiResponse<CategoryResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Category not found")
    ),
    tag = "admin-categories",
    security(
        ("basic_auth" = [])
    )
)]
pub async fn get_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(category.into()), None, None)))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Parent category not found"),
        (status = 409, description = "Slug already in use")
    ),
    tag = "admin-categories",
    security(
        ("basic_auth" = [])
    )
)]
pub async fn create_category(
    State(service): State<Arc<CategoryService>>,
    AppJson(dto): AppJson<CreateCategoryDto>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponseDto>>)> {
    let category = service.create(dto).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(category.into()),
            Some("Category created successfully".to_string()),
            None,
        )),
    ))
}

/// Update a category
///
/// Moving a category (changing `parentId`) re-places all of its descendants.
#[utoipa::path(
    patch,
    path = "/api/admin/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category id")
    ),
    request_body = UpdateCategoryDto,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Category or parent not found"),
        (status = 409, description = "Slug already in use"),
        (status = 422, description = "Move would create a cycle")
    ),
    tag = "admin-categories",
    security(
        ("basic_auth" = [])
    )
)]
pub async fn update_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateCategoryDto>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = service.update(id, dto).await?;

    Ok(Json(ApiResponse::success(
        Some(category.into()),
        Some("Category updated successfully".to_string()),
        None,
    )))
}

/// Delete a category without children
#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category still has children")
    ),
    tag = "admin-categories",
    security(
        ("basic_auth" = [])
    )
)]
pub async fn delete_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;

    Ok(Json(ApiResponse::success(
        None,
        Some("Category deleted successfully".to_string()),
        None,
    )))
}
