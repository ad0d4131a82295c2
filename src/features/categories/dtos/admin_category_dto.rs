use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::categories::dtos::CategoryResponseDto;
use crate::features::categories::models::{CategoryFilter, CategoryPage};
use crate::features::categories::services::{RenderMode, TreeRow};
use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

// =============================================================================
// LISTING
// =============================================================================

/// Query params for the admin category listing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AdminCategoryQueryParams {
    /// Case-insensitive substring matched against the name
    pub search: Option<String>,
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    /// Return every matching record instead of a page
    #[serde(default)]
    pub fetch_all: bool,
}

impl Default for AdminCategoryQueryParams {
    fn default() -> Self {
        Self {
            search: None,
            page: default_page(),
            page_size: default_page_size(),
            fetch_all: false,
        }
    }
}

impl AdminCategoryQueryParams {
    pub fn offset(&self) -> i64 {
        if self.fetch_all {
            0
        } else {
            (self.page.max(1) - 1).saturating_mul(self.limit())
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// Trimmed search term, `None` when blank
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn to_filter(&self) -> CategoryFilter {
        CategoryFilter {
            search: self.search_term().map(str::to_string),
            offset: self.offset(),
            limit: (!self.fetch_all).then(|| self.limit()),
        }
    }
}

/// Admin listing response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminCategoryListDto {
    pub records: Vec<CategoryResponseDto>,
    pub total_pages: i64,
    pub total_records: i64,
    pub range_start: i64,
    pub range_end: i64,
}

impl From<CategoryPage> for AdminCategoryListDto {
    fn from(page: CategoryPage) -> Self {
        Self {
            records: page.records.into_iter().map(Into::into).collect(),
            total_pages: page.total_pages,
            total_records: page.total_records,
            range_start: page.range_start,
            range_end: page.range_end,
        }
    }
}

// =============================================================================
// TREE VIEW
// =============================================================================

/// Query params for the admin hierarchy view
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AdminTreeViewQuery {
    pub search: Option<String>,
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    #[serde(default)]
    pub fetch_all: bool,
    /// Comma-separated ids of expanded nodes
    pub expanded: Option<String>,
}

impl AdminTreeViewQuery {
    pub fn expanded_ids(&self) -> Result<Vec<Uuid>, AppError> {
        self.expanded
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                Uuid::parse_str(s)
                    .map_err(|_| AppError::BadRequest(format!("Invalid expanded id '{}'", s)))
            })
            .collect()
    }
}

/// One rendered row of the admin hierarchy view
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminTreeRowDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    /// Stored depth of the category
    pub depth: i32,
    /// Indentation level in this rendering
    pub level: i32,
    /// Whether children are present in the fetched records
    pub has_children: bool,
    pub is_expanded: bool,
    pub is_featured: bool,
    pub effective_banner: Option<String>,
}

impl AdminTreeRowDto {
    pub fn from_row(row: TreeRow, effective_banner: Option<String>) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            depth: row.depth,
            level: row.level,
            has_children: row.has_children,
            is_expanded: row.is_expanded,
            is_featured: row.is_featured,
            effective_banner,
        }
    }
}

/// Admin hierarchy view response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminTreeViewDto {
    pub mode: RenderMode,
    pub search: Option<String>,
    pub page: i64,
    pub page_size: i64,
    pub fetch_all: bool,
    pub total_pages: i64,
    pub total_records: i64,
    pub range_start: i64,
    pub range_end: i64,
    pub expanded: Vec<Uuid>,
    pub rows: Vec<AdminTreeRowDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_and_limit() {
        let params = AdminCategoryQueryParams {
            page: 3,
            page_size: 500,
            ..Default::default()
        };
        assert_eq!(params.limit(), MAX_PAGE_SIZE);
        assert_eq!(params.offset(), 2 * MAX_PAGE_SIZE);

        let fetch_all = AdminCategoryQueryParams {
            page: 3,
            fetch_all: true,
            ..Default::default()
        };
        let filter = fetch_all.to_filter();
        assert_eq!(filter.offset, 0);
        assert_eq!(filter.limit, None);
    }

    #[test]
    fn test_huge_page_saturates_offset() {
        let params = AdminCategoryQueryParams {
            page: i64::MAX,
            ..Default::default()
        };
        assert_eq!(params.offset(), i64::MAX);
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let params = AdminCategoryQueryParams {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(params.search_term(), None);
        assert_eq!(params.to_filter().search, None);
    }

    #[test]
    fn test_expanded_ids_parsing() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let query = AdminTreeViewQuery {
            search: None,
            page: 1,
            page_size: 10,
            fetch_all: false,
            expanded: Some(format!("{}, {},", a, b)),
        };
        assert_eq!(query.expanded_ids().unwrap(), vec![a, b]);

        let bad = AdminTreeViewQuery {
            expanded: Some("not-a-uuid".to_string()),
            ..query
        };
        assert!(matches!(bad.expanded_ids(), Err(AppError::BadRequest(_))));
    }
}
