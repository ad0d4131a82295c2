use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;

/// Value kind of a product attribute declared by a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    Text,
    Number,
    Select,
    Boolean,
}

/// Product spec template carried by a category. The hierarchy engine stores
/// these verbatim and never interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttributeTemplate {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AttributeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub required: bool,
}

/// Database model for category
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: String,
    pub banner_image: Option<String>,
    pub is_featured: bool,
    pub is_parent: bool,
    pub depth: i32,
    /// Ancestor ids, root first, excluding the category itself
    pub path: Vec<Uuid>,
    pub attribute_templates: Json<Vec<AttributeTemplate>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// The category's own banner, ignoring empty strings
    pub fn own_banner(&self) -> Option<&str> {
        self.banner_image.as_deref().filter(|b| !b.trim().is_empty())
    }
}

/// Write model for inserting a category. Derived fields are computed by the
/// service before the draft reaches a repository.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: String,
    pub banner_image: Option<String>,
    pub is_featured: bool,
    pub is_parent: bool,
    pub depth: i32,
    pub path: Vec<Uuid>,
    pub attribute_templates: Vec<AttributeTemplate>,
}

/// Filter for the admin listing
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    /// Case-insensitive substring matched against the name
    pub search: Option<String>,
    pub offset: i64,
    /// `None` fetches every matching record
    pub limit: Option<i64>,
}

/// One page of the admin listing with its range metadata
#[derive(Debug, Clone, Default)]
pub struct CategoryPage {
    pub records: Vec<Category>,
    pub total_pages: i64,
    pub total_records: i64,
    /// 1-based index of the first record on the page, 0 when empty
    pub range_start: i64,
    /// 1-based index of the last record on the page, 0 when empty
    pub range_end: i64,
}

impl CategoryPage {
    pub fn new(records: Vec<Category>, total_records: i64, offset: i64, limit: Option<i64>) -> Self {
        let total_pages = match limit {
            Some(limit) if limit > 0 => (total_records + limit - 1) / limit,
            _ if total_records > 0 => 1,
            _ => 0,
        };

        let len = records.len() as i64;
        let (range_start, range_end) = if len == 0 {
            (0, 0)
        } else {
            (offset + 1, offset + len)
        };

        Self {
            records,
            total_pages,
            total_records,
            range_start,
            range_end,
        }
    }
}
