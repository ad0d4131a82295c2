use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::categories::models::{AttributeTemplate, Category};
use crate::features::categories::services::TreeBuilder;
use crate::shared::types::deserialize_present;
use crate::shared::validation::SLUG_REGEX;

/// Request DTO for creating a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryDto {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(
        length(min = 1, max = 255, message = "Slug must be 1-255 characters"),
        regex(
            path = *SLUG_REGEX,
            message = "Slug must be lowercase alphanumeric segments separated by single hyphens"
        )
    )]
    pub slug: String,

    /// Parent category; omit for a top-level category
    pub parent_id: Option<Uuid>,

    /// Image URL returned by the upload service
    #[validate(length(min = 1, message = "Image is required"))]
    pub image: String,

    pub banner_image: Option<String>,

    #[serde(default)]
    pub is_featured: bool,

    #[validate(length(max = 5000, message = "Description must not exceed 5000 characters"))]
    pub description: Option<String>,

    #[serde(default)]
    pub attribute_templates: Vec<AttributeTemplate>,
}

/// Request DTO for updating a category. Omitted fields are left unchanged;
/// `parentId`, `bannerImage` and `description` accept `null` to clear.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryDto {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(
        length(min = 1, max = 255, message = "Slug must be 1-255 characters"),
        regex(
            path = *SLUG_REGEX,
            message = "Slug must be lowercase alphanumeric segments separated by single hyphens"
        )
    )]
    pub slug: Option<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<Uuid>)]
    pub parent_id: Option<Option<Uuid>>,

    #[validate(length(min = 1, message = "Image must not be empty"))]
    pub image: Option<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub banner_image: Option<Option<String>>,

    pub is_featured: Option<bool>,

    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,

    pub attribute_templates: Option<Vec<AttributeTemplate>>,
}

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponseDto {
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            parent_id: c.parent_id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            image: c.image,
            banner_image: c.banner_image,
            is_featured: c.is_featured,
            is_parent: c.is_parent,
            depth: c.depth,
            path: c.path,
            attribute_templates: c.attribute_templates.0,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Response DTO for category tree (hierarchical structure)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(no_recursion)]
pub struct CategoryTreeDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub image: String,
    pub banner_image: Option<String>,
    pub is_featured: bool,
    pub depth: i32,
    pub children: Vec<CategoryTreeDto>,
}

impl CategoryTreeDto {
    /// Build tree from flat list of categories.
    ///
    /// Sibling order follows input order. Nodes are assembled bottom-up from
    /// an explicit pre-order, so deep trees do not grow the call stack and
    /// records caught in a corrupt parent cycle are never reached from a root.
    pub fn build_tree(categories: &[Category]) -> Vec<CategoryTreeDto> {
        let children = TreeBuilder::build(categories);

        let mut order: Vec<&Category> = Vec::with_capacity(categories.len());
        let mut visited: HashSet<Uuid> = HashSet::with_capacity(categories.len());
        let mut stack: Vec<&Category> = children.roots().iter().rev().copied().collect();

        while let Some(node) = stack.pop() {
            if !visited.insert(node.id) {
                continue;
            }
            order.push(node);
            stack.extend(children.children_of(node.id).iter().rev().copied());
        }

        let mut built: HashMap<Uuid, CategoryTreeDto> = HashMap::with_capacity(order.len());
        for node in order.into_iter().rev() {
            let node_children = children
                .children_of(node.id)
                .iter()
                .filter_map(|child| built.remove(&child.id))
                .collect();
            built.insert(node.id, Self::from_node(node, node_children));
        }

        children
            .roots()
            .iter()
            .filter_map(|root| built.remove(&root.id))
            .collect()
    }

    fn from_node(category: &Category, children: Vec<CategoryTreeDto>) -> CategoryTreeDto {
        CategoryTreeDto {
            id: category.id,
            name: category.name.clone(),
            slug: category.slug.clone(),
            image: category.image.clone(),
            banner_image: category.banner_image.clone(),
            is_featured: category.is_featured,
            depth: category.depth,
            children,
        }
    }
}

/// Effective banner of a category after inheritance
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveBannerDto {
    pub category_id: Uuid,
    /// `null` when neither the category nor any ancestor has a banner
    pub banner_image: Option<String>,
    /// True when the banner comes from an ancestor
    pub inherited: bool,
}

/// Query params for listing categories
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListCategoriesQuery {
    /// If true, return tree structure. Default: false (flat list)
    #[serde(default)]
    pub tree: bool,
}

/// Query params for the featured listing
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeaturedCategoriesQuery {
    /// Maximum number of categories (default: 8, max: 100)
    #[param(minimum = 1, maximum = 100)]
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::shared::test_helpers::record;

    #[test]
    fn test_build_tree_nests_children_in_input_order() {
        let electronics = record("Electronics", None);
        let tvs = record("TVs", Some(&electronics));
        let phones = record("Phones", Some(&electronics));
        let oled = record("OLED", Some(&tvs));
        let garden = record("Garden", None);

        let tree = CategoryTreeDto::build_tree(&[
            oled.clone(),
            electronics.clone(),
            tvs.clone(),
            garden.clone(),
            phones.clone(),
        ]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].id, electronics.id);
        assert_eq!(tree[1].id, garden.id);

        let electronics_children: Vec<Uuid> = tree[0].children.iter().map(|c| c.id).collect();
        assert_eq!(electronics_children, vec![tvs.id, phones.id]);
        assert_eq!(tree[0].children[0].children[0].id, oled.id);
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn test_build_tree_ignores_corrupt_cycles() {
        let mut a = record("A", None);
        let mut b = record("B", Some(&a));
        a.parent_id = Some(b.id);
        b.parent_id = Some(a.id);
        let root = record("Root", None);

        let tree = CategoryTreeDto::build_tree(&[a, b, root.clone()]);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, root.id);
    }

    #[test]
    fn test_update_dto_distinguishes_null_from_absent() {
        let absent: UpdateCategoryDto = serde_json::from_str(r#"{"name":"TVs"}"#).unwrap();
        assert_eq!(absent.parent_id, None);

        let cleared: UpdateCategoryDto = serde_json::from_str(r#"{"parentId":null}"#).unwrap();
        assert_eq!(cleared.parent_id, Some(None));

        let id = Uuid::now_v7();
        let set: UpdateCategoryDto =
            serde_json::from_str(&format!(r#"{{"parentId":"{}"}}"#, id)).unwrap();
        assert_eq!(set.parent_id, Some(Some(id)));
    }

    #[test]
    fn test_create_dto_validation() {
        let mut dto = CreateCategoryDto {
            name: "TVs".to_string(),
            slug: "tvs".to_string(),
            parent_id: None,
            image: "https://cdn.test/tvs.png".to_string(),
            banner_image: None,
            is_featured: false,
            description: None,
            attribute_templates: Vec::new(),
        };
        assert_ok!(dto.validate());

        dto.slug = "Bad Slug".to_string();
        assert_err!(dto.validate());

        dto.slug = "tvs".to_string();
        dto.image = String::new();
        assert_err!(dto.validate());
    }
}
