use std::sync::Arc;

use chrono::Utc;
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use sqlx::types::Json;
use uuid::Uuid;

use crate::features::categories::dtos::CreateCategoryDto;
use crate::features::categories::models::{Category, NewCategory};
use crate::features::categories::repositories::MemoryCategoryRepository;
use crate::features::categories::services::hierarchy::Placement;
use crate::features::categories::services::CategoryService;

fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// A stored record placed under `parent`, slug derived from the name
pub fn record(name: &str, parent: Option<&Category>) -> Category {
    let placement = Placement::for_parent(parent);
    let now = Utc::now();

    Category {
        id: Uuid::now_v7(),
        parent_id: parent.map(|p| p.id),
        name: name.to_string(),
        slug: slugify(name),
        description: None,
        image: format!("https://cdn.test/{}.png", slugify(name)),
        banner_image: None,
        is_featured: false,
        is_parent: placement.is_parent,
        depth: placement.depth,
        path: placement.path,
        attribute_templates: Json(Vec::new()),
        created_at: now,
        updated_at: now,
    }
}

/// Repository input placed under `parent`
pub fn new_category(name: &str, slug: &str, parent: Option<&Category>) -> NewCategory {
    let placement = Placement::for_parent(parent);

    NewCategory {
        id: Uuid::now_v7(),
        parent_id: parent.map(|p| p.id),
        name: name.to_string(),
        slug: slug.to_string(),
        description: None,
        image: format!("https://cdn.test/{}.png", slug),
        banner_image: None,
        is_featured: false,
        is_parent: placement.is_parent,
        depth: placement.depth,
        path: placement.path,
        attribute_templates: Vec::new(),
    }
}

/// Valid create payload with a generated description
pub fn create_input(name: &str, slug: &str, parent_id: Option<Uuid>) -> CreateCategoryDto {
    CreateCategoryDto {
        name: name.to_string(),
        slug: slug.to_string(),
        parent_id,
        image: format!("https://cdn.test/{}.png", slug),
        banner_image: None,
        is_featured: false,
        description: Some(Sentence(3..8).fake()),
        attribute_templates: Vec::new(),
    }
}

pub fn memory_service() -> CategoryService {
    CategoryService::new(Arc::new(MemoryCategoryRepository::new()))
}
