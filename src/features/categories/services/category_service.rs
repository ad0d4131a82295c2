use std::collections::HashMap;
use std::sync::Arc;

use sqlx::types::Json;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{
    AdminCategoryQueryParams, CategoryResponseDto, CategoryTreeDto, CreateCategoryDto,
    EffectiveBannerDto, UpdateCategoryDto,
};
use crate::features::categories::models::{AttributeTemplate, Category, CategoryPage, NewCategory};
use crate::features::categories::repositories::CategoryRepository;
use crate::features::categories::services::banner_resolver;
use crate::features::categories::services::hierarchy::{
    cascade_placements, ensure_acyclic, Placement,
};
use crate::shared::constants::{DEFAULT_FEATURED_LIMIT, MAX_FEATURED_LIMIT, RESERVED_SLUGS};

/// Service for category operations.
///
/// The only writer of category records. Every mutation fetches what it needs,
/// runs all checks, and only then hands a complete write to the repository.
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

fn validation_error(e: validator::ValidationErrors) -> AppError {
    AppError::Validation(e.to_string())
}

fn validate_templates(templates: &[AttributeTemplate]) -> Result<()> {
    if templates.iter().any(|t| t.name.trim().is_empty()) {
        return Err(AppError::Validation(
            "Attribute template names must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Trimmed name; whitespace alone does not count as a name
fn required_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Slugs that collide with static storefront routes
fn ensure_slug_not_reserved(slug: &str) -> Result<()> {
    if RESERVED_SLUGS.contains(&slug) {
        return Err(AppError::Validation(format!("Slug '{}' is reserved", slug)));
    }
    Ok(())
}

/// Empty strings from form inputs mean "no value"
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl CategoryService {
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Get category by id
    pub async fn get_by_id(&self, id: Uuid) -> Result<Category> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", id)))
    }

    /// Get category by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<Category> {
        self.repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", slug)))
    }

    /// List all categories (flat list)
    pub async fn list(&self) -> Result<Vec<CategoryResponseDto>> {
        let categories = self.repo.list_all().await?;
        Ok(categories.into_iter().map(Into::into).collect())
    }

    /// List all categories as tree structure
    pub async fn list_tree(&self) -> Result<Vec<CategoryTreeDto>> {
        let categories = self.repo.list_all().await?;
        Ok(CategoryTreeDto::build_tree(&categories))
    }

    /// Direct children of the category with the given slug
    pub async fn children_of(&self, slug: &str) -> Result<Vec<CategoryResponseDto>> {
        let category = self.get_by_slug(slug).await?;
        let children = self.repo.list_children(category.id).await?;
        Ok(children.into_iter().map(Into::into).collect())
    }

    /// Ancestors of the category with the given slug, root first
    pub async fn ancestors(&self, slug: &str) -> Result<Vec<CategoryResponseDto>> {
        let category = self.get_by_slug(slug).await?;
        let mut found: HashMap<Uuid, Category> = self
            .repo
            .find_by_ids(&category.path)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        // Follow the stored path order; ancestors that vanished are skipped.
        Ok(category
            .path
            .iter()
            .filter_map(|id| found.remove(id))
            .map(Into::into)
            .collect())
    }

    /// Paged (or unbounded) admin listing with range metadata
    pub async fn list_for_admin(&self, params: &AdminCategoryQueryParams) -> Result<CategoryPage> {
        let filter = params.to_filter();
        let (records, total) = self.repo.search(&filter).await?;

        tracing::debug!(
            "Admin category listing: search={:?}, offset={}, limit={:?}, returned={}, total={}",
            filter.search,
            filter.offset,
            filter.limit,
            records.len(),
            total
        );

        Ok(CategoryPage::new(records, total, filter.offset, filter.limit))
    }

    /// Top-level categories, featured first, then most recently updated
    pub async fn list_featured(&self, limit: Option<i64>) -> Result<Vec<CategoryResponseDto>> {
        let limit = limit
            .unwrap_or(DEFAULT_FEATURED_LIMIT)
            .clamp(1, MAX_FEATURED_LIMIT);
        let categories = self.repo.list_top_level_featured(limit).await?;
        Ok(categories.into_iter().map(Into::into).collect())
    }

    /// Resolve the banner a category displays, inheriting from ancestors
    pub async fn resolve_banner(&self, category: &Category) -> Option<String> {
        banner_resolver::effective_banner(category, |id| {
            let repo = Arc::clone(&self.repo);
            async move { repo.find_by_id(id).await }
        })
        .await
    }

    /// Effective banner of the category with the given slug
    pub async fn effective_banner(&self, slug: &str) -> Result<EffectiveBannerDto> {
        let category = self.get_by_slug(slug).await?;
        let banner_image = self.resolve_banner(&category).await;

        Ok(EffectiveBannerDto {
            category_id: category.id,
            inherited: category.own_banner().is_none() && banner_image.is_some(),
            banner_image,
        })
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Create a category under an optional parent
    pub async fn create(&self, dto: CreateCategoryDto) -> Result<Category> {
        dto.validate().map_err(validation_error)?;
        let name = required_name(&dto.name)?;
        ensure_slug_not_reserved(&dto.slug)?;
        validate_templates(&dto.attribute_templates)?;

        let parent = match dto.parent_id {
            Some(parent_id) => Some(self.repo.find_by_id(parent_id).await?.ok_or_else(|| {
                AppError::NotFound(format!("Parent category '{}' not found", parent_id))
            })?),
            None => None,
        };

        if self.repo.find_by_slug(&dto.slug).await?.is_some() {
            return Err(AppError::DuplicateSlug(format!(
                "Slug '{}' is already in use",
                dto.slug
            )));
        }

        let placement = Placement::for_parent(parent.as_ref());
        let category = self
            .repo
            .insert(NewCategory {
                id: Uuid::now_v7(),
                parent_id: dto.parent_id,
                name,
                slug: dto.slug,
                description: non_blank(dto.description),
                image: dto.image,
                banner_image: non_blank(dto.banner_image),
                is_featured: dto.is_featured,
                is_parent: placement.is_parent,
                depth: placement.depth,
                path: placement.path,
                attribute_templates: dto.attribute_templates,
            })
            .await?;

        tracing::info!(
            "Category created: id={}, slug={}, depth={}",
            category.id,
            category.slug,
            category.depth
        );

        Ok(category)
    }

    /// Update a category; moving it re-places every descendant in the same write
    pub async fn update(&self, id: Uuid, dto: UpdateCategoryDto) -> Result<Category> {
        dto.validate().map_err(validation_error)?;
        let name = dto.name.as_deref().map(required_name).transpose()?;
        if let Some(slug) = dto.slug.as_deref() {
            ensure_slug_not_reserved(slug)?;
        }
        if let Some(templates) = dto.attribute_templates.as_deref() {
            validate_templates(templates)?;
        }

        let existing = self.get_by_id(id).await?;

        if let Some(slug) = dto.slug.as_deref() {
            if slug != existing.slug {
                if let Some(other) = self.repo.find_by_slug(slug).await? {
                    if other.id != id {
                        return Err(AppError::DuplicateSlug(format!(
                            "Slug '{}' is already in use",
                            slug
                        )));
                    }
                }
            }
        }

        let mut updated = existing.clone();

        if let Some(parent_id) = dto.parent_id {
            let parent = match parent_id {
                Some(parent_id) => {
                    let candidate = self.repo.find_by_id(parent_id).await?.ok_or_else(|| {
                        AppError::NotFound(format!("Parent category '{}' not found", parent_id))
                    })?;
                    ensure_acyclic(id, &candidate)?;
                    Some(candidate)
                }
                None => None,
            };

            updated.parent_id = parent_id;
            Placement::for_parent(parent.as_ref()).apply_to(&mut updated);
        }

        if let Some(name) = name {
            updated.name = name;
        }
        if let Some(slug) = dto.slug {
            updated.slug = slug;
        }
        if let Some(image) = dto.image {
            updated.image = image;
        }
        if let Some(banner_image) = dto.banner_image {
            updated.banner_image = non_blank(banner_image);
        }
        if let Some(description) = dto.description {
            updated.description = non_blank(description);
        }
        if let Some(is_featured) = dto.is_featured {
            updated.is_featured = is_featured;
        }
        if let Some(templates) = dto.attribute_templates {
            updated.attribute_templates = Json(templates);
        }

        let moved = updated.path != existing.path;
        let descendants = if moved {
            let current = self.repo.list_descendants(id).await?;
            cascade_placements(&updated, &current)
        } else {
            Vec::new()
        };

        let stored = self.repo.update_subtree(&updated, &descendants).await?;

        if moved {
            tracing::info!(
                "Category moved: id={}, parent={:?}, depth={}, descendants_updated={}",
                stored.id,
                stored.parent_id,
                stored.depth,
                descendants.len()
            );
        } else {
            tracing::info!("Category updated: id={}, slug={}", stored.id, stored.slug);
        }

        Ok(stored)
    }

    /// Delete a category that has no children
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let category = self.get_by_id(id).await?;

        if self.repo.has_children(id).await? {
            return Err(AppError::HasChildren(format!(
                "Category '{}' still has child categories",
                category.slug
            )));
        }

        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound(format!("Category '{}' not found", id)));
        }

        tracing::info!("Category deleted: id={}, slug={}", id, category.slug);
        Ok(())
    }
}
