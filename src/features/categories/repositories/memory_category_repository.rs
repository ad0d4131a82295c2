use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::types::Json;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::{Category, CategoryFilter, NewCategory};
use crate::features::categories::repositories::CategoryRepository;

#[derive(Default)]
struct Inner {
    records: HashMap<Uuid, Category>,
    last_stamp: Option<DateTime<Utc>>,
}

impl Inner {
    /// Strictly increasing write timestamps, so "most recently updated"
    /// ordering is total even for writes within one clock tick.
    fn stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }

    fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> bool {
        self.records
            .values()
            .any(|c| c.slug == slug && Some(c.id) != except)
    }
}

fn by_name(a: &Category, b: &Category) -> std::cmp::Ordering {
    a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id))
}

/// Process-local category repository.
///
/// Writers are serialised behind one lock and enforce the same constraints
/// the Postgres schema does (unique slug, existing parent, restrict delete).
#[derive(Default)]
pub struct MemoryCategoryRepository {
    inner: RwLock<Inner>,
}

impl MemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryRepository for MemoryCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>> {
        Ok(self.inner.read().await.records.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let inner = self.inner.read().await;
        Ok(inner.records.values().find(|c| c.slug == slug).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Category>> {
        let inner = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| inner.records.get(id).cloned())
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Category>> {
        let inner = self.inner.read().await;
        let mut records: Vec<Category> = inner.records.values().cloned().collect();
        records.sort_by(by_name);
        Ok(records)
    }

    async fn list_children(&self, parent_id: Uuid) -> Result<Vec<Category>> {
        let inner = self.inner.read().await;
        let mut records: Vec<Category> = inner
            .records
            .values()
            .filter(|c| c.parent_id == Some(parent_id))
            .cloned()
            .collect();
        records.sort_by(by_name);
        Ok(records)
    }

    async fn has_children(&self, id: Uuid) -> Result<bool> {
        let inner = self.inner.read().await;
        Ok(inner.records.values().any(|c| c.parent_id == Some(id)))
    }

    async fn list_descendants(&self, id: Uuid) -> Result<Vec<Category>> {
        let inner = self.inner.read().await;
        let mut records: Vec<Category> = inner
            .records
            .values()
            .filter(|c| c.path.contains(&id))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| by_name(a, b)));
        Ok(records)
    }

    async fn search(&self, filter: &CategoryFilter) -> Result<(Vec<Category>, i64)> {
        let needle = filter.search.as_deref().map(str::to_lowercase);
        let inner = self.inner.read().await;

        let mut matches: Vec<Category> = inner
            .records
            .values()
            .filter(|c| {
                needle
                    .as_deref()
                    .map_or(true, |n| c.name.to_lowercase().contains(n))
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.name.cmp(&b.name))
        });

        let total = matches.len() as i64;
        let offset = usize::try_from(filter.offset.max(0)).unwrap_or(usize::MAX);
        let page = matches.into_iter().skip(offset);
        let records = match filter.limit {
            Some(limit) => page.take(usize::try_from(limit.max(0)).unwrap_or(0)).collect(),
            None => page.collect(),
        };

        Ok((records, total))
    }

    async fn list_top_level_featured(&self, limit: i64) -> Result<Vec<Category>> {
        let inner = self.inner.read().await;
        let mut records: Vec<Category> = inner
            .records
            .values()
            .filter(|c| c.parent_id.is_none())
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            b.is_featured
                .cmp(&a.is_featured)
                .then_with(|| b.updated_at.cmp(&a.updated_at))
        });
        records.truncate(usize::try_from(limit.max(0)).unwrap_or(0));
        Ok(records)
    }

    async fn insert(&self, category: NewCategory) -> Result<Category> {
        let mut inner = self.inner.write().await;

        if inner.slug_taken(&category.slug, None) {
            return Err(AppError::DuplicateSlug(format!(
                "Slug '{}' is already in use",
                category.slug
            )));
        }
        if let Some(parent_id) = category.parent_id {
            if !inner.records.contains_key(&parent_id) {
                return Err(AppError::NotFound(format!(
                    "Parent category '{}' not found",
                    parent_id
                )));
            }
        }

        let stamp = inner.stamp();
        let stored = Category {
            id: category.id,
            parent_id: category.parent_id,
            name: category.name,
            slug: category.slug,
            description: category.description,
            image: category.image,
            banner_image: category.banner_image,
            is_featured: category.is_featured,
            is_parent: category.is_parent,
            depth: category.depth,
            path: category.path,
            attribute_templates: Json(category.attribute_templates),
            created_at: stamp,
            updated_at: stamp,
        };
        inner.records.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn update_subtree(
        &self,
        node: &Category,
        descendants: &[Category],
    ) -> Result<Category> {
        let mut inner = self.inner.write().await;

        if !inner.records.contains_key(&node.id) {
            return Err(AppError::NotFound(format!(
                "Category '{}' not found",
                node.id
            )));
        }
        if inner.slug_taken(&node.slug, Some(node.id)) {
            return Err(AppError::DuplicateSlug(format!(
                "Slug '{}' is already in use",
                node.slug
            )));
        }
        if let Some(parent_id) = node.parent_id {
            if !inner.records.contains_key(&parent_id) {
                return Err(AppError::NotFound(format!(
                    "Parent category '{}' not found",
                    parent_id
                )));
            }
        }

        // All checks passed; apply every change under the same guard.
        let stamp = inner.stamp();
        let mut stored = node.clone();
        stored.updated_at = stamp;
        if let Some(existing) = inner.records.get(&node.id) {
            stored.created_at = existing.created_at;
        }
        inner.records.insert(stored.id, stored.clone());

        for descendant in descendants {
            if let Some(record) = inner.records.get_mut(&descendant.id) {
                record.depth = descendant.depth;
                record.path = descendant.path.clone();
                record.is_parent = descendant.is_parent;
                record.updated_at = stamp;
            }
        }

        Ok(stored)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut inner = self.inner.write().await;

        if inner.records.values().any(|c| c.parent_id == Some(id)) {
            return Err(AppError::HasChildren(
                "Category still has child categories".to_string(),
            ));
        }

        Ok(inner.records.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::new_category;

    #[tokio::test]
    async fn test_insert_enforces_unique_slug() {
        let repo = MemoryCategoryRepository::new();
        repo.insert(new_category("TVs", "tvs", None)).await.unwrap();

        let err = repo
            .insert(new_category("Televisions", "tvs", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateSlug(_)));
    }

    #[tokio::test]
    async fn test_write_stamps_strictly_increase() {
        let repo = MemoryCategoryRepository::new();
        let a = repo.insert(new_category("A", "a", None)).await.unwrap();
        let b = repo.insert(new_category("B", "b", None)).await.unwrap();

        assert!(b.updated_at > a.updated_at);
    }

    #[tokio::test]
    async fn test_search_pages_and_counts() {
        let repo = MemoryCategoryRepository::new();
        for (name, slug) in [("Phones", "phones"), ("Phone Cases", "phone-cases"), ("TVs", "tvs")] {
            repo.insert(new_category(name, slug, None)).await.unwrap();
        }

        let filter = CategoryFilter {
            search: Some("PHONE".to_string()),
            offset: 1,
            limit: Some(10),
        };
        let (records, total) = repo.search(&filter).await.unwrap();

        assert_eq!(total, 2);
        assert_eq!(records.len(), 1);
        // Most recently updated first, so the page skips "Phone Cases".
        assert_eq!(records[0].slug, "phones");
    }
}
