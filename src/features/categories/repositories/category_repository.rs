use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::categories::models::{Category, CategoryFilter, NewCategory};

/// Storage seam for category records.
///
/// Implementations persist exactly what they are given: derived fields are
/// computed by `CategoryService`. Each write method is atomic.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// Records for the given ids, in no particular order. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Category>>;

    /// Every record, ordered by name
    async fn list_all(&self) -> Result<Vec<Category>>;

    /// Direct children of a category, ordered by name
    async fn list_children(&self, parent_id: Uuid) -> Result<Vec<Category>>;

    async fn has_children(&self, id: Uuid) -> Result<bool>;

    /// Records whose materialized path contains `id`
    async fn list_descendants(&self, id: Uuid) -> Result<Vec<Category>>;

    /// Filtered page ordered by most recently updated, plus the total match count
    async fn search(&self, filter: &CategoryFilter) -> Result<(Vec<Category>, i64)>;

    /// Top-level records, featured first, then most recently updated
    async fn list_top_level_featured(&self, limit: i64) -> Result<Vec<Category>>;

    async fn insert(&self, category: NewCategory) -> Result<Category>;

    /// Writes `node` in full and the placement of each of `descendants` in a
    /// single transaction. Returns the stored node.
    async fn update_subtree(&self, node: &Category, descendants: &[Category])
        -> Result<Category>;

    /// Returns `false` when no record had the id
    async fn delete(&self, id: Uuid) -> Result<bool>;
}
