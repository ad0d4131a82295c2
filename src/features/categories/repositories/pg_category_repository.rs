use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::{Category, CategoryFilter, NewCategory};
use crate::features::categories::repositories::CategoryRepository;

/// Postgres SQLSTATE for foreign key violations
const FOREIGN_KEY_VIOLATION: &str = "23503";

macro_rules! category_columns {
    () => {
        "id, parent_id, name, slug, description, image, banner_image, is_featured, \
         is_parent, depth, path, attribute_templates, created_at, updated_at"
    };
}

/// Escapes LIKE metacharacters so user input matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// PostgreSQL-backed category repository
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>> {
        sqlx::query_as::<_, Category>(concat!(
            "SELECT ",
            category_columns!(),
            " FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get category by id: {:?}", e);
            AppError::from(e)
        })
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        sqlx::query_as::<_, Category>(concat!(
            "SELECT ",
            category_columns!(),
            " FROM categories WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get category by slug: {:?}", e);
            AppError::from(e)
        })
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Category>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, Category>(concat!(
            "SELECT ",
            category_columns!(),
            " FROM categories WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get categories by ids: {:?}", e);
            AppError::from(e)
        })
    }

    async fn list_all(&self) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(concat!(
            "SELECT ",
            category_columns!(),
            " FROM categories ORDER BY name, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::from(e)
        })
    }

    async fn list_children(&self, parent_id: Uuid) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(concat!(
            "SELECT ",
            category_columns!(),
            " FROM categories WHERE parent_id = $1 ORDER BY name, id"
        ))
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list child categories: {:?}", e);
            AppError::from(e)
        })
    }

    async fn has_children(&self, id: Uuid) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM categories WHERE parent_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check for child categories: {:?}", e);
            AppError::from(e)
        })
    }

    async fn list_descendants(&self, id: Uuid) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(concat!(
            "SELECT ",
            category_columns!(),
            " FROM categories WHERE $1 = ANY(path) ORDER BY depth, name"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list descendant categories: {:?}", e);
            AppError::from(e)
        })
    }

    async fn search(&self, filter: &CategoryFilter) -> Result<(Vec<Category>, i64)> {
        let pattern = filter
            .search
            .as_deref()
            .map(|s| format!("%{}%", escape_like(s)));

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM categories
            WHERE ($1::text IS NULL OR name ILIKE $1 ESCAPE '\')
            "#,
        )
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count categories: {:?}", e);
            AppError::from(e)
        })?;

        // LIMIT NULL means no limit in Postgres.
        let records = sqlx::query_as::<_, Category>(concat!(
            "SELECT ",
            category_columns!(),
            r#"
            FROM categories
            WHERE ($1::text IS NULL OR name ILIKE $1 ESCAPE '\')
            ORDER BY updated_at DESC, name
            OFFSET $2 LIMIT $3
            "#
        ))
        .bind(pattern.as_deref())
        .bind(filter.offset)
        .bind(filter.limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to search categories: {:?}", e);
            AppError::from(e)
        })?;

        Ok((records, total))
    }

    async fn list_top_level_featured(&self, limit: i64) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(concat!(
            "SELECT ",
            category_columns!(),
            r#"
            FROM categories
            WHERE parent_id IS NULL
            ORDER BY is_featured DESC, updated_at DESC
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list featured categories: {:?}", e);
            AppError::from(e)
        })
    }

    async fn insert(&self, category: NewCategory) -> Result<Category> {
        sqlx::query_as::<_, Category>(concat!(
            r#"
            INSERT INTO categories (
                id, parent_id, name, slug, description, image, banner_image,
                is_featured, is_parent, depth, path, attribute_templates
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING "#,
            category_columns!()
        ))
        .bind(category.id)
        .bind(category.parent_id)
        .bind(&category.name)
        .bind(&category.slug)
        .bind(category.description.as_deref())
        .bind(&category.image)
        .bind(category.banner_image.as_deref())
        .bind(category.is_featured)
        .bind(category.is_parent)
        .bind(category.depth)
        .bind(category.path.as_slice())
        .bind(Json(&category.attribute_templates))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert category: {:?}", e);
            AppError::from(e)
        })
    }

    async fn update_subtree(
        &self,
        node: &Category,
        descendants: &[Category],
    ) -> Result<Category> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin category update transaction: {:?}", e);
            AppError::from(e)
        })?;

        let updated = sqlx::query_as::<_, Category>(concat!(
            r#"
            UPDATE categories
            SET parent_id = $2, name = $3, slug = $4, description = $5, image = $6,
                banner_image = $7, is_featured = $8, is_parent = $9, depth = $10,
                path = $11, attribute_templates = $12, updated_at = NOW()
            WHERE id = $1
            RETURNING "#,
            category_columns!()
        ))
        .bind(node.id)
        .bind(node.parent_id)
        .bind(&node.name)
        .bind(&node.slug)
        .bind(node.description.as_deref())
        .bind(&node.image)
        .bind(node.banner_image.as_deref())
        .bind(node.is_featured)
        .bind(node.is_parent)
        .bind(node.depth)
        .bind(node.path.as_slice())
        .bind(&node.attribute_templates)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update category: {:?}", e);
            AppError::from(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", node.id)))?;

        for descendant in descendants {
            sqlx::query(
                r#"
                UPDATE categories
                SET depth = $2, path = $3, is_parent = $4, updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(descendant.id)
            .bind(descendant.depth)
            .bind(descendant.path.as_slice())
            .bind(descendant.is_parent)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to cascade placement to descendant: {:?}", e);
                AppError::from(e)
            })?;
        }

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit category update: {:?}", e);
            AppError::from(e)
        })?;

        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                // A child inserted after the service-level check trips the FK.
                if let sqlx::Error::Database(ref db_err) = e {
                    if db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) {
                        return AppError::HasChildren(
                            "Category still has child categories".to_string(),
                        );
                    }
                }
                tracing::error!("Failed to delete category: {:?}", e);
                AppError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("tvs"), "tvs");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
    }
}
