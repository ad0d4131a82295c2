use std::future::Future;

use uuid::Uuid;

use crate::core::error::Result;
use crate::features::categories::models::Category;

/// Resolves the effective banner of a category: its own banner if set,
/// otherwise the nearest ancestor's.
///
/// Walks parent links one fetch per hop, at most `category.depth` hops, so a
/// corrupted ancestry can never make it loop. Missing ancestors and fetch
/// failures resolve to `None` instead of an error.
pub async fn effective_banner<F, Fut>(category: &Category, mut fetch_by_id: F) -> Option<String>
where
    F: FnMut(Uuid) -> Fut,
    Fut: Future<Output = Result<Option<Category>>>,
{
    if let Some(banner) = category.own_banner() {
        return Some(banner.to_string());
    }

    let max_hops = usize::try_from(category.depth).unwrap_or(0);
    let mut next_parent = category.parent_id;

    for _ in 0..max_hops {
        let parent_id = next_parent?;

        let parent = match fetch_by_id(parent_id).await {
            Ok(Some(parent)) => parent,
            Ok(None) => {
                tracing::warn!(
                    "Ancestor {} of category {} is missing; no banner inherited",
                    parent_id,
                    category.id
                );
                return None;
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to fetch ancestor {} of category {}: {}",
                    parent_id,
                    category.id,
                    e
                );
                return None;
            }
        };

        if let Some(banner) = parent.own_banner() {
            return Some(banner.to_string());
        }
        next_parent = parent.parent_id;
    }

    if next_parent.is_some() {
        tracing::warn!(
            "Banner lookup for category {} stopped after {} hops without reaching a root",
            category.id,
            max_hops
        );
    }

    None
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::core::error::AppError;
    use crate::shared::test_helpers::record;

    fn lookup(records: &[Category]) -> HashMap<Uuid, Category> {
        records.iter().map(|c| (c.id, c.clone())).collect()
    }

    #[tokio::test]
    async fn test_own_banner_wins() {
        let mut electronics = record("Electronics", None);
        electronics.banner_image = Some("https://cdn.test/electronics.png".to_string());
        let mut tvs = record("TVs", Some(&electronics));
        tvs.banner_image = Some("https://cdn.test/tvs.png".to_string());

        let store = lookup(&[electronics]);
        let banner = effective_banner(&tvs, |id| {
            let found = store.get(&id).cloned();
            async move { Ok(found) }
        })
        .await;

        assert_eq!(banner.as_deref(), Some("https://cdn.test/tvs.png"));
    }

    #[tokio::test]
    async fn test_inherits_nearest_ancestor_banner() {
        let mut electronics = record("Electronics", None);
        electronics.banner_image = Some("https://cdn.test/electronics.png".to_string());
        let tvs = record("TVs", Some(&electronics));
        let mut oled = record("OLED", Some(&tvs));
        oled.banner_image = Some("   ".to_string());

        let store = lookup(&[electronics, tvs]);
        let banner = effective_banner(&oled, |id| {
            let found = store.get(&id).cloned();
            async move { Ok(found) }
        })
        .await;

        assert_eq!(banner.as_deref(), Some("https://cdn.test/electronics.png"));
    }

    #[tokio::test]
    async fn test_no_banner_anywhere_is_none() {
        let electronics = record("Electronics", None);
        let tvs = record("TVs", Some(&electronics));

        let store = lookup(&[electronics]);
        let banner = effective_banner(&tvs, |id| {
            let found = store.get(&id).cloned();
            async move { Ok(found) }
        })
        .await;

        assert_eq!(banner, None);
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_none() {
        let electronics = record("Electronics", None);
        let tvs = record("TVs", Some(&electronics));

        let banner = effective_banner(&tvs, |_| async {
            Err(AppError::Internal("storage offline".to_string()))
        })
        .await;

        assert_eq!(banner, None);
    }

    #[tokio::test]
    async fn test_corrupt_cycle_is_bounded_by_depth() {
        let mut a = record("A", None);
        let mut b = record("B", Some(&a));
        // Corrupt ancestry: A and B point at each other.
        a.parent_id = Some(b.id);
        a.depth = 1;
        b.depth = 1;

        let store = lookup(&[a, b.clone()]);
        let fetches = AtomicUsize::new(0);
        let banner = effective_banner(&b, |id| {
            fetches.fetch_add(1, Ordering::SeqCst);
            let found = store.get(&id).cloned();
            async move { Ok(found) }
        })
        .await;

        assert_eq!(banner, None);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }
}
