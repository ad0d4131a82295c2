//! Structural rules of the category tree.
//!
//! These are the only places `depth`, `path` and `is_parent` are computed.
//! Everything here is a plain function of already-fetched records so the
//! store can validate a whole mutation before writing anything.

use std::collections::{HashSet, VecDeque};

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::Category;
use crate::features::categories::services::tree_builder::TreeBuilder;

/// Derived position of a category in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub depth: i32,
    pub path: Vec<Uuid>,
    pub is_parent: bool,
}

impl Placement {
    pub fn root() -> Self {
        Self {
            depth: 0,
            path: Vec::new(),
            is_parent: true,
        }
    }

    pub fn under(parent: &Category) -> Self {
        let mut path = Vec::with_capacity(parent.path.len() + 1);
        path.extend_from_slice(&parent.path);
        path.push(parent.id);

        Self {
            depth: parent.depth + 1,
            path,
            is_parent: false,
        }
    }

    pub fn for_parent(parent: Option<&Category>) -> Self {
        parent.map_or_else(Self::root, Self::under)
    }

    pub fn apply_to(self, category: &mut Category) {
        category.depth = self.depth;
        category.path = self.path;
        category.is_parent = self.is_parent;
    }

    fn matches(&self, category: &Category) -> bool {
        self.depth == category.depth
            && self.path == category.path
            && self.is_parent == category.is_parent
    }
}

/// Rejects moving `node_id` under `candidate` when the candidate is the node
/// itself or one of its descendants.
pub fn ensure_acyclic(node_id: Uuid, candidate: &Category) -> Result<()> {
    if candidate.id == node_id {
        return Err(AppError::Cycle(
            "A category cannot be its own parent".to_string(),
        ));
    }

    if candidate.path.contains(&node_id) {
        return Err(AppError::Cycle(format!(
            "Category '{}' is a descendant of the category being moved",
            candidate.slug
        )));
    }

    Ok(())
}

/// Recomputes the placement of every descendant of `moved`, breadth first,
/// each from its (possibly just recomputed) parent.
///
/// `descendants` are the currently stored records whose `path` contains
/// `moved.id`. Only records whose placement actually changed are returned, in
/// the order they were visited. Records that cannot be reached through
/// `parent_id` links from `moved` are left untouched.
pub fn cascade_placements(moved: &Category, descendants: &[Category]) -> Vec<Category> {
    let children = TreeBuilder::build(descendants);
    let mut changed = Vec::new();
    let mut visited: HashSet<Uuid> = HashSet::from([moved.id]);
    let mut queue: VecDeque<(Uuid, i32, Vec<Uuid>)> =
        VecDeque::from([(moved.id, moved.depth, moved.path.clone())]);

    while let Some((parent_id, parent_depth, parent_path)) = queue.pop_front() {
        for child in children.children_of(parent_id) {
            if !visited.insert(child.id) {
                continue;
            }

            let mut path = parent_path.clone();
            path.push(parent_id);
            let placement = Placement {
                depth: parent_depth + 1,
                path,
                is_parent: false,
            };

            queue.push_back((child.id, placement.depth, placement.path.clone()));

            if !placement.matches(child) {
                let mut updated = (*child).clone();
                placement.apply_to(&mut updated);
                changed.push(updated);
            }
        }
    }

    let unreachable = (descendants.len() + 1).saturating_sub(visited.len());
    if unreachable > 0 {
        tracing::warn!(
            "Cascade from category {} skipped {} record(s) not linked by parent_id",
            moved.id,
            unreachable
        );
    }

    changed
}
