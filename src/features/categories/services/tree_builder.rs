use std::collections::HashMap;

use uuid::Uuid;

use crate::features::categories::models::Category;

/// Bucket key of the adjacency map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKey {
    /// Parentless categories
    Root,
    Node(Uuid),
}

impl From<Option<Uuid>> for NodeKey {
    fn from(parent_id: Option<Uuid>) -> Self {
        parent_id.map_or(NodeKey::Root, NodeKey::Node)
    }
}

/// Parent → ordered children adjacency map over borrowed records.
///
/// Built from whatever records were supplied. When the input is a single page
/// of a larger listing, a node's children that live on other pages are simply
/// absent: `children_of` answers for the given input only.
#[derive(Debug, Default)]
pub struct ChildrenMap<'a> {
    buckets: HashMap<NodeKey, Vec<&'a Category>>,
}

impl<'a> ChildrenMap<'a> {
    /// Children bucket for a key. `None` when the key never appeared in the
    /// input, either as a record or as a referenced parent.
    pub fn get(&self, key: NodeKey) -> Option<&[&'a Category]> {
        self.buckets.get(&key).map(Vec::as_slice)
    }

    pub fn children_of(&self, id: Uuid) -> &[&'a Category] {
        self.get(NodeKey::Node(id)).unwrap_or(&[])
    }

    pub fn roots(&self) -> &[&'a Category] {
        self.get(NodeKey::Root).unwrap_or(&[])
    }

    pub fn has_children(&self, id: Uuid) -> bool {
        !self.children_of(id).is_empty()
    }
}

/// Builds adjacency maps in a single linear pass over flat records
pub struct TreeBuilder;

impl TreeBuilder {
    /// Bucket order follows input order; pre-sort records for a stable display.
    pub fn build(records: &[Category]) -> ChildrenMap<'_> {
        let mut buckets: HashMap<NodeKey, Vec<&Category>> =
            HashMap::with_capacity(records.len() + 1);

        // Every record gets an addressable bucket so leaves answer with an
        // empty list rather than "unknown".
        buckets.insert(NodeKey::Root, Vec::new());
        for record in records {
            buckets.entry(NodeKey::Node(record.id)).or_default();
        }

        for record in records {
            buckets
                .entry(NodeKey::from(record.parent_id))
                .or_default()
                .push(record);
        }

        ChildrenMap { buckets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::record;

    fn ids(records: &[&Category]) -> Vec<Uuid> {
        records.iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_build_groups_children_by_parent() {
        let electronics = record("Electronics", None);
        let tvs = record("TVs", Some(&electronics));
        let phones = record("Phones", Some(&electronics));
        let oled = record("OLED", Some(&tvs));
        let records = vec![electronics.clone(), tvs.clone(), phones.clone(), oled.clone()];

        let map = TreeBuilder::build(&records);

        assert_eq!(ids(map.roots()), vec![electronics.id]);
        assert_eq!(ids(map.children_of(electronics.id)), vec![tvs.id, phones.id]);
        assert_eq!(ids(map.children_of(tvs.id)), vec![oled.id]);
        assert_eq!(map.get(NodeKey::Node(oled.id)), Some(&[][..]));
        assert!(!map.has_children(phones.id));
    }

    #[test]
    fn test_children_match_parent_regardless_of_input_order() {
        let electronics = record("Electronics", None);
        let tvs = record("TVs", Some(&electronics));
        let oled = record("OLED", Some(&tvs));
        let qled = record("QLED", Some(&tvs));

        let forward = vec![electronics.clone(), tvs.clone(), oled.clone(), qled.clone()];
        let backward: Vec<Category> = forward.iter().rev().cloned().collect();

        for records in [forward, backward] {
            let map = TreeBuilder::build(&records);
            let mut children = ids(map.children_of(tvs.id));
            children.sort();
            let mut expected: Vec<Uuid> = records
                .iter()
                .filter(|r| r.parent_id == Some(tvs.id))
                .map(|r| r.id)
                .collect();
            expected.sort();
            assert_eq!(children, expected);
        }
    }

    #[test]
    fn test_partial_input_only_reports_present_children() {
        let electronics = record("Electronics", None);
        let tvs = record("TVs", Some(&electronics));
        let phones = record("Phones", Some(&electronics));

        // A page that happens to contain only one of the two children.
        let page = vec![electronics.clone(), tvs.clone()];
        let map = TreeBuilder::build(&page);

        assert_eq!(ids(map.children_of(electronics.id)), vec![tvs.id]);
        assert!(map.get(NodeKey::Node(phones.id)).is_none());
    }

    #[test]
    fn test_orphan_parent_gets_bucket() {
        let electronics = record("Electronics", None);
        let tvs = record("TVs", Some(&electronics));

        let map = TreeBuilder::build(std::slice::from_ref(&tvs));

        assert!(map.roots().is_empty());
        assert_eq!(ids(map.children_of(electronics.id)), vec![tvs.id]);
    }
}
