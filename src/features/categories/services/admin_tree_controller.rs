use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::categories::dtos::AdminCategoryQueryParams;
use crate::features::categories::models::{Category, CategoryPage};
use crate::features::categories::services::tree_builder::{ChildrenMap, TreeBuilder};
use crate::features::categories::services::CategoryService;
use crate::shared::constants::MAX_PAGE_SIZE;

/// How fetched records are laid out as rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Search results, each at its own recorded depth
    Flat,
    /// Roots first, children nested under expanded nodes
    Hierarchical,
}

/// A fetch the controller wants performed. Only the response to the most
/// recently issued ticket is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub request_id: u64,
    pub params: AdminCategoryQueryParams,
}

/// One rendered row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub depth: i32,
    pub level: i32,
    pub has_children: bool,
    pub is_expanded: bool,
    pub is_featured: bool,
}

/// View state of the admin category hierarchy.
///
/// Every state change that needs new data returns a [`FetchTicket`]; the
/// caller runs it and hands the listing back through [`accept`]. Responses to
/// superseded tickets are dropped, so a slow earlier search can never
/// overwrite a newer one.
///
/// [`accept`]: AdminTreeController::accept
#[derive(Debug)]
pub struct AdminTreeController {
    page: i64,
    page_size: i64,
    query: String,
    fetch_all: bool,
    expanded: HashSet<Uuid>,
    mode: RenderMode,
    latest_request_id: u64,
    listing: Option<CategoryPage>,
}

impl AdminTreeController {
    pub fn new(page_size: i64) -> Self {
        Self {
            page: 1,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            query: String::new(),
            fetch_all: false,
            expanded: HashSet::new(),
            mode: RenderMode::Hierarchical,
            latest_request_id: 0,
            listing: None,
        }
    }

    /// Seeds the expanded set, e.g. from a client that keeps it across requests
    pub fn with_expanded(mut self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.expanded.extend(ids);
        self
    }

    // =========================================================================
    // STATE TRANSITIONS
    // =========================================================================

    pub fn set_query(&mut self, query: &str) -> FetchTicket {
        self.query = query.trim().to_string();
        self.page = 1;
        self.mode = if self.query.is_empty() {
            RenderMode::Hierarchical
        } else {
            RenderMode::Flat
        };
        self.issue()
    }

    pub fn set_fetch_all(&mut self, fetch_all: bool) -> FetchTicket {
        self.fetch_all = fetch_all;
        self.page = 1;
        self.issue()
    }

    pub fn set_page(&mut self, page: i64) -> FetchTicket {
        self.page = page.max(1);
        self.issue()
    }

    pub fn refresh(&mut self) -> FetchTicket {
        self.issue()
    }

    pub fn toggle_expand(&mut self, id: Uuid) {
        if !self.expanded.remove(&id) {
            self.expanded.insert(id);
        }
    }

    fn issue(&mut self) -> FetchTicket {
        self.latest_request_id += 1;
        FetchTicket {
            request_id: self.latest_request_id,
            params: AdminCategoryQueryParams {
                search: (!self.query.is_empty()).then(|| self.query.clone()),
                page: self.page,
                page_size: self.page_size,
                fetch_all: self.fetch_all,
            },
        }
    }

    /// Stores the listing if it answers the latest ticket. While searching,
    /// every returned record is expanded so matches show their children.
    pub fn accept(&mut self, request_id: u64, listing: CategoryPage) -> bool {
        if request_id != self.latest_request_id {
            tracing::warn!(
                "Dropping stale category listing: request_id={}, latest={}",
                request_id,
                self.latest_request_id
            );
            return false;
        }

        if !self.query.is_empty() {
            self.expanded.extend(listing.records.iter().map(|c| c.id));
        }

        self.listing = Some(listing);
        true
    }

    /// Runs a ticket against the service and accepts its result
    pub async fn load(&mut self, service: &CategoryService, ticket: FetchTicket) -> Result<bool> {
        let listing = service.list_for_admin(&ticket.params).await?;
        Ok(self.accept(ticket.request_id, listing))
    }

    // =========================================================================
    // RENDERING
    // =========================================================================

    pub fn render(&self) -> Vec<TreeRow> {
        let records = self.records();
        let children = TreeBuilder::build(records);

        match self.mode {
            RenderMode::Hierarchical => self.render_hierarchical(&children),
            RenderMode::Flat => self.render_flat(records, &children),
        }
    }

    fn render_hierarchical(&self, children: &ChildrenMap<'_>) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        let mut visited: HashSet<Uuid> = HashSet::new();
        let mut stack: Vec<(&Category, i32)> =
            children.roots().iter().rev().map(|c| (*c, 0)).collect();

        while let Some((node, level)) = stack.pop() {
            if !visited.insert(node.id) {
                continue;
            }
            rows.push(self.row(node, level, children));

            if self.expanded.contains(&node.id) {
                stack.extend(
                    children
                        .children_of(node.id)
                        .iter()
                        .rev()
                        .map(|c| (*c, level + 1)),
                );
            }
        }

        rows
    }

    fn render_flat(&self, records: &[Category], children: &ChildrenMap<'_>) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        let mut visited: HashSet<Uuid> = HashSet::new();

        for record in records {
            let mut stack: Vec<&Category> = vec![record];

            while let Some(node) = stack.pop() {
                if !visited.insert(node.id) {
                    continue;
                }
                rows.push(self.row(node, node.depth, children));

                if self.expanded.contains(&node.id) {
                    stack.extend(children.children_of(node.id).iter().rev().copied());
                }
            }
        }

        rows
    }

    fn row(&self, category: &Category, level: i32, children: &ChildrenMap<'_>) -> TreeRow {
        TreeRow {
            id: category.id,
            name: category.name.clone(),
            slug: category.slug.clone(),
            depth: category.depth,
            level,
            has_children: children.has_children(category.id),
            is_expanded: self.expanded.contains(&category.id),
            is_featured: category.is_featured,
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    fn records(&self) -> &[Category] {
        self.listing
            .as_ref()
            .map(|l| l.records.as_slice())
            .unwrap_or(&[])
    }

    /// A fetched record by id
    pub fn record(&self, id: Uuid) -> Option<&Category> {
        self.records().iter().find(|c| c.id == id)
    }

    pub fn is_expanded(&self, id: Uuid) -> bool {
        self.expanded.contains(&id)
    }

    /// Expanded ids in a stable order
    pub fn expanded_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self.expanded.iter().copied().collect();
        ids.sort();
        ids
    }

    pub fn listing(&self) -> Option<&CategoryPage> {
        self.listing.as_ref()
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn fetch_all(&self) -> bool {
        self.fetch_all
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{create_input, memory_service, record};

    fn page_of(records: Vec<Category>) -> CategoryPage {
        let total = records.len() as i64;
        CategoryPage::new(records, total, 0, None)
    }

    fn slugs(rows: &[TreeRow]) -> Vec<&str> {
        rows.iter().map(|r| r.slug.as_str()).collect()
    }

    #[test]
    fn test_toggle_expand_twice_is_identity() {
        let id = Uuid::now_v7();
        let mut controller = AdminTreeController::new(10);

        controller.toggle_expand(id);
        assert!(controller.is_expanded(id));
        controller.toggle_expand(id);
        assert!(!controller.is_expanded(id));
        assert!(controller.expanded_ids().is_empty());
    }

    #[test]
    fn test_set_query_selects_mode_and_resets_page() {
        let mut controller = AdminTreeController::new(10);
        controller.set_page(4);

        let ticket = controller.set_query("  tele  ");
        assert_eq!(controller.mode(), RenderMode::Flat);
        assert_eq!(ticket.params.page, 1);
        assert_eq!(ticket.params.search.as_deref(), Some("tele"));

        let ticket = controller.set_query("   ");
        assert_eq!(controller.mode(), RenderMode::Hierarchical);
        assert_eq!(ticket.params.search, None);
    }

    #[test]
    fn test_refresh_keeps_page_and_query() {
        let mut controller = AdminTreeController::new(25);
        controller.set_query("tv");
        let paged = controller.set_page(3);
        let refreshed = controller.refresh();

        assert_eq!(refreshed.params, paged.params);
        assert!(refreshed.request_id > paged.request_id);
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let electronics = record("Electronics", None);
        let garden = record("Garden", None);
        let mut controller = AdminTreeController::new(10);

        let first = controller.set_query("elec");
        let second = controller.set_query("gard");

        assert!(controller.accept(second.request_id, page_of(vec![garden.clone()])));
        assert!(!controller.accept(first.request_id, page_of(vec![electronics])));

        let rows = controller.render();
        assert_eq!(slugs(&rows), vec!["garden"]);
    }

    #[test]
    fn test_search_results_are_auto_expanded() {
        let electronics = record("Electronics", None);
        let tvs = record("TVs", Some(&electronics));
        let mut controller = AdminTreeController::new(10);

        let ticket = controller.set_query("e");
        controller.accept(ticket.request_id, page_of(vec![electronics.clone(), tvs.clone()]));

        assert!(controller.is_expanded(electronics.id));
        assert!(controller.is_expanded(tvs.id));
    }

    #[test]
    fn test_hierarchical_render_descends_only_into_expanded() {
        let electronics = record("Electronics", None);
        let tvs = record("TVs", Some(&electronics));
        let oled = record("OLED", Some(&tvs));
        let phones = record("Phones", Some(&electronics));
        let garden = record("Garden", None);
        let records = vec![
            electronics.clone(),
            tvs.clone(),
            oled.clone(),
            phones.clone(),
            garden.clone(),
        ];

        let mut controller = AdminTreeController::new(10);
        let ticket = controller.refresh();
        controller.accept(ticket.request_id, page_of(records));

        assert_eq!(slugs(&controller.render()), vec!["electronics", "garden"]);

        controller.toggle_expand(electronics.id);
        let rows = controller.render();
        assert_eq!(slugs(&rows), vec!["electronics", "tvs", "phones", "garden"]);
        assert!(rows[0].is_expanded);
        assert!(rows[1].has_children);
        assert!(!rows[1].is_expanded);
        assert_eq!(rows[1].level, 1);

        controller.toggle_expand(tvs.id);
        let rows = controller.render();
        assert_eq!(
            slugs(&rows),
            vec!["electronics", "tvs", "oled", "phones", "garden"]
        );
        assert_eq!(rows[2].level, 2);
    }

    #[test]
    fn test_flat_render_emits_each_record_once_at_its_depth() {
        let electronics = record("Electronics", None);
        let tvs = record("TVs", Some(&electronics));
        let oled = record("OLED", Some(&tvs));

        let mut controller = AdminTreeController::new(10);
        let ticket = controller.set_query("e");
        // Child listed before its parent; both match the search.
        controller.accept(
            ticket.request_id,
            page_of(vec![tvs.clone(), electronics.clone(), oled.clone()]),
        );

        let rows = controller.render();
        assert_eq!(slugs(&rows), vec!["tvs", "oled", "electronics"]);
        let levels: Vec<i32> = rows.iter().map(|r| r.level).collect();
        assert_eq!(levels, vec![1, 2, 0]);
    }

    #[tokio::test]
    async fn test_load_runs_ticket_against_service() {
        let service = memory_service();
        let electronics = service
            .create(create_input("Electronics", "electronics", None))
            .await
            .unwrap();
        service
            .create(create_input("TVs", "tvs", Some(electronics.id)))
            .await
            .unwrap();

        let mut controller = AdminTreeController::new(10).with_expanded([electronics.id]);
        let ticket = controller.set_fetch_all(true);
        assert!(controller.load(&service, ticket).await.unwrap());

        assert_eq!(controller.listing().map(|l| l.total_records), Some(2));
        assert_eq!(slugs(&controller.render()), vec!["electronics", "tvs"]);
    }
}
