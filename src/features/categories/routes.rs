use std::sync::Arc;

use axum::{middleware::from_fn, routing::get, Router};

use crate::core::middleware::basic_auth_middleware;
use crate::features::categories::handlers::{self, admin_category_handler as admin};
use crate::features::categories::services::CategoryService;

/// Create routes for the categories feature
///
/// Note: These storefront routes are public (no authentication required)
pub fn routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route("/api/categories", get(handlers::list_categories))
        .route(
            "/api/categories/featured",
            get(handlers::list_featured_categories),
        )
        .route("/api/categories/{slug}", get(handlers::get_category))
        .route(
            "/api/categories/{slug}/children",
            get(handlers::list_children),
        )
        .route(
            "/api/categories/{slug}/ancestors",
            get(handlers::list_ancestors),
        )
        .route(
            "/api/categories/{slug}/banner",
            get(handlers::get_effective_banner),
        )
        .with_state(service)
}

/// Create admin routes for category management
///
/// Gated by basic auth when `credentials` ("username:password") are given.
pub fn admin_routes(service: Arc<CategoryService>, credentials: Option<String>) -> Router {
    let router = Router::new()
        .route(
            "/api/admin/categories",
            get(admin::list_categories).post(admin::create_category),
        )
        .route("/api/admin/categories/tree-view", get(admin::tree_view))
        .route(
            "/api/admin/categories/{id}",
            get(admin::get_category)
                .patch(admin::update_category)
                .delete(admin::delete_category),
        )
        .with_state(service);

    match credentials {
        Some(credentials) => router.route_layer(from_fn(basic_auth_middleware(
            Arc::new(credentials),
            "category-admin",
        ))),
        None => router,
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{header, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use base64::prelude::*;
    use serde_json::{json, Value};

    use super::*;
    use crate::shared::test_helpers::{create_input, memory_service};

    fn test_server(credentials: Option<&str>) -> (TestServer, Arc<CategoryService>) {
        let service = Arc::new(memory_service());
        let app = Router::new()
            .merge(routes(Arc::clone(&service)))
            .merge(admin_routes(
                Arc::clone(&service),
                credentials.map(str::to_string),
            ));
        (TestServer::new(app).unwrap(), service)
    }

    async fn create(server: &TestServer, body: Value) -> Value {
        let response = server.post("/api/admin/categories").json(&body).await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["data"].clone()
    }

    #[tokio::test]
    async fn test_create_then_browse_storefront() {
        let (server, _) = test_server(None);

        let electronics = create(
            &server,
            json!({"name": "Electronics", "slug": "electronics", "image": "https://cdn.test/e.png",
                   "bannerImage": "https://cdn.test/e-banner.png"}),
        )
        .await;
        assert_eq!(electronics["depth"], 0);
        assert_eq!(electronics["isParent"], true);

        let tvs = create(
            &server,
            json!({"name": "TVs", "slug": "tvs", "image": "https://cdn.test/tvs.png",
                   "parentId": electronics["id"]}),
        )
        .await;
        assert_eq!(tvs["depth"], 1);
        assert_eq!(tvs["path"], json!([electronics["id"]]));

        let tree = server
            .get("/api/categories")
            .add_query_param("tree", true)
            .await
            .json::<Value>();
        assert_eq!(tree["data"][0]["slug"], "electronics");
        assert_eq!(tree["data"][0]["children"][0]["slug"], "tvs");

        let children = server
            .get("/api/categories/electronics/children")
            .await
            .json::<Value>();
        assert_eq!(children["data"][0]["id"], tvs["id"]);

        let ancestors = server
            .get("/api/categories/tvs/ancestors")
            .await
            .json::<Value>();
        assert_eq!(ancestors["data"][0]["id"], electronics["id"]);

        let banner = server.get("/api/categories/tvs/banner").await.json::<Value>();
        assert_eq!(banner["data"]["bannerImage"], "https://cdn.test/e-banner.png");
        assert_eq!(banner["data"]["inherited"], true);
    }

    #[tokio::test]
    async fn test_error_kinds_map_to_status_codes() {
        let (server, service) = test_server(None);
        let electronics = service
            .create(create_input("Electronics", "electronics", None))
            .await
            .unwrap();
        let tvs = service
            .create(create_input("TVs", "tvs", Some(electronics.id)))
            .await
            .unwrap();

        server
            .get("/api/categories/missing")
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let duplicate = server
            .post("/api/admin/categories")
            .json(&json!({"name": "Again", "slug": "tvs", "image": "https://cdn.test/x.png"}))
            .await;
        duplicate.assert_status(StatusCode::CONFLICT);
        let message = duplicate.json::<Value>()["message"].as_str().unwrap().to_string();
        assert!(message.starts_with("DuplicateSlug"));

        server
            .patch(&format!("/api/admin/categories/{}", electronics.id))
            .json(&json!({"parentId": tvs.id}))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        server
            .delete(&format!("/api/admin/categories/{}", electronics.id))
            .await
            .assert_status(StatusCode::CONFLICT);

        server
            .post("/api/admin/categories")
            .json(&json!({"name": "Bad", "slug": "Not A Slug", "image": "https://cdn.test/x.png"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_patch_null_parent_detaches() {
        let (server, service) = test_server(None);
        let electronics = service
            .create(create_input("Electronics", "electronics", None))
            .await
            .unwrap();
        let tvs = service
            .create(create_input("TVs", "tvs", Some(electronics.id)))
            .await
            .unwrap();

        let response = server
            .patch(&format!("/api/admin/categories/{}", tvs.id))
            .json(&json!({"parentId": null}))
            .await;
        response.assert_status_ok();

        let body = response.json::<Value>();
        let data = &body["data"];
        assert_eq!(data["parentId"], Value::Null);
        assert_eq!(data["depth"], 0);
        assert_eq!(data["isParent"], true);
    }

    #[tokio::test]
    async fn test_admin_listing_and_tree_view() {
        let (server, service) = test_server(None);
        let electronics = service
            .create(create_input("Electronics", "electronics", None))
            .await
            .unwrap();
        service
            .create(create_input("TVs", "tvs", Some(electronics.id)))
            .await
            .unwrap();
        service
            .create(create_input("Garden", "garden", None))
            .await
            .unwrap();

        let listing = server
            .get("/api/admin/categories")
            .add_query_param("pageSize", 2)
            .await
            .json::<Value>();
        assert_eq!(listing["data"]["totalRecords"], 3);
        assert_eq!(listing["data"]["totalPages"], 2);
        assert_eq!(listing["data"]["rangeStart"], 1);
        assert_eq!(listing["data"]["rangeEnd"], 2);

        let view = server
            .get("/api/admin/categories/tree-view")
            .add_query_param("fetchAll", true)
            .add_query_param("expanded", electronics.id)
            .await
            .json::<Value>();
        let slugs: Vec<&str> = view["data"]["rows"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["slug"].as_str().unwrap())
            .collect();
        assert_eq!(view["data"]["mode"], "hierarchical");
        // Roots follow the listing order, most recently updated first.
        assert_eq!(slugs, vec!["garden", "electronics", "tvs"]);

        let search = server
            .get("/api/admin/categories/tree-view")
            .add_query_param("search", "tv")
            .await
            .json::<Value>();
        assert_eq!(search["data"]["mode"], "flat");
        assert_eq!(search["data"]["rows"][0]["level"], 1);

        server
            .get("/api/admin/categories/tree-view")
            .add_query_param("expanded", "nope")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_far_admin_page_returns_empty_listing() {
        let (server, service) = test_server(None);
        service
            .create(create_input("TVs", "tvs", None))
            .await
            .unwrap();

        for path in ["/api/admin/categories", "/api/admin/categories/tree-view"] {
            let response = server
                .get(path)
                .add_query_param("page", i64::MAX)
                .await;
            response.assert_status_ok();
            assert_eq!(response.json::<Value>()["data"]["totalRecords"], 1);
        }
    }

    #[tokio::test]
    async fn test_featured_endpoint_honours_limit() {
        let (server, service) = test_server(None);
        for i in 0..3 {
            service
                .create(create_input(&format!("Top {}", i), &format!("top-{}", i), None))
                .await
                .unwrap();
        }

        let response = server
            .get("/api/categories/featured")
            .add_query_param("limit", 2)
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_admin_routes_require_credentials_when_configured() {
        let (server, _) = test_server(Some("admin:secret"));

        server
            .get("/api/admin/categories")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        let token = BASE64_STANDARD.encode("admin:secret");
        server
            .get("/api/admin/categories")
            .add_header(
                header::AUTHORIZATION,
                HeaderValue::from_str(&format!("Basic {}", token)).unwrap(),
            )
            .await
            .assert_status_ok();

        // Storefront stays public.
        server.get("/api/categories").await.assert_status_ok();
    }
}
