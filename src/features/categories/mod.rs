//! Category hierarchy feature.
//!
//! Categories form a materialized-path tree: every record stores its `depth`
//! and the ordered ids of its ancestors (`path`). The service computes both on
//! create, and re-places a whole subtree in one write when a category moves.
//! Banners are inherited from the nearest ancestor that has one.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/categories` | No | Flat list, or nested tree with `tree=true` |
//! | GET | `/api/categories/featured` | No | Top-level categories, featured first |
//! | GET | `/api/categories/{slug}` | No | Category by slug |
//! | GET | `/api/categories/{slug}/children` | No | Direct children |
//! | GET | `/api/categories/{slug}/ancestors` | No | Breadcrumb, root first |
//! | GET | `/api/categories/{slug}/banner` | No | Effective (inherited) banner |
//! | GET | `/api/admin/categories` | Basic | Paged or fetch-all listing with search |
//! | GET | `/api/admin/categories/tree-view` | Basic | Rendered hierarchy rows |
//! | GET | `/api/admin/categories/{id}` | Basic | Category by id |
//! | POST | `/api/admin/categories` | Basic | Create |
//! | PATCH | `/api/admin/categories/{id}` | Basic | Update or move |
//! | DELETE | `/api/admin/categories/{id}` | Basic | Delete a childless category |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::{CategoryRepository, MemoryCategoryRepository, PgCategoryRepository};
pub use services::CategoryService;
