mod admin_tree_controller;
pub mod banner_resolver;
mod category_service;
pub mod hierarchy;
pub mod tree_builder;

pub use admin_tree_controller::{AdminTreeController, RenderMode, TreeRow};
pub use category_service::CategoryService;
pub use tree_builder::TreeBuilder;
