pub mod admin_category_handler;
pub mod category_handler;

pub use category_handler::{
    __path_get_category, __path_get_effective_banner, __path_list_ancestors,
    __path_list_categories, __path_list_children, __path_list_featured_categories, get_category,
    get_effective_banner, list_ancestors, list_categories, list_children,
    list_featured_categories,
};
