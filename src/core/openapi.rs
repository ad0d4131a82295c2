use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::categories::handlers::admin_category_handler;
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::categories::{models as categories_models, services as categories_services};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Categories (public storefront)
        categories_handlers::list_categories,
        categories_handlers::list_featured_categories,
        categories_handlers::get_category,
        categories_handlers::list_children,
        categories_handlers::list_ancestors,
        categories_handlers::get_effective_banner,
        // Categories (admin)
        admin_category_handler::list_categories,
        admin_category_handler::tree_view,
        admin_category_handler::get_category,
        admin_category_handler::create_category,
        admin_category_handler::update_category,
        admin_category_handler::delete_category,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Categories
            categories_models::AttributeTemplate,
            categories_models::AttributeType,
            categories_services::RenderMode,
            categories_dtos::CreateCategoryDto,
            categories_dtos::UpdateCategoryDto,
            categories_dtos::CategoryTreeDto,
            categories_dtos::AdminTreeRowDto,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            ApiResponse<Vec<categories_dtos::CategoryTreeDto>>,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            ApiResponse<categories_dtos::EffectiveBannerDto>,
            ApiResponse<categories_dtos::AdminCategoryListDto>,
            ApiResponse<categories_dtos::AdminTreeViewDto>,
        )
    ),
    tags(
        (name = "categories", description = "Storefront category browsing (public)"),
        (name = "admin-categories", description = "Category management (admin)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Category Tree API",
        version = "0.1.0",
        description = "API documentation for the category hierarchy service",
    )
)]
pub struct ApiDoc;

/// Adds the basic auth scheme guarding admin routes to the OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_storefront_and_admin_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        assert!(paths.contains(&"/api/categories/{slug}/banner"));
        assert!(paths.contains(&"/api/admin/categories/tree-view"));
        assert!(doc
            .components
            .as_ref()
            .is_some_and(|c| c.security_schemes.contains_key("basic_auth")));
    }

    #[test]
    fn test_swagger_info_modifier_overrides_info() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Catalog".to_string(),
            version: "2.0.0".to_string(),
            description: "Staging".to_string(),
        }
        .modify(&mut doc);

        assert_eq!(doc.info.title, "Catalog");
        assert_eq!(doc.info.description.as_deref(), Some("Staging"));
    }
}
