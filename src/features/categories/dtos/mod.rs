pub mod admin_category_dto;
pub mod category_dto;

pub use admin_category_dto::{
    AdminCategoryListDto, AdminCategoryQueryParams, AdminTreeRowDto, AdminTreeViewDto,
    AdminTreeViewQuery,
};
pub use category_dto::{
    CategoryResponseDto, CategoryTreeDto, CreateCategoryDto, EffectiveBannerDto,
    FeaturedCategoriesQuery, ListCategoriesQuery, UpdateCategoryDto,
};
