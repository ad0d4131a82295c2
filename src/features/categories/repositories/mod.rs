mod category_repository;
mod memory_category_repository;
mod pg_category_repository;

pub use category_repository::CategoryRepository;
pub use memory_category_repository::MemoryCategoryRepository;
pub use pg_category_repository::PgCategoryRepository;
