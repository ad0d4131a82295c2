mod category;

pub use category::{
    AttributeTemplate, AttributeType, Category, CategoryFilter, CategoryPage, NewCategory,
};
