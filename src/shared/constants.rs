// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for the admin category listing
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// STOREFRONT
// =============================================================================

/// Default number of top-level categories returned by the featured listing
pub const DEFAULT_FEATURED_LIMIT: i64 = 8;

/// Upper bound for the featured listing
pub const MAX_FEATURED_LIMIT: i64 = 100;

/// Slugs shadowed by static `/api/categories/*` routes
pub const RESERVED_SLUGS: &[&str] = &["featured"];
