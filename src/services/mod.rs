// Service exports
pub mod cache;
pub mod postgres;
pub mod realtor;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use postgres::{ListingQuery, PostgresClient, PostgresError};
pub use realtor::{RealtorClient, RealtorError, SearchQuery};
