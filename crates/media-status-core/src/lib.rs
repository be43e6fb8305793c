pub mod aggregate;
pub mod cache;
pub mod query;

pub use aggregate::aggregate;
pub use cache::StatusCache;
pub use query::StatusQuery;
