// Data layer
// Profile model, data sources and the query cache that memoizes them

pub mod errors;
pub mod profile_source;
pub mod profiles;
pub mod query_cache;
