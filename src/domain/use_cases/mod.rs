pub mod articles;
pub mod extractors;
pub mod ingest;
pub mod reconcile;
pub mod users;
