pub mod app;
pub mod control;
pub mod ingest;
pub mod render;
pub mod store;
