pub mod analytics;
pub mod api;
pub mod base62;
pub mod config;
pub mod models;
pub mod redirect;
pub mod storage;
