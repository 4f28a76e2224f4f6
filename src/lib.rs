pub mod app;
pub mod cache;
pub mod core;
pub mod fetcher;
pub mod github;
pub mod keywords;
pub mod orchestrator;
pub mod scanner;
pub mod snapshot;

include!(concat!(env!("OUT_DIR"), "/version.rs"));
