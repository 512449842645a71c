pub mod catalog;
pub mod commands;
pub mod config;
pub mod error;
pub mod extractor;
pub mod filesystem;
pub mod orchestrator;
pub mod session;
