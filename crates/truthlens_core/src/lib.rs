pub mod client;
pub mod config;
pub mod db;
pub mod preferences;
pub mod presentation;
pub mod progress;
pub mod schema;
pub mod session;
pub mod verdict;
