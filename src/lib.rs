pub mod benchmark;
pub mod chunks;
pub mod config;
pub mod embedding;
pub mod errors;
pub mod generation;
pub mod index;
pub mod indexer;
pub mod logging;
pub mod search;
pub mod server;
