pub mod config;
pub mod entities;
pub mod ingest;
pub mod output;
pub mod scoring;
pub mod state;
