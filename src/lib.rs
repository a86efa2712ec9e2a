pub mod config;
pub mod error;
pub mod fetch;
pub mod infra;
pub mod models;
pub mod output;
pub mod parser;
pub mod review;
pub mod services;
pub mod stats;
