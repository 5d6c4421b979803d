pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod context;
pub mod db;
pub mod decisions;
pub mod error;
pub mod feature_requests;
pub mod generation;
pub mod global;
pub mod meeting;
pub mod registry;
