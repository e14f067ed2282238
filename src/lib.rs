pub mod cache;
pub mod config;
pub mod feeds;
pub mod fetch;
pub mod health;
pub mod series;
