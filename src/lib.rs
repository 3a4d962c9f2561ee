pub mod config;
pub mod model;
pub mod seed;
pub mod service;
pub mod standings;
pub mod store;
