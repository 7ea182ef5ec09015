pub mod types;
pub mod config;
pub mod data;
pub mod aggregate;
pub mod selection;
pub mod paint;
pub mod animation;
pub mod spatial;
pub mod controller;
pub mod export;
