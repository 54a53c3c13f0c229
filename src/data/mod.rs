pub mod config;
pub mod world;
