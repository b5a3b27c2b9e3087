pub mod config_provider;
pub mod game;
pub mod registry;
pub mod tasks;
