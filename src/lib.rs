pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod logging;
pub mod mind;
pub mod world;
