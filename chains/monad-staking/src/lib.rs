pub mod client;
pub mod config;
pub mod script;
pub mod task;
