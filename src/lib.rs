pub mod api;
pub mod auth;
pub mod config;
pub mod control;
pub mod local_state;
pub mod spray_log;
pub mod stats;
pub mod store;
