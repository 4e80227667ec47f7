pub mod config;
pub mod controllers;
pub mod errors;
pub mod event_handling;
pub mod init;
pub mod models;
pub mod output;
pub mod services;
pub mod state_management;
pub mod utils;
