pub mod cli;
pub mod config;
pub mod dto;
pub mod error;
pub mod events;
pub mod models;
pub mod response;
pub mod services;
pub mod state;
pub mod storefront;
pub mod timer;
