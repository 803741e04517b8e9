pub mod client;
pub mod config;
pub mod executor;
pub mod humanize;
pub mod observability;
pub mod webhook;
