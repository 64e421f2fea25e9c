pub mod api;
pub mod codegen;
pub mod config;
pub mod error;
pub mod models;
pub mod redirect;
pub mod registry;
pub mod server;
pub mod storage;
