pub mod engine;
pub mod handlers;
pub mod routes;

pub use engine::RedirectEngine;
