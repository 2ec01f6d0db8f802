pub mod database;
pub mod errors;
pub mod filters;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod money;
pub mod store;
pub mod utils;
