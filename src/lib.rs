pub mod api;
pub mod errors;
pub mod fetch;
pub mod models;
pub mod observability;
pub mod schema;
pub mod server;
pub mod store;
#[cfg(test)]
pub mod test_helpers;

// Type definitions
use actix_web::web;
use diesel::r2d2::{self, ConnectionManager};
use diesel::sqlite::SqliteConnection;

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;
pub type RqStore = web::Data<store::Store>;
