pub mod connection;
pub mod matches;
pub mod models;
pub mod offices;
pub mod setup;
mod store;
pub mod tournaments;
pub mod users;

pub use connection::{DbConn, DbPool, create_memory_pool, create_pool, get_connection};
pub use models::*;
pub use store::SqliteStore;
