pub mod models;
mod player;
mod store;

pub use models::*;
pub use player::Player;
pub use store::{MatchStore, MemoryStore};
