pub mod ladder;
pub mod processing;
pub mod server;
