mod structs;

pub use structs::SnapshotCache;
