pub mod elo;
pub mod types;

pub use elo::{expected_score, group_delta, handicap_delta, points_delta, split_by_side_size};
pub use types::SideDeltas;
