pub mod pairing;
mod processor;
pub mod replay;
pub mod snapshot;

pub use pairing::{PairedPlayer, Pairing, PairingIndex};
pub use processor::OfficeProcessor;
pub use replay::replay;
pub use snapshot::{OfficeSnapshot, ProcessedMatch, ProcessedParticipant, leaderboard_order};
