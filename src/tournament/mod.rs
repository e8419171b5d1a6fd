mod bracket;
mod schedule;

pub use bracket::{Bracket, TournamentSummary, TournamentView, build_bracket, progress};
pub use schedule::{PlannedRound, PlannedSlot, plan_bracket};
