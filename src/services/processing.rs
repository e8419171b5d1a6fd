use anyhow::Result;
use colored::Colorize;
use log::info;
use std::sync::Arc;

use crate::cache::SnapshotCache;
use crate::config::settings::AppConfig;
use crate::database::{self, SqliteStore};
use crate::domain::{MatchState, OfficeId, TournamentId};
use crate::processing::{OfficeProcessor, OfficeSnapshot};
use crate::tournament::TournamentView;

/// One-shot processing for the command line
pub struct ProcessingService {
    processor: OfficeProcessor,
}

impl ProcessingService {
    pub fn new(config: AppConfig) -> Result<Self> {
        let pool = database::create_pool(&config.database)?;
        {
            let conn = database::get_connection(&pool)?;
            database::setup::init_database(&conn)?;
        }

        let store = Arc::new(SqliteStore::new(pool));
        Ok(Self {
            processor: OfficeProcessor::new(store, Arc::new(SnapshotCache::new()), config.rating),
        })
    }

    /// Replay the office and print its leaderboard
    pub fn run(&self, office_id: OfficeId) -> Result<()> {
        info!("=== Processing office {} ===", office_id);
        let snapshot = self.processor.process(office_id)?;

        for line in leaderboard_lines(&snapshot) {
            println!("{}", line);
        }
        info!("=== Processing complete ===");
        Ok(())
    }

    /// Print the rounds of a tournament, first round first
    pub fn show_bracket(&self, tournament_id: TournamentId) -> Result<()> {
        let view = self.processor.tournament(tournament_id)?;

        for line in bracket_lines(&view) {
            println!("{}", line);
        }
        Ok(())
    }
}

pub fn leaderboard_lines(snapshot: &OfficeSnapshot) -> Vec<String> {
    let ranked = snapshot.ranked_players();
    let mut lines = vec![format!(
        "{} (office {}, {} matches)",
        "Leaderboard".bold(),
        snapshot.office_id,
        snapshot.matches_played()
    )];

    if ranked.is_empty() {
        lines.push("  no active players".dimmed().to_string());
        return lines;
    }

    for (i, player) in ranked.iter().enumerate() {
        lines.push(format!(
            "{:>4}. {:<20} {:>5}  {}W {}L  ({:.1}%)",
            i + 1,
            player.username,
            player.rating.to_string().green(),
            player.win_count,
            player.loss_count,
            player.win_percentage()
        ));
    }
    lines
}

pub fn bracket_lines(view: &TournamentView) -> Vec<String> {
    let summary = &view.summary;
    let mut lines = vec![format!(
        "{} ({} players, {:.0}% played)",
        summary.name.bold(),
        summary.player_count,
        summary.progress
    )];

    for (round_no, round) in view.bracket.rounds.iter().enumerate() {
        lines.push(format!("Round {}", round_no + 1).cyan().to_string());
        for record in round {
            let names: Vec<&str> = record.participants.iter().map(|p| p.username.as_str()).collect();
            let seats = if names.is_empty() {
                "to be decided".to_string()
            } else {
                names.join(" vs ")
            };
            let state = match record.state {
                MatchState::Approved => "played".green(),
                MatchState::Scheduled => "scheduled".yellow(),
                MatchState::Pending => "pending".yellow(),
            };
            lines.push(format!("  #{:<5} {} [{}]", record.id, seats, state));
        }
    }
    lines
}
