pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod processing;
pub mod rating;
pub mod services;
pub mod tournament;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use cli::Cli;
use log::info;

use crate::cli::Command;
use crate::config::settings::AppConfig;
use crate::domain::{OfficeId, TournamentId};
use crate::services::processing::ProcessingService;
use crate::services::server::ServerService;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_serve(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::new();
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_process(office_id: OfficeId) -> Result<()> {
    let config = AppConfig::new();
    let service = ProcessingService::new(config)?;
    service.run(office_id)
}

pub fn handle_bracket(tournament_id: TournamentId) -> Result<()> {
    let config = AppConfig::new();
    let service = ProcessingService::new(config)?;
    service.show_bracket(tournament_id)
}

pub fn handle_init_db() -> Result<()> {
    let config = AppConfig::new();
    let pool = database::create_pool(&config.database)?;
    let conn = database::get_connection(&pool)?;
    database::setup::init_database(&conn)?;
    info!("Database ready at {}", config.database.path);
    Ok(())
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}
