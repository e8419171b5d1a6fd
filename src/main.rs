use anyhow::Result;

use office_ladder::cli::Command;
use office_ladder::{
    handle_bracket, handle_completions, handle_init_db, handle_process, handle_serve, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Serve { port } => handle_serve(*port),
        Command::Process { office } => handle_process(*office),
        Command::Bracket { tournament } => handle_bracket(*tournament),
        Command::InitDb => handle_init_db(),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
