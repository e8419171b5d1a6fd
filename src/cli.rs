use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(author, version, about = "office-ladder rating engine")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Start the HTTP API server
    Serve {
        /// Port number (optional, defaults to 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// Replay an office's approved matches and print its leaderboard
    Process {
        /// Office id
        #[arg(short, long)]
        office: i64,
    },
    /// Print the bracket of a tournament
    Bracket {
        /// Tournament id
        #[arg(short, long)]
        tournament: i64,
    },
    /// Create the database schema if it does not exist yet
    InitDb,
    /// Print shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}
