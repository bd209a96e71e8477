use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "kasa", about = "Contract completion ledger with bonus tracking")]
pub struct Cli {
    /// State directory holding config.toml and the ledger snapshot
    #[arg(long, global = true, env = "KASA_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register a completed TZM contract
    Tzm {
        /// User id to credit
        #[arg(long)]
        user: String,
    },
    /// Register a completed MET contract
    Met {
        /// User id to credit
        #[arg(long)]
        user: String,
    },
    /// Apply a reaction marker (🟢 = TZM, 🔴 = MET)
    React {
        /// Reacting user id
        #[arg(long)]
        user: String,
        /// Reaction marker
        #[arg(long)]
        marker: String,
    },
    /// Show everyone's counters
    Summary,
    /// Show the bonus ranking
    Ranking,
    /// Show one user's counters
    Mine {
        /// User id to look up
        #[arg(long)]
        user: String,
    },
    /// Export the ledger as CSV
    Export {
        /// Output file (default: kontrakty.csv in the state directory)
        #[arg(long, conflicts_with = "stdout")]
        output: Option<PathBuf>,
        /// Print to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,
    },
    /// Wipe all counters and bonuses
    Reset {
        /// Confirm the irreversible reset
        #[arg(long)]
        yes: bool,
    },
    /// Run the HTTP API and the daily summary
    Serve,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

impl Commands {
    /// Whether the command writes the ledger snapshot.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Commands::Tzm { .. }
                | Commands::Met { .. }
                | Commands::React { .. }
                | Commands::Reset { .. }
        )
    }
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write a default config file
    Init,
    /// Show the effective configuration
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_registration() {
        let cli = Cli::try_parse_from(["kasa", "met", "--user", "42"]).unwrap();
        assert!(matches!(cli.command, Commands::Met { user } if user == "42"));
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["kasa", "summary", "--state-dir", "/tmp/k", "--log-json"])
            .unwrap();
        assert_eq!(cli.state_dir, Some(PathBuf::from("/tmp/k")));
        assert!(cli.log_json);
    }

    #[test]
    fn test_mutating_commands() {
        let mutation = |args: &[&str]| {
            Cli::try_parse_from(args.iter().copied())
                .unwrap()
                .command
                .is_mutation()
        };
        assert!(mutation(&["kasa", "tzm", "--user", "1"]));
        assert!(mutation(&["kasa", "react", "--user", "1", "--marker", "🔴"]));
        assert!(mutation(&["kasa", "reset"]));
        assert!(!mutation(&["kasa", "summary"]));
        assert!(!mutation(&["kasa", "export", "--stdout"]));
    }

    #[test]
    fn test_export_output_conflicts_with_stdout() {
        assert!(Cli::try_parse_from(["kasa", "export", "--stdout", "--output", "x.csv"]).is_err());
    }

    #[test]
    fn test_reaction_requires_marker() {
        assert!(Cli::try_parse_from(["kasa", "react", "--user", "1"]).is_err());
    }
}
