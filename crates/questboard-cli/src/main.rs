use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "questboard-cli", version, about = "Questboard CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quest management
    Quest {
        #[command(subcommand)]
        action: commands::quest::QuestAction,
    },
    /// Family roster management
    Member {
        #[command(subcommand)]
        action: commands::member::MemberAction,
    },
    /// What's due today (or on a given date)
    Today(commands::today::TodayArgs),
    /// Complete one occurrence
    Complete(commands::complete::CompleteArgs),
    /// Undo a completion
    Uncomplete(commands::complete::UncompleteArgs),
    /// Point totals and today's progress
    Stats(commands::stats::StatsArgs),
    /// Draft a quest from free text
    Draft(commands::draft::DraftArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Quest { action } => commands::quest::run(action),
        Commands::Member { action } => commands::member::run(action),
        Commands::Today(args) => commands::today::run(args),
        Commands::Complete(args) => commands::complete::run(args),
        Commands::Uncomplete(args) => commands::complete::run_uncomplete(args),
        Commands::Stats(args) => commands::stats::run(args),
        Commands::Draft(args) => commands::draft::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
