use crate::commands::{
    run_completeness, run_dedupe, run_rubric, run_score, CompletenessArgs, DedupeArgs,
    RubricArgs, ScoreArgs,
};
use clap::{Parser, Subcommand};
use nutri_score::config::AppConfig;
use nutri_score::error::AppError;
use nutri_score::telemetry;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "nutri-score",
    about = "Score, grade and clean food product exports from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Append Nutri-Score and Nutri-Grade columns to a product CSV
    Score(ScoreArgs),
    /// List columns by how often they are filled
    Completeness(CompletenessArgs),
    /// Collapse rows sharing an identifier, merging their gaps
    Dedupe(DedupeArgs),
    /// Print the compiled threshold table
    Rubric(RubricArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    debug!(?config.environment, "configuration loaded");

    match cli.command {
        Command::Score(args) => run_score(&config, args),
        Command::Completeness(args) => run_completeness(args),
        Command::Dedupe(args) => run_dedupe(args),
        Command::Rubric(args) => run_rubric(&config, args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn completeness_requires_exactly_one_filter() {
        assert!(Cli::try_parse_from(["nutri-score", "completeness", "--input", "a.csv"]).is_err());
        assert!(Cli::try_parse_from([
            "nutri-score",
            "completeness",
            "--input",
            "a.csv",
            "--at-least",
            "0.5",
            "--at-most",
            "0.9",
        ])
        .is_err());
        let cli = Cli::try_parse_from([
            "nutri-score",
            "completeness",
            "--input",
            "a.csv",
            "--between",
            "0.2",
            "0.8",
        ])
        .expect("between filter parses");
        assert!(matches!(cli.command, Command::Completeness(_)));
    }
}
