use crate::commands::{
    run_batch, run_classify, run_determine, run_groups, BatchArgs, ClassifyArgs, DetermineArgs,
    GroupsArgs,
};
use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use primaries::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Multiple Primary Determination",
    about = "Decide whether two tumors are one primary or several, as a service or from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Determine a single tumor pair and print the decision
    Determine(DetermineArgs),
    /// Report which cancer group a tumor belongs to
    Classify(ClassifyArgs),
    /// List the cancer groups and their rules
    Groups(GroupsArgs),
    /// Determine every tumor pair in a CSV file, one JSON line per pair
    Batch(BatchArgs),
    /// Walk through reference scenarios against the configured catalog
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Determine(args) => run_determine(args),
        Command::Classify(args) => run_classify(args),
        Command::Groups(args) => run_groups(args),
        Command::Batch(args) => run_batch(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn determine_parses_partial_dates() {
        let cli = Cli::try_parse_from([
            "primaries-api",
            "determine",
            "--site1",
            "C509",
            "--histology1",
            "8500",
            "--behavior1",
            "2",
            "--date1",
            "2010-01",
            "--site2",
            "C509",
            "--histology2",
            "8500",
            "--behavior2",
            "3",
            "--laterality2",
            "1",
            "--date2",
            "2010",
        ])
        .expect("arguments parse");

        match cli.command {
            Some(Command::Determine(args)) => {
                assert_eq!(args.date1.month.as_deref(), Some("01"));
                assert_eq!(args.date2.month.as_deref(), Some("99"));
                assert_eq!(args.laterality2.as_deref(), Some("1"));
                assert!(args.laterality1.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn missing_command_defaults_to_serve() {
        let cli = Cli::try_parse_from(["primaries-api"]).expect("no arguments parse");
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["primaries-api", "batch"]);
        assert!(cli.is_err(), "batch requires --input");
    }
}
