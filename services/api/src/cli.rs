use crate::report::{run_seed_check, run_stats_report, SeedCheckArgs, StatsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use sekolah_okupasi::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Sekolah Okupasi",
    about = "Serve the occupation competency catalog and rank schools from the command line",
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
    /// Rank the schools of a seed snapshot against one occupation
    Stats(StatsArgs),
    /// Validate a seed snapshot and print what it would load
    Seed(SeedCheckArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured seed snapshot
    #[arg(long)]
    pub(crate) seed: Option<std::path::PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Stats(args) => run_stats_report(args),
        Command::Seed(args) => run_seed_check(args),
    }
}
