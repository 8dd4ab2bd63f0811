use crate::report::{run_recommend, run_score, RecommendArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use grazing_gss::config::AppConfig;
use grazing_gss::error::AppError;
use grazing_gss::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "Grazing Suitability Scorer",
    about = "Score rangeland plots for grazing suitability from the command line or over HTTP",
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
    /// Score a plot survey CSV and print a suitability report
    Score(ScoreArgs),
    /// Print the grazing recommendation for a single plot
    Recommend(RecommendArgs),
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

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match command {
        Command::Serve(args) => server::run(args, config).await,
        Command::Score(args) => run_score(args, &config),
        Command::Recommend(args) => run_recommend(args, &config),
    }
}
