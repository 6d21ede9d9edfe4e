use crate::demo::{run_demo, run_rollup_report, DemoArgs, RollupReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use integrity_pulse::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Integrity Pulse",
    about = "Score workforce integrity assessments and roll them up by department",
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
    /// Build department roll-up reports from an exported scored CSV
    Report(RollupReportArgs),
    /// Run an end-to-end CLI demo covering scoring and the roll-up reports
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
        Command::Report(args) => run_rollup_report(args),
        Command::Demo(args) => run_demo(args),
    }
}
